//! Repositories for database operations

pub mod car;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use car::{CarRepository, CarStore};

#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryCarStore;
