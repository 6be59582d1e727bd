//! Common library for the carstock services
//!
//! This crate provides shared functionality used across the services:
//! process configuration, database connectivity and table bootstrap, and the
//! error types those produce.

pub mod config;
pub mod database;
pub mod error;
pub mod schema;
