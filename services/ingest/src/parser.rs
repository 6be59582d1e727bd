//! CSV decoding into header-keyed rows
//!
//! The first record is the header. Columns are matched to car fields by
//! exact header name; unknown columns are ignored and missing ones stay
//! `None` so normalization can substitute defaults.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::models::RawCar;

/// Field slot a header column feeds
#[derive(Clone, Copy)]
enum Column {
    ModelName,
    Price,
    ManufacturingYear,
    EngineCapacity,
    SpareKey,
    Transmission,
    KmDriven,
    Ownership,
    FuelType,
    Imperfections,
    RepaintedParts,
}

impl Column {
    fn from_header(name: &str) -> Option<Self> {
        Some(match name {
            "model_name" => Column::ModelName,
            "price" => Column::Price,
            "manufacturing_year" => Column::ManufacturingYear,
            "engine_capacity" => Column::EngineCapacity,
            "spare_key" => Column::SpareKey,
            "transmission" => Column::Transmission,
            "km_driven" => Column::KmDriven,
            "ownership" => Column::Ownership,
            "fuel_type" => Column::FuelType,
            "imperfections" => Column::Imperfections,
            "repainted_parts" => Column::RepaintedParts,
            _ => return None,
        })
    }

    fn slot<'a>(&self, row: &'a mut RawCar) -> &'a mut Option<String> {
        match self {
            Column::ModelName => &mut row.model_name,
            Column::Price => &mut row.price,
            Column::ManufacturingYear => &mut row.manufacturing_year,
            Column::EngineCapacity => &mut row.engine_capacity,
            Column::SpareKey => &mut row.spare_key,
            Column::Transmission => &mut row.transmission,
            Column::KmDriven => &mut row.km_driven,
            Column::Ownership => &mut row.ownership,
            Column::FuelType => &mut row.fuel_type,
            Column::Imperfections => &mut row.imperfections,
            Column::RepaintedParts => &mut row.repainted_parts,
        }
    }
}

/// Decode CSV bytes into rows
///
/// Rows may be shorter or longer than the header. Fails on invalid UTF-8 or
/// any other CSV-level error.
pub fn parse_rows(data: &[u8]) -> Result<Vec<RawCar>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    let columns: Vec<Option<Column>> = reader
        .headers()?
        .iter()
        .map(Column::from_header)
        .collect();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        rows.push(to_raw_car(&columns, &record));
    }

    Ok(rows)
}

fn to_raw_car(columns: &[Option<Column>], record: &StringRecord) -> RawCar {
    let mut row = RawCar::default();

    for (column, cell) in columns.iter().zip(record.iter()) {
        let Some(column) = column else { continue };
        let slot = column.slot(&mut row);
        // First occurrence of a repeated header wins
        if slot.is_none() && !cell.is_empty() {
            *slot = Some(cell.to_string());
        }
    }

    row
}
