// @file: up_proxy/src/core/csv_export.rs
// @description: CSV rendering of flattened transactions.
// @author: LAS.

use csv::WriterBuilder;
use crate::core::error::ProxyError;
use crate::core::models::FlatTransaction;

pub const CSV_HEADER: [&str; 6] = ["id", "createdAt", "description", "amount", "currency", "category"];

/// Header row followed by one record per row. Quoting follows RFC 4180,
/// so descriptions containing commas, quotes or newlines survive intact.
pub fn to_csv(rows: &[FlatTransaction]) -> Result<String, ProxyError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::with_capacity(rows.len() * 96));

    // Written explicitly so an empty batch still carries the header.
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes: Vec<u8> = writer
        .into_inner()
        .map_err(|e| ProxyError::Io(e.into_error()))?;

    // Every field is a Rust String or a formatted float.
    String::from_utf8(bytes).map_err(|e| {
        ProxyError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
