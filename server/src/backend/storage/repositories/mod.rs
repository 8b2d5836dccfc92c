// Repository modules
pub mod breakdown_repository;
pub mod catalog_repository;
pub mod partner_repository;
pub mod transaction_repository;

// Re-export repository types
pub use breakdown_repository::BreakdownRepository;
pub use catalog_repository::CatalogRepository;
pub use partner_repository::PartnerRepository;
pub use transaction_repository::TransactionRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::traits::{Row, StoreError, Table};

/// Decode store rows into typed models, skipping rows that do not fit
pub(crate) fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Row>) -> Vec<T> {
    decode_rows_keeping_rejects(table, rows).0
}

/// Decode store rows, handing back the rows that do not fit
pub(crate) fn decode_rows_keeping_rejects<T: DeserializeOwned>(table: Table, rows: Vec<Row>) -> (Vec<T>, Vec<Row>) {
    let mut decoded = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    for row in rows {
        match serde_json::from_value(Value::Object(row.clone())) {
            Ok(value) => decoded.push(value),
            Err(e) => {
                let id = row.get("id").cloned().unwrap_or(Value::Null);
                warn!("Skipping undecodable {} row id={}: {}", table, id, e);
                rejected.push(row);
            }
        }
    }
    (decoded, rejected)
}

/// Encode a typed model into a store row
pub(crate) fn encode_row<T: Serialize>(table: Table, value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Decode {
            table,
            message: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(StoreError::Decode {
            table,
            message: e.to_string(),
        }),
    }
}

/// Extract the id the store assigned to an inserted row
pub(crate) fn inserted_id(table: Table, row: &Row) -> Result<i64, StoreError> {
    row.get("id")
        .and_then(Value::as_i64)
        .ok_or(StoreError::MissingId(table))
}
