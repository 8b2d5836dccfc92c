use std::sync::Arc;

use crate::backend::domain::models::breakdown::{NewTypeBreakdown, TypeBreakdown};
use crate::backend::storage::traits::{Filter, RecordStore, SelectQuery, StoreError, Table};

use super::{decode_rows, encode_row, inserted_id};

/// Repository for type breakdown (`tipo_ganado`) rows
#[derive(Clone)]
pub struct BreakdownRepository {
    store: Arc<dyn RecordStore>,
}

impl BreakdownRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Store a breakdown row and return its id
    pub async fn store_breakdown(&self, breakdown: &NewTypeBreakdown) -> Result<i64, StoreError> {
        let row = encode_row(Table::TypeBreakdown, breakdown)?;
        let stored = self.store.insert(Table::TypeBreakdown, row).await?;
        inserted_id(Table::TypeBreakdown, &stored)
    }

    /// Breakdown rows for one partner, or for everyone when `partner_id` is None
    pub async fn list_breakdowns(&self, partner_id: Option<i64>) -> Result<Vec<TypeBreakdown>, StoreError> {
        let mut query = SelectQuery::new().order_by("id", true);
        if let Some(partner_id) = partner_id {
            query = query.filter(Filter::eq("socio_id", partner_id));
        }
        let rows = self.store.select(Table::TypeBreakdown, &query).await?;
        Ok(decode_rows(Table::TypeBreakdown, rows))
    }
}
