use std::sync::Arc;

use crate::backend::domain::models::livestock_type::LivestockType;
use crate::backend::storage::traits::{Filter, RecordStore, SelectQuery, StoreError, Table};

use super::decode_rows;

/// Read-only access to the livestock type catalog
#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn RecordStore>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Active catalog entries ordered by name
    pub async fn list_active_types(&self) -> Result<Vec<LivestockType>, StoreError> {
        let query = SelectQuery::new()
            .filter(Filter::eq("activo", true))
            .order_by("nombre", true);
        let rows = self.store.select(Table::TypeCatalog, &query).await?;
        Ok(decode_rows(Table::TypeCatalog, rows))
    }
}
