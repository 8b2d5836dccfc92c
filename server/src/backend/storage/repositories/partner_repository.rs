use std::sync::Arc;

use crate::backend::domain::models::partner::{NewPartner, Partner};
use crate::backend::storage::traits::{Filter, RecordStore, SelectQuery, StoreError, Table};

use super::{decode_rows, encode_row, inserted_id};

/// Repository for partner (`socios`) operations
#[derive(Clone)]
pub struct PartnerRepository {
    store: Arc<dyn RecordStore>,
}

impl PartnerRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// List all partners ordered by name
    pub async fn list_partners(&self) -> Result<Vec<Partner>, StoreError> {
        let query = SelectQuery::new().order_by("nombre", true);
        let rows = self.store.select(Table::Partners, &query).await?;
        Ok(decode_rows(Table::Partners, rows))
    }

    /// Whether a partner with exactly this stored name exists
    pub async fn name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let query = SelectQuery::new().filter(Filter::eq("nombre", name));
        let rows = self.store.select(Table::Partners, &query).await?;
        Ok(!rows.is_empty())
    }

    pub async fn store_partner(&self, partner: &NewPartner) -> Result<Partner, StoreError> {
        let row = encode_row(Table::Partners, partner)?;
        let stored = self.store.insert(Table::Partners, row).await?;
        let id = inserted_id(Table::Partners, &stored)?;
        Ok(Partner {
            id,
            name: partner.name.clone(),
        })
    }
}
