use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::livestock_type::LivestockType;
use crate::backend::storage::CatalogRepository;

/// Read-only view of the livestock type catalog
#[derive(Clone)]
pub struct CatalogService {
    catalog_repository: CatalogRepository,
}

impl CatalogService {
    pub fn new(catalog_repository: CatalogRepository) -> Self {
        Self { catalog_repository }
    }

    /// Active types ordered by name
    pub async fn list_active_types(&self) -> Result<Vec<LivestockType>, DomainError> {
        Ok(self.catalog_repository.list_active_types().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::{MemoryStore, RecordStore, Row, Table};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_only_active_types_are_listed() {
        let store = MemoryStore::new();
        for (name, active) in [("VACAS", true), ("BUEYES", false), ("NOVILLOS", true)] {
            let row: Row = json!({"nombre": name, "activo": active}).as_object().cloned().unwrap();
            store.insert(Table::TypeCatalog, row).await.unwrap();
        }
        let service = CatalogService::new(CatalogRepository::new(Arc::new(store)));

        let names: Vec<String> = service
            .list_active_types()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["NOVILLOS", "VACAS"]);
    }
}
