use tracing::{info, warn};

use crate::backend::domain::commands::partners::CreatePartnerCommand;
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::partner::{NewPartner, Partner};
use crate::backend::storage::PartnerRepository;

/// Normalize a partner name: trim surrounding whitespace and uppercase
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Service for registering and listing partners
#[derive(Clone)]
pub struct PartnerService {
    partner_repository: PartnerRepository,
}

impl PartnerService {
    pub fn new(partner_repository: PartnerRepository) -> Self {
        Self { partner_repository }
    }

    /// Register a partner under its normalized name
    pub async fn create_partner(&self, command: CreatePartnerCommand) -> Result<Partner, DomainError> {
        let name = normalize_name(&command.name);
        if name.is_empty() {
            return Err(DomainError::validation("Nombre vacío"));
        }

        if self.partner_repository.name_exists(&name).await? {
            warn!("Partner already exists: {}", name);
            return Err(DomainError::Conflict(format!("Ya existe un socio con ese nombre: {}", name)));
        }

        let partner = self.partner_repository.store_partner(&NewPartner { name }).await?;
        info!("Created partner: {} with ID: {}", partner.name, partner.id);
        Ok(partner)
    }

    /// All partners ordered by name
    pub async fn list_partners(&self) -> Result<Vec<Partner>, DomainError> {
        Ok(self.partner_repository.list_partners().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::{MemoryStore, Table};
    use std::sync::Arc;

    fn create_test_service(store: &MemoryStore) -> PartnerService {
        PartnerService::new(PartnerRepository::new(Arc::new(store.clone())))
    }

    fn create(name: &str) -> CreatePartnerCommand {
        CreatePartnerCommand { name: name.to_string() }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(" juan "), "JUAN");
        assert_eq!(normalize_name("\tmaría josé\n"), "MARÍA JOSÉ");
    }

    #[tokio::test]
    async fn test_create_partner_normalizes_name() {
        let store = MemoryStore::new();
        let service = create_test_service(&store);

        let partner = service.create_partner(create(" juan ")).await.unwrap();
        assert_eq!(partner.name, "JUAN");
        assert_eq!(store.rows(Table::Partners)[0]["nombre"], "JUAN");
    }

    #[tokio::test]
    async fn test_duplicate_name_is_a_conflict() {
        let store = MemoryStore::new();
        let service = create_test_service(&store);

        service.create_partner(create(" juan ")).await.unwrap();
        let result = service.create_partner(create("JUAN")).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(store.row_count(Table::Partners), 1);
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let store = MemoryStore::new();
        let service = create_test_service(&store);

        let result = service.create_partner(create("   ")).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(store.row_count(Table::Partners), 0);
    }

    #[tokio::test]
    async fn test_list_partners_is_ordered_by_name() {
        let store = MemoryStore::new();
        let service = create_test_service(&store);
        for name in ["pedro", "ana", "luis"] {
            service.create_partner(create(name)).await.unwrap();
        }

        let names: Vec<String> = service
            .list_partners()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["ANA", "LUIS", "PEDRO"]);
    }
}
