use crate::backend::domain::models::livestock_type::LivestockType as DomainLivestockType;
use shared::{CatalogListResponse, LivestockType as SharedLivestockType};

/// Mapper to convert catalog entries into shared DTOs.
pub struct CatalogMapper;

impl CatalogMapper {
    pub fn to_dto(domain: DomainLivestockType) -> SharedLivestockType {
        SharedLivestockType {
            id: domain.id,
            name: domain.name,
            active: domain.active,
        }
    }

    pub fn to_catalog_list_dto(types: Vec<DomainLivestockType>) -> CatalogListResponse {
        CatalogListResponse {
            types: types.into_iter().map(Self::to_dto).collect(),
        }
    }
}
