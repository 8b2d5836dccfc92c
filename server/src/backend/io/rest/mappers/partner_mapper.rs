use crate::backend::domain::models::partner::Partner as DomainPartner;
use shared::{CreatePartnerResponse, Partner as SharedPartner, PartnerListResponse};

/// Mapper to convert domain Partner models into shared DTOs.
pub struct PartnerMapper;

impl PartnerMapper {
    pub fn to_dto(domain: DomainPartner) -> SharedPartner {
        SharedPartner {
            id: domain.id,
            name: domain.name,
        }
    }

    pub fn to_partner_list_dto(partners: Vec<DomainPartner>) -> PartnerListResponse {
        PartnerListResponse {
            partners: partners.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_partner_dto(domain: DomainPartner) -> CreatePartnerResponse {
        let success_message = format!("Socio {} creado", domain.name);
        CreatePartnerResponse {
            partner: Self::to_dto(domain),
            success_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner_list_keeps_order() {
        let partners = vec![
            DomainPartner { id: 2, name: "ANA".to_string() },
            DomainPartner { id: 1, name: "JUAN".to_string() },
        ];
        let dto = PartnerMapper::to_partner_list_dto(partners);
        assert_eq!(dto.partners[0], SharedPartner { id: 2, name: "ANA".to_string() });
        assert_eq!(dto.partners[1].name, "JUAN");
    }
}
