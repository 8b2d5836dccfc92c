use serde::{Deserialize, Serialize};

/// Catalog entry as stored in `tipos_catalogo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockType {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "activo", default)]
    pub active: bool,
}
