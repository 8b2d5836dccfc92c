use serde::{Deserialize, Serialize};

/// Per-type quantity line attached to a transaction (`tipo_ganado`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub id: i64,
    #[serde(rename = "registro_id")]
    pub transaction_id: i64,
    #[serde(rename = "socio_id")]
    pub partner_id: i64,
    #[serde(rename = "tipo")]
    pub type_id: i64,
    #[serde(rename = "cantidad", default)]
    pub quantity: i64,
    #[serde(rename = "notas", default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTypeBreakdown {
    #[serde(rename = "registro_id")]
    pub transaction_id: i64,
    #[serde(rename = "socio_id")]
    pub partner_id: i64,
    #[serde(rename = "tipo")]
    pub type_id: i64,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "notas")]
    pub notes: Option<String>,
}
