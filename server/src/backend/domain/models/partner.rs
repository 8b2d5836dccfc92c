use serde::{Deserialize, Serialize};

/// Partner as stored in `socios`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPartner {
    #[serde(rename = "nombre")]
    pub name: String,
}
