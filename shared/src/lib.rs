use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Business partner ("socio") that supplies livestock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,
    /// Trimmed, uppercase name. Unique across partners.
    pub name: String,
}

/// Entry of the livestock type catalog ("tipos_catalogo")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockType {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerListResponse {
    pub partners: Vec<Partner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogListResponse {
    pub types: Vec<LivestockType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePartnerRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePartnerResponse {
    pub partner: Partner,
    pub success_message: String,
}

/// Filters accepted by the report endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub partner_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

/// One display row of the settlement table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub transaction_id: i64,
    pub date: NaiveDate,
    pub partner_name: String,
    pub quantity: Option<i64>,
    pub total_weight_kg: Option<f64>,
    pub price_per_kg: Option<f64>,
    pub freight_cost: Option<f64>,
    pub commission: Option<f64>,
    pub value_per_unit: Option<f64>,
    pub total: Option<f64>,
    /// Currency string for `value_per_unit`, empty when the value is missing
    pub formatted_value_per_unit: String,
    /// Currency string for `total`, empty when the value is missing
    pub formatted_total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    /// Display labels, in column order
    pub columns: Vec<String>,
    /// Rows sorted by date, most recent first
    pub rows: Vec<ReportRow>,
    pub grand_total: f64,
    pub formatted_grand_total: String,
}

/// Summed quantity for one livestock type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeQuantity {
    pub type_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSummary {
    pub partner_id: i64,
    pub name: String,
    pub total_quantity: i64,
    pub total_income: f64,
    pub breakdown: Vec<TypeQuantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub table: ReportTable,
    pub summaries: Vec<PartnerSummary>,
}

/// Outcome of a full freight allocation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub groups: usize,
    pub updated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
