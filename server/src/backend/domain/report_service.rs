//! Report building for the settlement tracker.
//!
//! Turns stored transactions into the display table (labelled columns,
//! currency strings, newest first, grand total) and into per-partner
//! summaries with a per-type quantity breakdown.

use std::collections::{HashMap, HashSet};

use shared::{PartnerSummary, ReportResponse, ReportRow, ReportTable, TypeQuantity};
use tracing::info;

use crate::backend::domain::commands::reports::ReportFilter;
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::{
    breakdown::TypeBreakdown, livestock_type::LivestockType, partner::Partner, transaction::Transaction,
};
use crate::backend::storage::{BreakdownRepository, CatalogRepository, PartnerRepository, TransactionRepository};

/// Display labels of the settlement table, in column order
pub const REPORT_COLUMNS: [&str; 9] = [
    "Fecha",
    "Socio",
    "Cantidad",
    "KG Totales",
    "Valor por Kilo",
    "Fletes",
    "Comisión",
    "Valor por Animal",
    "Total",
];

const UNKNOWN_PARTNER: &str = "Desconocido";

/// Format an amount as `$1,234`: no decimals, comma thousands separator.
/// Negative amounts render as `$-1,234`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${}", amount);
    }
    let rounded = format!("{:.0}", amount);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}{}", sign, grouped)
}

fn format_optional_currency(amount: Option<f64>) -> String {
    amount.map(format_currency).unwrap_or_default()
}

fn unknown_type_name(type_id: i64) -> String {
    format!("(unknown {})", type_id)
}

/// Build the display table from already-filtered transactions
pub fn build_table(partners: &[Partner], transactions: &[Transaction]) -> ReportTable {
    let names: HashMap<i64, &str> = partners.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut rows: Vec<ReportRow> = transactions
        .iter()
        .map(|tx| ReportRow {
            transaction_id: tx.id,
            date: tx.date,
            partner_name: names.get(&tx.partner_id).copied().unwrap_or(UNKNOWN_PARTNER).to_string(),
            quantity: tx.quantity,
            total_weight_kg: tx.total_weight_kg,
            price_per_kg: tx.price_per_kg,
            freight_cost: tx.freight_cost,
            commission: tx.commission,
            value_per_unit: tx.value_per_unit,
            total: tx.total,
            formatted_value_per_unit: format_optional_currency(tx.value_per_unit),
            formatted_total: format_optional_currency(tx.total),
        })
        .collect();
    // Stable: same-day rows keep store order
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    let grand_total: f64 = transactions.iter().filter_map(|tx| tx.total).sum();

    ReportTable {
        columns: REPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
        grand_total,
        formatted_grand_total: format_currency(grand_total),
    }
}

/// Per-partner totals over the transactions in view
pub fn build_summaries(
    partners: &[Partner],
    types: &[LivestockType],
    transactions: &[Transaction],
    breakdowns: &[TypeBreakdown],
    filter: &ReportFilter,
) -> Vec<PartnerSummary> {
    let type_names: HashMap<i64, &str> = types.iter().map(|t| (t.id, t.name.as_str())).collect();
    let in_view: HashSet<i64> = transactions.iter().map(|tx| tx.id).collect();

    partners
        .iter()
        .filter(|partner| filter.partner_id.map_or(true, |id| id == partner.id))
        .map(|partner| {
            let own: Vec<&Transaction> = transactions.iter().filter(|tx| tx.partner_id == partner.id).collect();
            let total_quantity = own.iter().filter_map(|tx| tx.quantity).sum();
            let total_income = own.iter().filter_map(|tx| tx.total).sum();

            let mut breakdown: Vec<TypeQuantity> = Vec::new();
            for line in breakdowns.iter().filter(|b| b.partner_id == partner.id) {
                // Without a date filter every line counts, as lines carry no date of their own
                if filter.date.is_some() && !in_view.contains(&line.transaction_id) {
                    continue;
                }
                let type_name = type_names
                    .get(&line.type_id)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| unknown_type_name(line.type_id));
                match breakdown.iter_mut().find(|b| b.type_name == type_name) {
                    Some(existing) => existing.quantity += line.quantity,
                    None => breakdown.push(TypeQuantity {
                        type_name,
                        quantity: line.quantity,
                    }),
                }
            }

            PartnerSummary {
                partner_id: partner.id,
                name: partner.name.clone(),
                total_quantity,
                total_income,
                breakdown,
            }
        })
        .collect()
}

/// Service that assembles the report from the store
#[derive(Clone)]
pub struct ReportService {
    partner_repository: PartnerRepository,
    catalog_repository: CatalogRepository,
    transaction_repository: TransactionRepository,
    breakdown_repository: BreakdownRepository,
}

impl ReportService {
    pub fn new(
        partner_repository: PartnerRepository,
        catalog_repository: CatalogRepository,
        transaction_repository: TransactionRepository,
        breakdown_repository: BreakdownRepository,
    ) -> Self {
        Self {
            partner_repository,
            catalog_repository,
            transaction_repository,
            breakdown_repository,
        }
    }

    /// Build the table and summaries for the given filter. Every call reads
    /// fresh data from the store.
    pub async fn build_report(&self, filter: &ReportFilter) -> Result<ReportResponse, DomainError> {
        info!("Building report: partner_id={:?}, date={:?}", filter.partner_id, filter.date);

        let partners = self.partner_repository.list_partners().await?;
        let types = self.catalog_repository.list_active_types().await?;
        let transactions = self
            .transaction_repository
            .list_transactions(filter.partner_id, filter.date)
            .await?;
        let breakdowns = self.breakdown_repository.list_breakdowns(filter.partner_id).await?;

        Ok(ReportResponse {
            table: build_table(&partners, &transactions),
            summaries: build_summaries(&partners, &types, &transactions, &breakdowns, filter),
        })
    }

    /// Only the table part of the report
    pub async fn build_table(&self, filter: &ReportFilter) -> Result<ReportTable, DomainError> {
        let partners = self.partner_repository.list_partners().await?;
        let transactions = self
            .transaction_repository
            .list_transactions(filter.partner_id, filter.date)
            .await?;
        Ok(build_table(&partners, &transactions))
    }
}
