//! CSV export of the settlement table.
//!
//! Columns match the HTML table; amounts are written as raw numbers so the
//! file can be re-opened in a spreadsheet without parsing currency strings.

use chrono::NaiveDate;
use shared::ReportTable;
use tracing::info;

use crate::backend::domain::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Export service that renders report tables as CSV
#[derive(Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Render `table` as CSV. `today` only feeds the file name.
    pub fn export_table_csv(&self, table: &ReportTable, today: NaiveDate) -> Result<CsvExport, DomainError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let render_err = |e: csv::Error| DomainError::Render(e.to_string());

        writer.write_record(&table.columns).map_err(render_err)?;
        for row in &table.rows {
            writer
                .write_record([
                    row.date.to_string(),
                    row.partner_name.clone(),
                    optional(row.quantity),
                    optional(row.total_weight_kg),
                    optional(row.price_per_kg),
                    optional(row.freight_cost),
                    optional(row.commission),
                    optional(row.value_per_unit),
                    optional(row.total),
                ])
                .map_err(render_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DomainError::Render(e.to_string()))?;
        let content = String::from_utf8(bytes).map_err(|e| DomainError::Render(e.to_string()))?;

        let filename = format!("registros_{}.csv", today.format("%Y%m%d"));
        info!("Exported {} rows as {}", table.rows.len(), filename);
        Ok(CsvExport { filename, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{partner::Partner, transaction::Transaction};
    use crate::backend::domain::report_service::build_table;

    #[test]
    fn test_export_table_csv() {
        let partners = vec![Partner { id: 1, name: "PÉREZ, ANA".to_string() }];
        let transactions = vec![Transaction {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            partner_id: 1,
            quantity: Some(5),
            total_weight_kg: Some(50.0),
            price_per_kg: Some(10.0),
            freight_cost: Some(100.0),
            commission: None,
            value_per_unit: Some(110.0),
            total: Some(550.0),
        }];
        let table = build_table(&partners, &transactions);

        let export = ExportService::new()
            .export_table_csv(&table, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .unwrap();

        assert_eq!(export.filename, "registros_20240630.csv");
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(
            lines[0],
            "Fecha,Socio,Cantidad,KG Totales,Valor por Kilo,Fletes,Comisión,Valor por Animal,Total"
        );
        assert_eq!(lines[1], "2024-05-01,\"PÉREZ, ANA\",5,50,10,100,,110,550");
    }

    #[test]
    fn test_export_empty_table_has_header_only() {
        let table = build_table(&[], &[]);
        let export = ExportService::new()
            .export_table_csv(&table, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .unwrap();
        assert_eq!(export.content.lines().count(), 1);
    }
}
