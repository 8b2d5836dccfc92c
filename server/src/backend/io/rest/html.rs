//! Server-rendered report page.

use std::fmt::Write;

use shared::{LivestockType, Partner, PartnerSummary, ReportTable};

use crate::backend::domain::commands::reports::ReportFilter;
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::report_service::format_currency;
use crate::backend::io::rest::flash::FlashMessage;

pub const NO_RECORDS: &str = "<p>No hay registros disponibles.</p>";

/// Number of breakdown lines offered by the transaction form
const BREAKDOWN_LINES: usize = 3;

/// Everything the page shows
pub struct PageView<'a> {
    pub flash: Option<&'a FlashMessage>,
    pub partners: &'a [Partner],
    pub types: &'a [LivestockType],
    pub filter: ReportFilter,
    pub table: Option<&'a ReportTable>,
    pub summaries: &'a [PartnerSummary],
}

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_error(e: std::fmt::Error) -> DomainError {
    DomainError::Render(e.to_string())
}

fn number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render the page, degrading the table to the placeholder when it cannot
/// be rendered
pub fn render_page(view: &PageView<'_>) -> Result<String, DomainError> {
    let table = match view.table {
        Some(table) => render_table(table).unwrap_or_else(|e| {
            tracing::warn!("Report table could not be rendered: {}", e);
            NO_RECORDS.to_string()
        }),
        None => NO_RECORDS.to_string(),
    };

    let mut out = String::new();
    out.push_str(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Registro de Ganado</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n<body>\n\
         <h1>Registro de Ganado</h1>\n",
    );

    if let Some(flash) = view.flash {
        writeln!(
            out,
            "<div class=\"flash flash-{}\">{}</div>",
            flash.level.as_str(),
            escape(&flash.message)
        )
        .map_err(render_error)?;
    }

    render_partner_form(&mut out).map_err(render_error)?;
    render_filter_form(&mut out, view).map_err(render_error)?;
    render_transaction_form(&mut out, view).map_err(render_error)?;

    writeln!(out, "<section class=\"report\">\n<h2>Registros</h2>\n{}", table).map_err(render_error)?;
    writeln!(
        out,
        "<p><a href=\"/export.csv{}\">Descargar CSV</a></p>\n</section>",
        filter_query(&view.filter)
    )
    .map_err(render_error)?;

    render_summaries(&mut out, view.summaries).map_err(render_error)?;
    out.push_str("</body>\n</html>\n");
    Ok(out)
}

/// `?socio_id=..&fecha=..` for the active filter, empty when unfiltered
pub fn filter_query(filter: &ReportFilter) -> String {
    let mut params = Vec::new();
    if let Some(partner_id) = filter.partner_id {
        params.push(format!("socio_id={}", partner_id));
    }
    if let Some(date) = filter.date {
        params.push(format!("fecha={}", date.format("%Y-%m-%d")));
    }
    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", params.join("&"))
    }
}

/// The settlement table with its grand total row, or the placeholder when
/// there is nothing to show
pub fn render_table(table: &ReportTable) -> Result<String, DomainError> {
    if table.rows.is_empty() || table.columns.is_empty() {
        return Ok(NO_RECORDS.to_string());
    }

    let mut out = String::from("<table class=\"excel-style\">\n<thead><tr>");
    for column in &table.columns {
        write!(out, "<th>{}</th>", escape(column)).map_err(render_error)?;
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        let cells = [
            row.date.format("%Y-%m-%d").to_string(),
            format!("👤 {}", row.partner_name),
            number(row.quantity),
            number(row.total_weight_kg),
            number(row.price_per_kg),
            number(row.freight_cost),
            number(row.commission),
            row.formatted_value_per_unit.clone(),
            row.formatted_total.clone(),
        ];
        out.push_str("<tr>");
        for cell in cells.iter().take(table.columns.len()) {
            write!(out, "<td>{}</td>", escape(cell)).map_err(render_error)?;
        }
        out.push_str("</tr>\n");
    }

    writeln!(
        out,
        "<tr><td colspan=\"{}\" style=\"text-align:right;font-weight:bold;\">Gran Total</td>\
         <td style=\"font-weight:bold;\">{}</td></tr>",
        table.columns.len() - 1,
        escape(&table.formatted_grand_total)
    )
    .map_err(render_error)?;
    out.push_str("</tbody>\n</table>");
    Ok(out)
}

fn render_partner_form(out: &mut String) -> std::fmt::Result {
    writeln!(
        out,
        "<section class=\"partner-form\">\n<h2>Nuevo socio</h2>\n\
         <form method=\"post\" action=\"/crear_socio\">\n\
         <input type=\"text\" name=\"nombre\" placeholder=\"Nombre\" required>\n\
         <button type=\"submit\">Crear socio</button>\n</form>\n</section>"
    )
}

fn partner_options(out: &mut String, partners: &[Partner], selected: Option<i64>) -> std::fmt::Result {
    for partner in partners {
        let marker = if selected == Some(partner.id) { " selected" } else { "" };
        writeln!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            partner.id,
            marker,
            escape(&partner.name)
        )?;
    }
    Ok(())
}

fn render_filter_form(out: &mut String, view: &PageView<'_>) -> std::fmt::Result {
    out.push_str(
        "<section class=\"filter\">\n<h2>Filtrar</h2>\n<form method=\"get\" action=\"/\">\n\
         <select name=\"socio_id\">\n<option value=\"\">Todos</option>\n",
    );
    partner_options(out, view.partners, view.filter.partner_id)?;
    writeln!(
        out,
        "</select>\n<input type=\"date\" name=\"fecha\" value=\"{}\">\n\
         <button type=\"submit\">Filtrar</button>\n</form>\n</section>",
        view.filter.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
    )
}

fn render_transaction_form(out: &mut String, view: &PageView<'_>) -> std::fmt::Result {
    out.push_str(
        "<section class=\"transaction-form\">\n<h2>Nuevo registro</h2>\n\
         <form method=\"post\" action=\"/\">\n<select name=\"socio_id\" required>\n",
    );
    partner_options(out, view.partners, view.filter.partner_id)?;
    writeln!(
        out,
        "</select>\n<input type=\"date\" name=\"fecha\" value=\"{}\" required>",
        view.filter.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
    )?;

    let fields = [
        ("cantidad", "Cantidad", "1"),
        ("kg_totales", "KG Totales", "any"),
        ("vr_kilo", "Valor por Kilo", "any"),
        ("fletes", "Fletes", "any"),
        ("comision", "Comisión", "any"),
    ];
    for (name, label, step) in fields {
        writeln!(
            out,
            "<label>{} <input type=\"number\" name=\"{}\" step=\"{}\" required></label>",
            label, name, step
        )?;
    }

    out.push_str("<fieldset>\n<legend>Desglose por tipo</legend>\n");
    for index in 0..BREAKDOWN_LINES {
        writeln!(out, "<div class=\"breakdown-line\">\n<select name=\"tipo_id[{}]\">", index)?;
        out.push_str("<option value=\"\">Tipo</option>\n");
        for livestock_type in view.types {
            writeln!(
                out,
                "<option value=\"{}\">{}</option>",
                livestock_type.id,
                escape(&livestock_type.name)
            )?;
        }
        writeln!(
            out,
            "</select>\n<input type=\"number\" name=\"cantidad_tipo[{0}]\" placeholder=\"Cantidad\">\n\
             <input type=\"text\" name=\"nota_tipo[{0}]\" placeholder=\"Notas\">\n</div>",
            index
        )?;
    }
    out.push_str("</fieldset>\n<button type=\"submit\">Guardar</button>\n</form>\n</section>\n");
    Ok(())
}

fn render_summaries(out: &mut String, summaries: &[PartnerSummary]) -> std::fmt::Result {
    if summaries.is_empty() {
        return Ok(());
    }
    out.push_str("<section class=\"summaries\">\n<h2>Resumen por socio</h2>\n");
    for summary in summaries {
        writeln!(
            out,
            "<div class=\"summary\">\n<h3>{}</h3>\n<p>Cantidad total: {}</p>\n<p>Ingresos: {}</p>",
            escape(&summary.name),
            summary.total_quantity,
            format_currency(summary.total_income)
        )?;
        if !summary.breakdown.is_empty() {
            out.push_str("<ul>\n");
            for line in &summary.breakdown {
                writeln!(out, "<li>{}: {}</li>", escape(&line.type_name), line.quantity)?;
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</div>\n");
    }
    out.push_str("</section>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::{ReportRow, TypeQuantity};

    fn table_with_rows(rows: Vec<ReportRow>) -> ReportTable {
        ReportTable {
            columns: crate::backend::domain::REPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
            grand_total: 1550.0,
            formatted_grand_total: "$1,550".to_string(),
        }
    }

    fn row(name: &str) -> ReportRow {
        ReportRow {
            transaction_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            partner_name: name.to_string(),
            quantity: Some(5),
            total_weight_kg: Some(50.0),
            price_per_kg: Some(10.0),
            freight_cost: Some(100.0),
            commission: Some(0.0),
            value_per_unit: Some(110.0),
            total: Some(550.0),
            formatted_value_per_unit: "$110".to_string(),
            formatted_total: "$550".to_string(),
        }
    }

    #[test]
    fn test_empty_table_renders_placeholder() {
        assert_eq!(render_table(&table_with_rows(Vec::new())).unwrap(), NO_RECORDS);
    }

    #[test]
    fn test_table_has_grand_total_row_spanning_all_but_last_column() {
        let html = render_table(&table_with_rows(vec![row("JUAN")])).unwrap();
        assert!(html.contains("<th>Valor por Animal</th>"));
        assert!(html.contains("<td>👤 JUAN</td>"));
        assert!(html.contains("colspan=\"8\""));
        assert!(html.contains("Gran Total"));
        assert!(html.contains("$1,550"));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render_table(&table_with_rows(vec![row("<script>")])).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_page_shows_flash_forms_and_summaries() {
        let partners = vec![Partner { id: 2, name: "ANA".to_string() }];
        let types = vec![LivestockType { id: 7, name: "Novillo".to_string(), active: true }];
        let summaries = vec![PartnerSummary {
            partner_id: 2,
            name: "ANA".to_string(),
            total_quantity: 5,
            total_income: 550.0,
            breakdown: vec![TypeQuantity { type_name: "Novillo".to_string(), quantity: 5 }],
        }];
        let flash = FlashMessage::success("✅ Registro guardado correctamente");
        let view = PageView {
            flash: Some(&flash),
            partners: &partners,
            types: &types,
            filter: ReportFilter { partner_id: Some(2), date: None },
            table: None,
            summaries: &summaries,
        };

        let html = render_page(&view).unwrap();
        assert!(html.contains("flash-success"));
        assert!(html.contains("<option value=\"2\" selected>ANA</option>"));
        assert!(html.contains("name=\"tipo_id[2]\""));
        assert!(html.contains("<option value=\"7\">Novillo</option>"));
        assert!(html.contains(NO_RECORDS));
        assert!(html.contains("<li>Novillo: 5</li>"));
        assert!(html.contains("Ingresos: $550"));
        assert!(html.contains("/export.csv?socio_id=2"));
    }

    #[test]
    fn test_filter_query() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(filter_query(&ReportFilter::default()), "");
        assert_eq!(
            filter_query(&ReportFilter { partner_id: Some(3), date }),
            "?socio_id=3&fecha=2024-05-01"
        );
    }
}
