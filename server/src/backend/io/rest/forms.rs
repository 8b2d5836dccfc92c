//! Form decoding for the HTML surface.
//!
//! Browsers post the transaction form as flat `key=value` pairs, with the
//! type breakdown sent as indexed keys (`tipo_id[0]`, `cantidad_tipo[0]`,
//! `nota_tipo[0]`, ...). Everything is parsed here into a
//! `CreateTransactionCommand` so malformed numbers are rejected before any
//! write happens.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::backend::domain::commands::transactions::{BreakdownEntry, CreateTransactionCommand};
use crate::backend::domain::errors::DomainError;

/// Raw form pairs with first-wins lookup
pub struct FormFields {
    values: HashMap<String, String>,
}

impl FormFields {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        let mut values = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            values.entry(key).or_insert(value);
        }
        Self { values }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Trimmed value, `None` when absent or blank
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn required<T: FromStr>(&self, key: &str) -> Result<T, DomainError> {
        let raw = self
            .get(key)
            .ok_or_else(|| DomainError::validation(format!("Falta el campo {}", key)))?;
        raw.parse()
            .map_err(|_| DomainError::validation(format!("Valor inválido para {}: {}", key, raw)))
    }

    fn optional<T: FromStr>(&self, key: &str) -> Result<Option<T>, DomainError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| DomainError::validation(format!("Valor inválido para {}: {}", key, raw))),
        }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parse the posted transaction form
pub fn parse_transaction_form(fields: &FormFields) -> Result<CreateTransactionCommand, DomainError> {
    let partner_id = fields.required::<i64>("socio_id")?;
    let raw_date = fields
        .get("fecha")
        .ok_or_else(|| DomainError::validation("Falta el campo fecha"))?;
    let date = parse_date(raw_date).ok_or_else(|| DomainError::validation(format!("Fecha inválida: {}", raw_date)))?;

    Ok(CreateTransactionCommand {
        date,
        partner_id,
        quantity: fields.required("cantidad")?,
        total_weight_kg: fields.required("kg_totales")?,
        price_per_kg: fields.required("vr_kilo")?,
        freight_cost: fields.required("fletes")?,
        commission: fields.required("comision")?,
        breakdown: parse_breakdown(fields)?,
    })
}

/// Collect indexed breakdown lines until neither `tipo_id[i]` nor
/// `cantidad_tipo[i]` is present
fn parse_breakdown(fields: &FormFields) -> Result<Vec<BreakdownEntry>, DomainError> {
    let mut entries = Vec::new();
    for index in 0.. {
        let type_key = format!("tipo_id[{}]", index);
        let quantity_key = format!("cantidad_tipo[{}]", index);
        if !fields.contains(&type_key) && !fields.contains(&quantity_key) {
            break;
        }
        entries.push(BreakdownEntry {
            type_id: fields.optional(&type_key)?,
            quantity: fields.optional(&quantity_key)?,
            notes: fields.get(&format!("nota_tipo[{}]", index)).map(str::to_string),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("socio_id", "2"),
            ("fecha", "2024-05-01"),
            ("cantidad", "5"),
            ("kg_totales", "50"),
            ("vr_kilo", "10.5"),
            ("fletes", "100"),
            ("comision", "0"),
        ]
    }

    #[test]
    fn test_parse_complete_form() {
        let mut pairs = base();
        pairs.extend([
            ("tipo_id[0]", "3"),
            ("cantidad_tipo[0]", "2"),
            ("nota_tipo[0]", " novillos "),
            ("tipo_id[1]", ""),
            ("cantidad_tipo[1]", ""),
            ("nota_tipo[1]", ""),
        ]);

        let command = parse_transaction_form(&fields(&pairs)).unwrap();
        assert_eq!(command.partner_id, 2);
        assert_eq!(command.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(command.quantity, 5);
        assert_eq!(command.price_per_kg, 10.5);
        assert_eq!(
            command.breakdown,
            vec![
                BreakdownEntry { type_id: Some(3), quantity: Some(2), notes: Some("novillos".to_string()) },
                BreakdownEntry::default(),
            ]
        );
    }

    #[test]
    fn test_breakdown_stops_at_first_missing_index() {
        let mut pairs = base();
        pairs.extend([("tipo_id[0]", "1"), ("cantidad_tipo[0]", "1"), ("tipo_id[2]", "9")]);

        let command = parse_transaction_form(&fields(&pairs)).unwrap();
        assert_eq!(command.breakdown.len(), 1);
    }

    #[test]
    fn test_malformed_number_is_a_validation_error() {
        let mut pairs = base();
        pairs.retain(|(k, _)| *k != "kg_totales");
        pairs.push(("kg_totales", "abc"));

        let result = parse_transaction_form(&fields(&pairs));
        assert!(matches!(result, Err(DomainError::Validation(msg)) if msg.contains("kg_totales")));
    }

    #[test]
    fn test_missing_field_is_a_validation_error() {
        let mut pairs = base();
        pairs.retain(|(k, _)| *k != "comision");

        assert!(matches!(parse_transaction_form(&fields(&pairs)), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_malformed_breakdown_quantity_is_rejected() {
        let mut pairs = base();
        pairs.extend([("tipo_id[0]", "1"), ("cantidad_tipo[0]", "dos")]);

        assert!(matches!(parse_transaction_form(&fields(&pairs)), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let mut pairs = base();
        pairs.retain(|(k, _)| *k != "fecha");
        pairs.push(("fecha", "01/05/2024"));

        assert!(matches!(parse_transaction_form(&fields(&pairs)), Err(DomainError::Validation(_))));
    }
}
