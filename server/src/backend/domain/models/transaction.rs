//! Domain model for a settlement transaction ("registro").
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Transaction as stored in `registros`.
///
/// Numeric columns are nullable in the hosted table, so they decode as
/// options and are validated where a value is actually needed. They also
/// accept integral floats and numeric strings; anything else decodes as
/// `None` so the row still joins its group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "socio_id")]
    pub partner_id: i64,
    #[serde(rename = "cantidad", default, deserialize_with = "lenient::quantity")]
    pub quantity: Option<i64>,
    #[serde(rename = "kg_totales", default, deserialize_with = "lenient::amount")]
    pub total_weight_kg: Option<f64>,
    #[serde(rename = "vr_kilo", default, deserialize_with = "lenient::amount")]
    pub price_per_kg: Option<f64>,
    #[serde(rename = "fletes", default, deserialize_with = "lenient::amount")]
    pub freight_cost: Option<f64>,
    #[serde(rename = "comision", default, deserialize_with = "lenient::amount")]
    pub commission: Option<f64>,
    #[serde(rename = "valor_por_animal", default, deserialize_with = "lenient::amount")]
    pub value_per_unit: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total: Option<f64>,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        })
    }

    pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if let Some(n) = value.as_i64() {
            return Ok(Some(n));
        }
        let as_float = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(as_float
            .filter(|q| q.is_finite() && q.fract() == 0.0 && q.abs() < i64::MAX as f64)
            .map(|q| q as i64))
    }
}

/// Composite key shared by transactions whose freight is split together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub date: NaiveDate,
    pub partner_id: i64,
}

impl Transaction {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            date: self.date,
            partner_id: self.partner_id,
        }
    }
}

/// A stored row that could not be decoded as a `Transaction`. It still
/// counts toward its group when the key columns are readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedTransaction {
    pub id: Option<i64>,
    pub group_key: Option<GroupKey>,
}

/// Row written by the recorder, derived fields already computed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "socio_id")]
    pub partner_id: i64,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "kg_totales")]
    pub total_weight_kg: f64,
    #[serde(rename = "vr_kilo")]
    pub price_per_kg: f64,
    #[serde(rename = "fletes")]
    pub freight_cost: f64,
    #[serde(rename = "comision")]
    pub commission: f64,
    #[serde(rename = "valor_por_animal")]
    pub value_per_unit: f64,
    pub total: f64,
}

impl NewTransaction {
    pub fn into_stored(self, id: i64) -> Transaction {
        Transaction {
            id,
            date: self.date,
            partner_id: self.partner_id,
            quantity: Some(self.quantity),
            total_weight_kg: Some(self.total_weight_kg),
            price_per_kg: Some(self.price_per_kg),
            freight_cost: Some(self.freight_cost),
            commission: Some(self.commission),
            value_per_unit: Some(self.value_per_unit),
            total: Some(self.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_stored_row_with_nulls() {
        let row = json!({
            "id": 3,
            "fecha": "2024-05-01",
            "socio_id": 2,
            "cantidad": 5,
            "kg_totales": 50,
            "vr_kilo": 10.5,
            "fletes": null,
            "comision": 0,
            "valor_por_animal": null,
            "total": null,
            "inserted_at": "2024-05-01T10:00:00Z"
        });
        let tx: Transaction = serde_json::from_value(row).unwrap();
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(tx.total_weight_kg, Some(50.0));
        assert_eq!(tx.freight_cost, None);
        assert_eq!(tx.total, None);
    }

    #[test]
    fn test_numeric_columns_decode_leniently() {
        let row = json!({
            "id": 4,
            "fecha": "2024-05-01",
            "socio_id": 1,
            "cantidad": 4.0,
            "kg_totales": "20",
            "vr_kilo": 5,
            "fletes": "n/a",
            "comision": true
        });
        let tx: Transaction = serde_json::from_value(row).unwrap();
        assert_eq!(tx.quantity, Some(4));
        assert_eq!(tx.total_weight_kg, Some(20.0));
        assert_eq!(tx.price_per_kg, Some(5.0));
        assert_eq!(tx.freight_cost, None);
        assert_eq!(tx.commission, None);
        assert_eq!(tx.total, None);
    }

    #[test]
    fn test_fractional_quantity_decodes_as_missing() {
        let row = json!({"id": 5, "fecha": "2024-05-01", "socio_id": 1, "cantidad": 4.5});
        let tx: Transaction = serde_json::from_value(row).unwrap();
        assert_eq!(tx.quantity, None);
    }

    #[test]
    fn test_new_transaction_uses_store_column_names() {
        let new_tx = NewTransaction {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            partner_id: 1,
            quantity: 5,
            total_weight_kg: 50.0,
            price_per_kg: 10.0,
            freight_cost: 100.0,
            commission: 0.0,
            value_per_unit: 110.0,
            total: 550.0,
        };
        let value = serde_json::to_value(&new_tx).unwrap();
        assert_eq!(value["fecha"], json!("2024-05-01"));
        assert_eq!(value["kg_totales"], json!(50.0));
        assert_eq!(value["valor_por_animal"], json!(110.0));
    }
}
