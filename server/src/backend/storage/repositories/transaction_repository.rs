use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::backend::domain::models::transaction::{GroupKey, NewTransaction, RejectedTransaction, Transaction};
use crate::backend::storage::traits::{Filter, RecordStore, Row, SelectQuery, StoreError, Table};

use super::{decode_rows, decode_rows_keeping_rejects, encode_row, inserted_id};

/// Every stored row of `registros`, split by whether it decodes
#[derive(Debug, Clone, Default)]
pub struct StoredTransactions {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedTransaction>,
}

/// Group key read straight from the key columns of a raw row
fn raw_group_key(row: &Row) -> Option<GroupKey> {
    let date = row
        .get("fecha")
        .and_then(Value::as_str)
        .and_then(|raw| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok())?;
    let partner_id = match row.get("socio_id")? {
        Value::String(raw) => raw.trim().parse().ok(),
        other => other.as_i64(),
    }?;
    Some(GroupKey { date, partner_id })
}

/// Repository for transaction (`registros`) operations
#[derive(Clone)]
pub struct TransactionRepository {
    store: Arc<dyn RecordStore>,
}

impl TransactionRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Every stored row in id order, including rows that fail typed
    /// decoding so callers can still count them per group
    pub async fn list_for_allocation(&self) -> Result<StoredTransactions, StoreError> {
        let query = SelectQuery::new().order_by("id", true);
        let rows = self.store.select(Table::Transactions, &query).await?;
        let (transactions, rejected) = decode_rows_keeping_rejects(Table::Transactions, rows);
        Ok(StoredTransactions {
            transactions,
            rejected: rejected
                .iter()
                .map(|row| RejectedTransaction {
                    id: row.get("id").and_then(Value::as_i64),
                    group_key: raw_group_key(row),
                })
                .collect(),
        })
    }

    /// Transactions narrowed by partner and/or date
    pub async fn list_transactions(
        &self,
        partner_id: Option<i64>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut query = SelectQuery::new().order_by("id", true);
        if let Some(partner_id) = partner_id {
            query = query.filter(Filter::eq("socio_id", partner_id));
        }
        if let Some(date) = date {
            query = query.filter(Filter::eq("fecha", date.to_string()));
        }
        let rows = self.store.select(Table::Transactions, &query).await?;
        Ok(decode_rows(Table::Transactions, rows))
    }

    /// Number of stored rows sharing (date, partner), decodable or not.
    /// Membership is read from the raw key columns, the same way
    /// `list_for_allocation` places rejected rows.
    pub async fn count_in_group(&self, date: NaiveDate, partner_id: i64) -> Result<usize, StoreError> {
        let key = GroupKey { date, partner_id };
        let rows = self.store.select(Table::Transactions, &SelectQuery::new()).await?;
        Ok(rows.iter().filter(|row| raw_group_key(row) == Some(key)).count())
    }

    /// Store a transaction and return the id assigned by the store
    pub async fn store_transaction(&self, transaction: &NewTransaction) -> Result<i64, StoreError> {
        let row = encode_row(Table::Transactions, transaction)?;
        let stored = self.store.insert(Table::Transactions, row).await?;
        inserted_id(Table::Transactions, &stored)
    }

    /// Persist recomputed derived fields for one transaction
    pub async fn update_derived_values(
        &self,
        transaction_id: i64,
        total: f64,
        value_per_unit: f64,
    ) -> Result<(), StoreError> {
        let mut fields = Row::new();
        fields.insert("total".to_string(), json!(total));
        fields.insert("valor_por_animal".to_string(), json!(value_per_unit));
        self.store
            .update(Table::Transactions, fields, &[Filter::eq("id", transaction_id)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::MemoryStore;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_list_for_allocation_keeps_rejected_rows_with_their_key() {
        let store = MemoryStore::new();
        for value in [
            json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 4}),
            json!({"fecha": "2024-05-01", "socio_id": "1", "cantidad": 2}),
            json!({"fecha": "mayo", "socio_id": 1}),
        ] {
            store.insert(Table::Transactions, row(value)).await.unwrap();
        }
        let repository = TransactionRepository::new(Arc::new(store));

        let stored = repository.list_for_allocation().await.unwrap();
        assert_eq!(stored.transactions.len(), 1);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            stored.rejected,
            vec![
                RejectedTransaction { id: Some(2), group_key: Some(GroupKey { date, partner_id: 1 }) },
                RejectedTransaction { id: Some(3), group_key: None },
            ]
        );
        assert_eq!(repository.count_in_group(date, 1).await.unwrap(), 2);
    }
}
