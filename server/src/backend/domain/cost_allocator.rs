//! Freight allocation for transactions sharing a date and partner.
//!
//! Every transaction in a (date, partner) group of size `n` gets
//!
//! ```text
//! total          = total_weight_kg * price_per_kg + freight_cost / n
//! value_per_unit = total / quantity
//! ```
//!
//! `freight_cost` is each transaction's own stored figure, not a sum over the
//! group. Stored data has always been computed this way, so the rule is kept
//! as is; `test_freight_uses_each_members_own_figure` pins it down.
//!
//! Allocation is idempotent: running it again over unchanged data produces
//! the same values.

use std::collections::{HashMap, HashSet};

use tracing::{error, info};

use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::transaction::{GroupKey, RejectedTransaction, Transaction};
use crate::backend::storage::TransactionRepository;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedValues {
    pub total: f64,
    pub value_per_unit: f64,
}

/// Why a single transaction could not be allocated
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("quantity is zero")]
    ZeroQuantity,
    #[error("missing or invalid {0}")]
    MissingField(&'static str),
}

/// Allocation outcome for one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub transaction_id: i64,
    pub group_size: usize,
    pub result: Result<DerivedValues, AllocationError>,
}

/// Counters reported after a reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub groups: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Derived totals for one transaction in a group of `group_size`
pub fn compute_derived(
    total_weight_kg: f64,
    price_per_kg: f64,
    freight_cost: f64,
    quantity: i64,
    group_size: usize,
) -> Result<DerivedValues, AllocationError> {
    if quantity == 0 {
        return Err(AllocationError::ZeroQuantity);
    }
    let total = total_weight_kg * price_per_kg + freight_cost / group_size as f64;
    Ok(DerivedValues {
        total,
        value_per_unit: total / quantity as f64,
    })
}

fn allocate_member(transaction: &Transaction, group_size: usize) -> Result<DerivedValues, AllocationError> {
    let weight = transaction
        .total_weight_kg
        .ok_or(AllocationError::MissingField("kg_totales"))?;
    let price = transaction
        .price_per_kg
        .ok_or(AllocationError::MissingField("vr_kilo"))?;
    let freight = transaction
        .freight_cost
        .ok_or(AllocationError::MissingField("fletes"))?;
    let quantity = transaction
        .quantity
        .ok_or(AllocationError::MissingField("cantidad"))?;
    compute_derived(weight, price, freight, quantity, group_size)
}

/// Group transactions by (date, partner), keeping first-seen group order
pub fn group_transactions(transactions: &[Transaction]) -> Vec<Vec<&Transaction>> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Transaction>> = Vec::new();
    for transaction in transactions {
        let slot = *index.entry(transaction.group_key()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(transaction);
    }
    groups
}

/// Allocate every transaction. Failures are reported per transaction and
/// still count toward their group's size.
pub fn allocate(transactions: &[Transaction]) -> Vec<Allocation> {
    allocate_with_rejects(transactions, &[])
}

/// Allocate every transaction, counting rows that failed decoding toward
/// the size of the group their key names
pub fn allocate_with_rejects(transactions: &[Transaction], rejected: &[RejectedTransaction]) -> Vec<Allocation> {
    let mut extra: HashMap<GroupKey, usize> = HashMap::new();
    for key in rejected.iter().filter_map(|r| r.group_key) {
        *extra.entry(key).or_default() += 1;
    }

    group_transactions(transactions)
        .into_iter()
        .flat_map(|group| {
            let rejected_members = group
                .first()
                .and_then(|t| extra.get(&t.group_key()))
                .copied()
                .unwrap_or(0);
            let group_size = group.len() + rejected_members;
            group.into_iter().map(move |transaction| Allocation {
                transaction_id: transaction.id,
                group_size,
                result: allocate_member(transaction, group_size),
            })
        })
        .collect()
}

/// Recomputes and persists derived fields across the whole store
#[derive(Clone)]
pub struct CostAllocator {
    transaction_repository: TransactionRepository,
}

impl CostAllocator {
    pub fn new(transaction_repository: TransactionRepository) -> Self {
        Self {
            transaction_repository,
        }
    }

    /// Reconcile every (date, partner) group.
    ///
    /// Only the initial read is fatal. A transaction that cannot be
    /// decoded, allocated or written is logged and counted as failed; the
    /// rest are still updated. Undecodable rows keep their place in `n`.
    pub async fn reconcile_all(&self) -> Result<ReconcileSummary, DomainError> {
        let stored = self.transaction_repository.list_for_allocation().await?;
        let mut keys: HashSet<GroupKey> = stored.transactions.iter().map(Transaction::group_key).collect();
        keys.extend(stored.rejected.iter().filter_map(|r| r.group_key));
        let mut summary = ReconcileSummary {
            groups: keys.len(),
            failed: stored.rejected.len(),
            ..ReconcileSummary::default()
        };
        for rejected in &stored.rejected {
            error!("Cannot allocate transaction id={:?}: stored row does not decode", rejected.id);
        }

        for allocation in allocate_with_rejects(&stored.transactions, &stored.rejected) {
            let values = match allocation.result {
                Ok(values) => values,
                Err(e) => {
                    error!("Cannot allocate transaction id={}: {}", allocation.transaction_id, e);
                    summary.failed += 1;
                    continue;
                }
            };

            match self
                .transaction_repository
                .update_derived_values(allocation.transaction_id, values.total, values.value_per_unit)
                .await
            {
                Ok(()) => summary.updated += 1,
                Err(e) => {
                    error!("Failed to update transaction id={}: {}", allocation.transaction_id, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Reconciled {} groups: {} updated, {} failed",
            summary.groups, summary.updated, summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::{MemoryStore, RecordStore, Row, Table};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn tx(id: i64, day: u32, partner_id: i64, quantity: i64, weight: f64, price: f64, freight: f64) -> Transaction {
        Transaction {
            id,
            date: date(day),
            partner_id,
            quantity: Some(quantity),
            total_weight_kg: Some(weight),
            price_per_kg: Some(price),
            freight_cost: Some(freight),
            commission: Some(0.0),
            value_per_unit: None,
            total: None,
        }
    }

    async fn seed(store: &MemoryStore, rows: &[serde_json::Value]) {
        for row in rows {
            let row: Row = row.as_object().cloned().unwrap();
            store.insert(Table::Transactions, row).await.unwrap();
        }
    }

    #[test]
    fn test_single_member_group() {
        let values = compute_derived(50.0, 10.0, 100.0, 5, 1).unwrap();
        assert_eq!(values.total, 600.0);
        assert_eq!(values.value_per_unit, 120.0);
    }

    #[test]
    fn test_zero_quantity_is_an_error() {
        assert_eq!(
            compute_derived(50.0, 10.0, 100.0, 0, 1),
            Err(AllocationError::ZeroQuantity)
        );
    }

    #[test]
    fn test_freight_uses_each_members_own_figure() {
        // Freight is not pooled: each member divides its own freight by n.
        let transactions = vec![
            tx(1, 1, 7, 2, 10.0, 1.0, 100.0),
            tx(2, 1, 7, 2, 10.0, 1.0, 40.0),
        ];
        let allocations = allocate(&transactions);

        assert_eq!(allocations[0].result.as_ref().unwrap().total, 10.0 + 50.0);
        assert_eq!(allocations[1].result.as_ref().unwrap().total, 10.0 + 20.0);
    }

    #[test]
    fn test_groups_split_by_date_and_partner() {
        let transactions = vec![
            tx(1, 1, 7, 1, 1.0, 1.0, 30.0),
            tx(2, 2, 7, 1, 1.0, 1.0, 30.0),
            tx(3, 1, 8, 1, 1.0, 1.0, 30.0),
            tx(4, 1, 7, 1, 1.0, 1.0, 30.0),
        ];
        let groups = group_transactions(&transactions);
        let ids: Vec<Vec<i64>> = groups.iter().map(|g| g.iter().map(|t| t.id).collect()).collect();
        assert_eq!(ids, vec![vec![1, 4], vec![2], vec![3]]);

        let allocations = allocate(&transactions);
        let sizes: Vec<(i64, usize)> = allocations.iter().map(|a| (a.transaction_id, a.group_size)).collect();
        assert_eq!(sizes, vec![(1, 2), (4, 2), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_failed_member_still_counts_toward_group_size() {
        let mut broken = tx(2, 1, 7, 0, 10.0, 1.0, 100.0);
        broken.price_per_kg = None;
        let transactions = vec![tx(1, 1, 7, 2, 10.0, 1.0, 100.0), broken];

        let allocations = allocate(&transactions);
        assert_eq!(allocations[0].result.as_ref().unwrap().total, 60.0);
        assert_eq!(allocations[1].result, Err(AllocationError::MissingField("vr_kilo")));
    }

    #[tokio::test]
    async fn test_reconcile_all_persists_group_values() {
        let store = MemoryStore::new();
        seed(
            &store,
            &[
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 4, "kg_totales": 20.0, "vr_kilo": 5.0, "fletes": 100.0, "comision": 0.0}),
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 5, "kg_totales": 50.0, "vr_kilo": 10.0, "fletes": 100.0, "comision": 0.0}),
                json!({"fecha": "2024-05-02", "socio_id": 1, "cantidad": 2, "kg_totales": 10.0, "vr_kilo": 10.0, "fletes": 20.0, "comision": 0.0}),
            ],
        )
        .await;
        let allocator = CostAllocator::new(TransactionRepository::new(Arc::new(store.clone())));

        let summary = allocator.reconcile_all().await.unwrap();
        assert_eq!(summary, ReconcileSummary { groups: 2, updated: 3, failed: 0 });

        let rows = store.rows(Table::Transactions);
        assert_eq!(rows[0]["total"], json!(150.0));
        assert_eq!(rows[0]["valor_por_animal"], json!(37.5));
        assert_eq!(rows[1]["total"], json!(550.0));
        assert_eq!(rows[1]["valor_por_animal"], json!(110.0));
        assert_eq!(rows[2]["total"], json!(120.0));
        assert_eq!(rows[2]["valor_por_animal"], json!(60.0));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let store = MemoryStore::new();
        seed(
            &store,
            &[
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 3, "kg_totales": 33.3, "vr_kilo": 7.1, "fletes": 10.0, "comision": 1.0}),
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 7, "kg_totales": 12.5, "vr_kilo": 9.9, "fletes": 55.0, "comision": 1.0}),
            ],
        )
        .await;
        let allocator = CostAllocator::new(TransactionRepository::new(Arc::new(store.clone())));

        allocator.reconcile_all().await.unwrap();
        let first = store.rows(Table::Transactions);
        allocator.reconcile_all().await.unwrap();
        let second = store.rows(Table::Transactions);

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_zero_quantity_row_does_not_block_siblings() {
        let store = MemoryStore::new();
        seed(
            &store,
            &[
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 0, "kg_totales": 20.0, "vr_kilo": 5.0, "fletes": 100.0, "comision": 0.0, "total": 1.0}),
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 5, "kg_totales": 50.0, "vr_kilo": 10.0, "fletes": 100.0, "comision": 0.0}),
            ],
        )
        .await;
        let allocator = CostAllocator::new(TransactionRepository::new(Arc::new(store.clone())));

        let summary = allocator.reconcile_all().await.unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.failed, 1);

        let rows = store.rows(Table::Transactions);
        assert_eq!(rows[0]["total"], json!(1.0));
        assert_eq!(rows[1]["total"], json!(550.0));
    }

    #[test]
    fn test_rejected_rows_count_toward_their_group() {
        let rejected = [
            RejectedTransaction { id: Some(9), group_key: Some(GroupKey { date: date(1), partner_id: 7 }) },
            RejectedTransaction { id: Some(10), group_key: None },
        ];
        let transactions = vec![tx(1, 1, 7, 2, 10.0, 1.0, 100.0), tx(2, 2, 7, 2, 10.0, 1.0, 100.0)];

        let allocations = allocate_with_rejects(&transactions, &rejected);
        assert_eq!(allocations[0].group_size, 2);
        assert_eq!(allocations[0].result.as_ref().unwrap().total, 60.0);
        assert_eq!(allocations[1].group_size, 1);
    }

    #[tokio::test]
    async fn test_undecodable_row_keeps_its_place_in_the_group() {
        let store = MemoryStore::new();
        seed(
            &store,
            &[
                json!({"fecha": "2024-05-01", "socio_id": "1", "cantidad": 4, "kg_totales": 20.0, "vr_kilo": 5.0, "fletes": 100.0}),
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 5, "kg_totales": 50.0, "vr_kilo": 10.0, "fletes": 100.0, "comision": 0.0}),
            ],
        )
        .await;
        let allocator = CostAllocator::new(TransactionRepository::new(Arc::new(store.clone())));

        let summary = allocator.reconcile_all().await.unwrap();
        assert_eq!(summary, ReconcileSummary { groups: 1, updated: 1, failed: 1 });
        assert_eq!(store.rows(Table::Transactions)[1]["total"], json!(550.0));
    }

    #[tokio::test]
    async fn test_store_write_failure_is_isolated() {
        let store = MemoryStore::new();
        seed(
            &store,
            &[
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 1, "kg_totales": 1.0, "vr_kilo": 1.0, "fletes": 0.0, "comision": 0.0}),
                json!({"fecha": "2024-05-01", "socio_id": 1, "cantidad": 1, "kg_totales": 2.0, "vr_kilo": 1.0, "fletes": 0.0, "comision": 0.0}),
            ],
        )
        .await;
        store.fail_updates_for(1);
        let allocator = CostAllocator::new(TransactionRepository::new(Arc::new(store.clone())));

        let summary = allocator.reconcile_all().await.unwrap();
        assert_eq!(summary, ReconcileSummary { groups: 1, updated: 1, failed: 1 });
        assert_eq!(store.rows(Table::Transactions)[1]["total"], json!(2.0));
    }
}
