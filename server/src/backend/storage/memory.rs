//! In-process record store.
//!
//! Used for local runs without a hosted database and as the store double in
//! tests. Ids are assigned per table starting at 1. Test builds can inject
//! failures to exercise the partial-success paths of the domain services.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{Filter, RecordStore, Row, SelectQuery, StoreError, Table};

#[derive(Default)]
struct TableData {
    next_id: i64,
    rows: Vec<Row>,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<Table, TableData>,
    failing_inserts: HashSet<Table>,
    failing_updates: HashSet<i64>,
    omit_insert_ids: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

/// Failure injection and inspection for tests
#[cfg(test)]
impl MemoryStore {
    /// Make every insert into `table` fail
    pub fn fail_inserts_into(&self, table: Table) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_inserts.insert(table);
        }
    }

    /// Make updates targeting the row with this id fail
    pub fn fail_updates_for(&self, id: i64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_updates.insert(id);
        }
    }

    /// Store inserted rows but answer without their id
    pub fn omit_insert_ids(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.omit_insert_ids = true;
        }
    }

    /// Number of rows currently held in `table`
    pub fn row_count(&self, table: Table) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.tables.get(&table).map_or(0, |t| t.rows.len()))
            .unwrap_or(0)
    }

    /// Snapshot of all rows in `table`, in insertion order
    pub fn rows(&self, table: Table) -> Vec<Row> {
        self.inner
            .lock()
            .map(|inner| inner.tables.get(&table).map(|t| t.rows.clone()).unwrap_or_default())
            .unwrap_or_default()
    }
}

fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None, Some(_)) | (Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None) | (Some(_), Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        let inner = self.lock()?;
        let mut rows: Vec<Row> = inner
            .tables
            .get(&table)
            .map(|t| {
                t.rows
                    .iter()
                    .filter(|row| query.filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, StoreError> {
        let mut inner = self.lock()?;
        if inner.failing_inserts.contains(&table) {
            return Err(StoreError::Status {
                status: 500,
                body: format!("insert into {} rejected", table),
            });
        }
        let omit_id = inner.omit_insert_ids;

        let data = inner.tables.entry(table).or_default();
        data.next_id += 1;
        row.insert("id".to_string(), Value::from(data.next_id));
        data.rows.push(row.clone());

        if omit_id {
            row.remove("id");
        }
        Ok(row)
    }

    async fn update(&self, table: Table, fields: Row, filters: &[Filter]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let failing_updates = inner.failing_updates.clone();
        let Some(data) = inner.tables.get_mut(&table) else {
            return Ok(());
        };

        for row in data
            .rows
            .iter_mut()
            .filter(|row| filters.iter().all(|f| f.matches(row)))
        {
            if row_id(row).is_some_and(|id| failing_updates.contains(&id)) {
                return Err(StoreError::Status {
                    status: 500,
                    body: format!("update of {} rejected", table),
                });
            }
            for (key, value) in &fields {
                row.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }
}
