//! # Storage Traits
//!
//! This module defines the record store abstraction that lets the domain
//! layer talk to the hosted database, or to an in-memory stand-in, without
//! knowing which one it is using.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// A schema-less row as exchanged with the store. Repositories decode rows
/// into typed models before handing them to the domain layer.
pub type Row = Map<String, Value>;

/// Tables known to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Partners,
    Transactions,
    TypeCatalog,
    TypeBreakdown,
}

impl Table {
    /// Name of the table in the remote database
    pub fn name(&self) -> &'static str {
        match self {
            Table::Partners => "socios",
            Table::Transactions => "registros",
            Table::TypeCatalog => "tipos_catalogo",
            Table::TypeBreakdown => "tipo_ganado",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality filter on a single column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            value: value.into(),
        }
    }

    /// Whether `row` satisfies this filter
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Parameters of a select: all filters must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }
}

/// Failures talking to the record store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode {table} row: {message}")]
    Decode { table: Table, message: String },
    #[error("store did not return an id for the new {0} row")]
    MissingId(Table),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Trait defining the interface to the record store
///
/// The store owns persistence, filtering and id assignment. Implementations
/// must be safe to share between request handlers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return every row of `table` matching the query
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Row>, StoreError>;

    /// Insert a row and return it as stored, including its assigned id
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Set `fields` on every row matching all `filters`
    async fn update(&self, table: Table, fields: Row, filters: &[Filter]) -> Result<(), StoreError>;
}
