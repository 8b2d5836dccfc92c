//! Record store backed by a hosted PostgREST endpoint (Supabase).
//!
//! Selects map to `GET /rest/v1/<table>?col=eq.value&order=col.asc`, inserts
//! to `POST` with `Prefer: return=representation`, and updates to `PATCH`
//! with the same filter syntax.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use super::traits::{Filter, RecordStore, Row, SelectQuery, StoreError, Table};

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    /// Create a client for the project at `base_url` (e.g. "https://xyz.supabase.co")
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

/// Render a filter value the way PostgREST expects it after `eq.`
fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), format!("eq.{}", filter_value(&f.value))))
        .collect()
}

pub(crate) fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(&query.filters));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    params
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        let params = select_params(query);
        debug!("select {} {:?}", table, params);

        let request = self.client.get(self.table_url(table)).query(&params);
        let response = check_status(self.authorized(request).send().await?).await?;
        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        debug!("insert {} {:?}", table, row);

        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let response = check_status(self.authorized(request).send().await?).await?;
        let mut rows = response.json::<Vec<Row>>().await?;
        if rows.is_empty() {
            return Err(StoreError::MissingId(table));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(&self, table: Table, fields: Row, filters: &[Filter]) -> Result<(), StoreError> {
        if filters.is_empty() {
            // PostgREST would patch the whole table
            return Err(StoreError::Unavailable(format!(
                "refusing unfiltered update on {}",
                table
            )));
        }
        debug!("update {} {:?} where {:?}", table, fields, filters);

        let request = self
            .client
            .patch(self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=minimal")
            .json(&fields);
        check_status(self.authorized(request).send().await?).await?;
        Ok(())
    }
}
