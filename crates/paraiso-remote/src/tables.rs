//! Table access over the PostgREST-style `/rest/v1` API.

use std::sync::Arc;

use async_trait::async_trait;
use paraiso_store::{Backend, Query, StoreError};
use serde_json::Value;
use tracing::info;

use crate::RemoteError;
use crate::conn::Connection;
use crate::error::check;

pub struct RestBackend {
    conn: Arc<Connection>,
}

/// Translate a [`Query`] into `?select=*&col=eq.value&order=col.desc&limit=n`.
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for (column, value) in &query.filters {
        params.push((column.clone(), format!("eq.{value}")));
    }
    if let Some(order) = &query.order {
        let dir = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{dir}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// Insert and update answer with an array of affected rows.
fn first_row(rows: Vec<Value>) -> Option<Value> {
    rows.into_iter().next()
}

impl RestBackend {
    pub(crate) fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }

    fn table_url(&self, table: &str) -> String {
        self.conn.endpoint(&format!("rest/v1/{table}"))
    }

    async fn get_rows(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
        let url = self.table_url(table);
        let resp = self
            .conn
            .authorize(self.conn.client.get(&url))
            .query(&query_params(query))
            .send()
            .await?;
        let rows: Vec<Value> = check(resp).await?.json().await?;
        info!(table, count = rows.len(), "selected rows");
        Ok(rows)
    }

    async fn post_row(&self, table: &str, row: &Value) -> Result<Value, RemoteError> {
        let url = self.table_url(table);
        let resp = self
            .conn
            .authorize(self.conn.client.post(&url))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let rows: Vec<Value> = check(resp).await?.json().await?;
        let inserted = first_row(rows).ok_or_else(|| {
            RemoteError::UnexpectedResponse(format!("insert into {table} returned no rows"))
        })?;
        info!(table, "inserted row");
        Ok(inserted)
    }

    async fn patch_row(
        &self,
        table: &str,
        id: &str,
        patch: &Value,
    ) -> Result<Option<Value>, RemoteError> {
        let url = self.table_url(table);
        let resp = self
            .conn
            .authorize(self.conn.client.patch(&url))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let rows: Vec<Value> = check(resp).await?.json().await?;
        info!(table, id, matched = rows.len(), "updated row");
        Ok(first_row(rows))
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        Ok(self.get_rows(table, query).await?)
    }

    async fn select_one(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let query = Query::new().eq("id", id).limit(1);
        Ok(first_row(self.get_rows(table, &query).await?))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        if !row.is_object() {
            return Err(StoreError::NotAnObject(table.to_string()));
        }
        Ok(self.post_row(table, &row).await?)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        if !patch.is_object() {
            return Err(StoreError::NotAnObject(table.to_string()));
        }
        Ok(self.patch_row(table, id, &patch).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conn::test_connection;
    use serde_json::json;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn plain_select_params() {
        assert_eq!(pairs(&query_params(&Query::new())), vec![("select", "*")]);
    }

    #[test]
    fn filtered_ordered_select_params() {
        let query = Query::new()
            .eq("species", "dog")
            .eq("status", "available")
            .order_by("created_at", true)
            .limit(4);
        assert_eq!(
            pairs(&query_params(&query)),
            vec![
                ("select", "*"),
                ("species", "eq.dog"),
                ("status", "eq.available"),
                ("order", "created_at.desc"),
                ("limit", "4"),
            ]
        );
    }

    #[test]
    fn ascending_order() {
        let query = Query::new().order_by("name", false);
        assert!(pairs(&query_params(&query)).contains(&("order", "name.asc")));
    }

    #[test]
    fn table_url() {
        let backend = RestBackend::new(test_connection());
        assert_eq!(
            backend.table_url("animal_reports"),
            "http://localhost:54321/rest/v1/animal_reports"
        );
    }

    #[test]
    fn first_row_of_representation() {
        assert_eq!(first_row(vec![json!({"id": "1"})]), Some(json!({"id": "1"})));
        assert_eq!(first_row(vec![]), None);
    }

    #[tokio::test]
    async fn insert_rejects_non_object_before_io() {
        let backend = RestBackend::new(test_connection());
        let result = backend.insert("animals", json!("Thor")).await;
        assert!(matches!(result, Err(StoreError::NotAnObject(_))));
    }
}
