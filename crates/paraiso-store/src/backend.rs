//! The three collaborator traits and the table query description.

use async_trait::async_trait;
use paraiso_core::{Credentials, Session, User};
use serde_json::Value;

use crate::StoreError;

/// Sort order for [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// Equality predicates, optional order and limit over one table.
///
/// Predicates are ANDed. Without an order, rows come back in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Row-level access to the hosted tables.
///
/// Rows are raw JSON objects; typed views are built by the callers.
#[async_trait]
pub trait Backend: Send + Sync {
    /// All rows of `table` matching `query`.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// The row whose `id` equals `id`, if any.
    async fn select_one(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert one row and return it as stored (with generated columns).
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Merge `patch` into the row with the given `id`. `None` when no row matched.
    async fn update(&self, table: &str, id: &str, patch: Value)
    -> Result<Option<Value>, StoreError>;
}

/// A public bucket of uploaded files.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Create the bucket if it does not exist. Returns `true` when created.
    async fn ensure_bucket(&self) -> Result<bool, StoreError>;

    /// Store `bytes` at `path`. Uploading over an existing path is an error.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<(), StoreError>;

    /// Stable public URL for `path`; does not check that the object exists.
    fn public_url(&self, path: &str) -> String;
}

/// Email/password authentication.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<User, StoreError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StoreError>;

    async fn sign_out(&self, session: &Session) -> Result<(), StoreError>;

    /// Called whenever the current session changes, including when one is
    /// restored from disk. Implementations that authorize table calls with the
    /// session token pick it up here.
    fn session_changed(&self, _session: Option<&Session>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder() {
        let q = Query::new()
            .eq("user_id", "u1")
            .order_by("created_at", true)
            .limit(4);
        assert_eq!(q.filters, vec![("user_id".to_string(), "u1".to_string())]);
        assert_eq!(
            q.order,
            Some(Order {
                column: "created_at".into(),
                descending: true
            })
        );
        assert_eq!(q.limit, Some(4));
    }
}
