//! Photo uploads into the public bucket over `/storage/v1`.

use std::sync::Arc;

use async_trait::async_trait;
use paraiso_store::{ObjectStorage, StoreError};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::RemoteError;
use crate::conn::Connection;
use crate::error::check;

pub struct RestStorage {
    conn: Arc<Connection>,
}

#[derive(Deserialize)]
struct BucketInfo {
    name: String,
}

impl RestStorage {
    pub(crate) fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }

    fn bucket(&self) -> &str {
        &self.conn.config.bucket
    }

    fn object_url(&self, path: &str) -> String {
        self.conn.endpoint(&format!(
            "storage/v1/object/{}/{}",
            self.bucket(),
            path.trim_start_matches('/')
        ))
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, RemoteError> {
        let url = self.conn.endpoint("storage/v1/bucket");
        let resp = self
            .conn
            .authorize(self.conn.client.get(&url))
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn create_bucket(&self) -> Result<(), RemoteError> {
        let url = self.conn.endpoint("storage/v1/bucket");
        let body = json!({ "id": self.bucket(), "name": self.bucket(), "public": true });
        let resp = self
            .conn
            .authorize(self.conn.client.post(&url))
            .json(&body)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

/// The storage API reports a duplicate path either as HTTP 409 or as a 400
/// whose body carries `"statusCode":"409"`.
fn is_duplicate(status: u16, body: &str) -> bool {
    status == 409 || (status == 400 && body.contains("\"409\""))
}

#[async_trait]
impl ObjectStorage for RestStorage {
    async fn ensure_bucket(&self) -> Result<bool, StoreError> {
        let buckets = self.list_buckets().await?;
        if buckets.iter().any(|b| b.name == self.bucket()) {
            return Ok(false);
        }
        self.create_bucket().await?;
        info!(bucket = %self.bucket(), "created public bucket");
        Ok(true)
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let url = self.object_url(path);
        let size = bytes.len();
        let resp = self
            .conn
            .authorize(self.conn.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(RemoteError::from)?;
        match check(resp).await {
            Ok(_) => {
                info!(path, size, "uploaded object");
                Ok(())
            }
            Err(RemoteError::Server { status, body }) if is_duplicate(status, &body) => {
                Err(StoreError::ObjectExists(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        self.conn.endpoint(&format!(
            "storage/v1/object/public/{}/{}",
            self.bucket(),
            path.trim_start_matches('/')
        ))
    }
}
