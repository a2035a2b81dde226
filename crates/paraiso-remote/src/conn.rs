//! Connection settings shared by the table, storage and auth clients.

use std::sync::{Arc, RwLock};

use crate::{RestAuth, RestBackend, RestStorage};

pub const DEFAULT_BUCKET: &str = "animal-photos";

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project URL like `https://xyz.example.co` (a trailing slash is trimmed).
    pub url: String,
    /// Public anon key, sent as `apikey` on every request.
    pub anon_key: String,
    /// Public bucket for uploaded photos.
    pub bucket: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }
}

/// HTTP client plus the bearer token of the current session, if any.
pub(crate) struct Connection {
    pub(crate) client: reqwest::Client,
    pub(crate) config: RemoteConfig,
    access_token: RwLock<Option<String>>,
}

impl Connection {
    fn new(config: RemoteConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            access_token: RwLock::new(None),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.url, path.trim_start_matches('/'))
    }

    pub(crate) fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    /// The session token when signed in, otherwise the anon key.
    pub(crate) fn bearer(&self) -> String {
        self.access_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    /// Attach `apikey` and `Authorization` headers.
    pub(crate) fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
    }
}

/// The three REST clients, sharing one connection and session token.
pub struct Remote {
    pub tables: Arc<RestBackend>,
    pub storage: Arc<RestStorage>,
    pub auth: Arc<RestAuth>,
}

impl Remote {
    pub fn connect(config: RemoteConfig) -> Self {
        let conn = Arc::new(Connection::new(config));
        Self {
            tables: Arc::new(RestBackend::new(conn.clone())),
            storage: Arc::new(RestStorage::new(conn.clone())),
            auth: Arc::new(RestAuth::new(conn)),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_connection() -> Arc<Connection> {
    Arc::new(Connection::new(RemoteConfig::new(
        "http://localhost:54321/",
        "anon-key",
    )))
}
