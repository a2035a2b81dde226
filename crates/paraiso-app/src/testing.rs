//! Test doubles shared by the unit tests of this crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use paraiso_store::{
    Backend, MemoryAuth, MemoryBackend, MemoryStorage, ObjectStorage, Query, StoreError,
};
use serde_json::Value;

use crate::App;
use crate::notify::RecordingNotifier;

/// Every call fails as if the network were down.
pub struct DownBackend;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".into())
}

#[async_trait]
impl Backend for DownBackend {
    async fn select(&self, _: &str, _: &Query) -> Result<Vec<Value>, StoreError> {
        Err(down())
    }
    async fn select_one(&self, _: &str, _: &str) -> Result<Option<Value>, StoreError> {
        Err(down())
    }
    async fn insert(&self, _: &str, _: Value) -> Result<Value, StoreError> {
        Err(down())
    }
    async fn update(&self, _: &str, _: &str, _: Value) -> Result<Option<Value>, StoreError> {
        Err(down())
    }
}

/// Counts `select` calls and forwards everything to an inner backend.
pub struct CountingBackend {
    pub inner: MemoryBackend,
    pub selects: AtomicUsize,
}

impl CountingBackend {
    pub fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            selects: AtomicUsize::new(0),
        }
    }

    pub fn selects(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for CountingBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.inner.select(table, query).await
    }
    async fn select_one(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.inner.select_one(table, id).await
    }
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        self.inner.insert(table, row).await
    }
    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        self.inner.update(table, id, patch).await
    }
}

/// Rejects uploads whose path contains `reject`; stores the rest.
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    pub reject: String,
}

#[async_trait]
impl ObjectStorage for FlakyStorage {
    async fn ensure_bucket(&self) -> Result<bool, StoreError> {
        self.inner.ensure_bucket().await
    }
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        if path.contains(&self.reject) {
            return Err(StoreError::Backend {
                status: 413,
                body: "payload too large".into(),
            });
        }
        self.inner.upload(path, bytes, content_type).await
    }
    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }
}

pub const PUBLIC_BASE: &str = "https://cdn.test/animal-photos";

pub struct Harness {
    pub app: App,
    pub backend: Arc<MemoryBackend>,
    pub storage: Arc<MemoryStorage>,
    pub auth: Arc<MemoryAuth>,
    pub notes: Arc<RecordingNotifier>,
}

/// An app over the in-memory store seeded with the sample animals.
pub fn harness() -> Harness {
    let backend = Arc::new(MemoryBackend::with_sample_animals().unwrap());
    let storage = Arc::new(MemoryStorage::new(PUBLIC_BASE));
    let auth = Arc::new(MemoryAuth::new());
    let notes = Arc::new(RecordingNotifier::new());
    let app = App::new(
        backend.clone(),
        storage.clone(),
        auth.clone(),
        notes.clone(),
    );
    Harness {
        app,
        backend,
        storage,
        auth,
        notes,
    }
}

/// An app whose tables are unreachable.
pub fn down_harness() -> (App, Arc<RecordingNotifier>) {
    let notes = Arc::new(RecordingNotifier::new());
    let app = App::new(
        Arc::new(DownBackend),
        Arc::new(MemoryStorage::new(PUBLIC_BASE)),
        Arc::new(MemoryAuth::new()),
        notes.clone(),
    );
    (app, notes)
}
