//! In-memory implementations of the collaborator traits.
//!
//! Used by `--demo` and by tests. They mimic the hosted platform where it
//! matters to callers: generated `id`/`created_at` columns, string equality
//! filters, uploads refusing to overwrite, and distinct auth failures.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use paraiso_core::{Credentials, Session, User};
use serde_json::Value;
use tracing::debug;

use crate::{Authenticator, Backend, ObjectStorage, Query, StoreError};

const SAMPLE_ANIMALS: &str = include_str!("../fixtures/animals.json");

// ── Tables ──

/// Tables kept as ordered lists of JSON objects.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `animals` table holds the bundled sample catalog.
    pub fn with_sample_animals() -> Result<Self, StoreError> {
        let backend = Self::new();
        let rows: Vec<Value> = serde_json::from_str(SAMPLE_ANIMALS)?;
        backend.seed("animals", rows);
        Ok(backend)
    }

    /// Append rows as-is, without generating columns.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.lock().entry(table.to_string()).or_default().extend(rows);
    }

    /// Snapshot of a table, in store order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Value>>> {
        // A poisoned lock only means a test panicked mid-write; the data is still usable.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// String equality as the REST layer sees it: `eq.42` matches the number 42.
fn column_equals(row: &Value, column: &str, expected: &str) -> bool {
    match row.get(column) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == expected,
    }
}

fn compare_column(a: &Value, b: &Value, column: &str) -> Ordering {
    let key = |row: &Value| match row.get(column) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    key(a).cmp(&key(b))
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let tables = self.lock();
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query
                            .filters
                            .iter()
                            .all(|(col, val)| column_equals(row, col, val))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_column(a, b, &order.column);
                if order.descending { ord.reverse() } else { ord }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        debug!(table, count = rows.len(), "memory select");
        Ok(rows)
    }

    async fn select_one(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let tables = self.lock();
        Ok(tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| column_equals(row, "id", id)))
            .cloned())
    }

    async fn insert(&self, table: &str, mut row: Value) -> Result<Value, StoreError> {
        let obj = row
            .as_object_mut()
            .ok_or_else(|| StoreError::NotAnObject(table.to_string()))?;
        obj.entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        obj.entry("created_at")
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));

        self.lock()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        debug!(table, "memory insert");
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject(table.to_string()));
        };
        let mut tables = self.lock();
        let Some(row) = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| column_equals(row, "id", id)))
        else {
            return Ok(None);
        };
        if let Some(obj) = row.as_object_mut() {
            obj.extend(patch);
        }
        debug!(table, id, "memory update");
        Ok(Some(row.clone()))
    }
}

// ── Object storage ──

/// A single public bucket held in memory.
pub struct MemoryStorage {
    public_base: String,
    bucket_ready: Mutex<bool>,
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
}

impl MemoryStorage {
    /// `public_base` is the URL prefix for [`public_url`](ObjectStorage::public_url),
    /// without a trailing slash.
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into().trim_end_matches('/').to_string(),
            bucket_ready: Mutex::new(false),
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    /// Stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Content type and size of a stored object.
    pub fn object_info(&self, path: &str) -> Option<(String, usize)> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .map(|(bytes, content_type)| (content_type.clone(), bytes.len()))
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn ensure_bucket(&self) -> Result<bool, StoreError> {
        let mut ready = self.bucket_ready.lock().unwrap_or_else(|e| e.into_inner());
        let created = !*ready;
        *ready = true;
        Ok(created)
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        if objects.contains_key(path) {
            return Err(StoreError::ObjectExists(path.to_string()));
        }
        objects.insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base, path.trim_start_matches('/'))
    }
}

// ── Auth ──

struct Account {
    user: User,
    password: String,
}

/// Accounts and live sessions held in memory. Passwords are kept in clear;
/// this is a stand-in for the hosted auth service, not a credential store.
#[derive(Default)]
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    sessions: Mutex<HashMap<String, String>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions that have not been signed out.
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl Authenticator for MemoryAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<User, StoreError> {
        let key = email_key(&credentials.email);
        let mut accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        if accounts.contains_key(&key) {
            return Err(StoreError::UserExists(key));
        }
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: key.clone(),
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: credentials.password.clone(),
            },
        );
        Ok(user)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StoreError> {
        let accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        let account = accounts
            .get(&email_key(&credentials.email))
            .filter(|a| a.password == credentials.password)
            .ok_or(StoreError::InvalidCredentials)?;
        let session = Session {
            access_token: uuid::Uuid::new_v4().to_string(),
            user: account.user.clone(),
        };
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session.access_token.clone(), session.user.id.clone());
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&session.access_token)
            .map(|_| ())
            .ok_or(StoreError::InvalidSession)
    }
}
