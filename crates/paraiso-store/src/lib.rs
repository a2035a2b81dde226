//! Backend collaborator contract: tables, object storage and auth, plus an in-memory implementation.

mod backend;
mod error;
mod memory;

pub use backend::{Authenticator, Backend, ObjectStorage, Order, Query};
pub use error::StoreError;
pub use memory::{MemoryAuth, MemoryBackend, MemoryStorage};
