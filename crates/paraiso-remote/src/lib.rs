//! REST implementations of the `paraiso-store` traits for the hosted backend.

mod auth;
mod conn;
mod error;
mod storage;
mod tables;

pub use auth::RestAuth;
pub use conn::{DEFAULT_BUCKET, Remote, RemoteConfig};
pub use error::RemoteError;
pub use storage::RestStorage;
pub use tables::RestBackend;
