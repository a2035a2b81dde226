use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("expected a JSON object for {0}")]
    NotAnObject(String),

    #[error("object already exists: {0}")]
    ObjectExists(String),

    #[error("user already registered: {0}")]
    UserExists(String),

    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("session is not valid")]
    InvalidSession,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
