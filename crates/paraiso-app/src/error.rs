use paraiso_core::{AnimalStatus, ValidationError};
use paraiso_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("animal not found: {0}")]
    AnimalNotFound(String),

    #[error("{name} is not available for adoption ({status})")]
    NotAvailable { name: String, status: AnimalStatus },

    #[error("you need to sign in first")]
    NotAuthenticated,
}
