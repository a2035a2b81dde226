//! Application layer: catalog query and state, submissions, session and profile.
//!
//! [`App`] is built once at start-up from the three backend collaborators and
//! a [`Notifier`]; every screen-level service is handed out from it.

pub mod catalog;
pub mod controller;
mod error;
pub mod notify;
pub mod profile;
pub mod session;
pub mod submit;
pub mod uploads;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use paraiso_store::{Authenticator, Backend, ObjectStorage};

pub use catalog::AnimalQueryService;
pub use controller::{CatalogController, FetchTicket, FilterChange, Phase};
pub use error::AppError;
pub use notify::{Notification, Notifier, RecordingNotifier, Severity};
pub use profile::{ProfileOverview, ProfileService};
pub use session::SessionContext;
pub use submit::{ReportReceipt, Submissions};
pub use uploads::PhotoUpload;

pub struct App {
    backend: Arc<dyn Backend>,
    storage: Arc<dyn ObjectStorage>,
    notifier: Arc<dyn Notifier>,
    session: Arc<SessionContext>,
}

impl App {
    pub fn new(
        backend: Arc<dyn Backend>,
        storage: Arc<dyn ObjectStorage>,
        auth: Arc<dyn Authenticator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = Arc::new(SessionContext::new(auth, notifier.clone()));
        Self {
            backend,
            storage,
            notifier,
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn catalog(&self) -> AnimalQueryService {
        AnimalQueryService::new(self.backend.clone(), self.notifier.clone())
    }

    /// A fresh catalog screen: all filters unset, nothing loaded.
    pub fn controller(&self) -> CatalogController {
        CatalogController::new(self.catalog())
    }

    pub fn submissions(&self) -> Submissions {
        Submissions::new(
            self.backend.clone(),
            self.storage.clone(),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    pub fn profile(&self) -> ProfileService {
        ProfileService::new(
            self.backend.clone(),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    /// Make sure the public photo bucket exists. Returns `true` when it was created.
    pub async fn setup_storage(&self) -> Result<bool, AppError> {
        Ok(self.storage.ensure_bucket().await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::harness;

    #[tokio::test]
    async fn setup_storage_creates_bucket_once() {
        let h = harness();
        assert!(h.app.setup_storage().await.unwrap());
        assert!(!h.app.setup_storage().await.unwrap());
    }
}
