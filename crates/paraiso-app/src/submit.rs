//! Submission flows: adoption interest, stray reports and volunteer applications.
//!
//! Each flow validates the form, writes one record and notifies. A form is
//! cleared only on success; on failure it is left as typed so the user can
//! try again.

use std::sync::Arc;

use paraiso_core::records::{
    ADOPTION_REQUESTS, ANIMAL_REPORTS, ANIMALS, AdoptionRequestRecord, AnimalReportRecord,
    VOLUNTEER_APPLICATIONS, VolunteerApplicationRecord,
};
use paraiso_core::{AdoptionForm, AnimalStatus, ReportForm, VolunteerForm, normalize_animal};
use paraiso_store::{Backend, ObjectStorage, StoreError};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::AppError;
use crate::notify::{Notification, Notifier};
use crate::session::SessionContext;
use crate::uploads::{PhotoUpload, upload_photos};

/// Storage folder for stray report photos.
const REPORTS_FOLDER: &str = "reports";

/// What a stray report submission produced.
#[derive(Debug, Clone)]
pub struct ReportReceipt {
    /// The inserted `animal_reports` row.
    pub row: Value,
    pub uploaded: Vec<String>,
    pub failed: Vec<String>,
}

pub struct Submissions {
    backend: Arc<dyn Backend>,
    storage: Arc<dyn ObjectStorage>,
    session: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
}

fn to_row<T: serde::Serialize>(record: &T) -> Result<Value, AppError> {
    serde_json::to_value(record).map_err(|e| AppError::Store(StoreError::Json(e)))
}

impl Submissions {
    pub fn new(
        backend: Arc<dyn Backend>,
        storage: Arc<dyn ObjectStorage>,
        session: Arc<SessionContext>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backend,
            storage,
            session,
            notifier,
        }
    }

    fn user_id(&self) -> Option<String> {
        self.session.current_user().map(|u| u.id)
    }

    /// Tell the user what went wrong. Form mistakes are a toast; anything
    /// that stopped the submission itself must be acknowledged.
    fn fail(&self, title: &str, err: AppError) -> AppError {
        let notification = match &err {
            AppError::Validation(v) => Notification::error(title, v.to_string()),
            other => {
                warn!(error = %other, "{title}");
                Notification::blocking_error(title, other.to_string())
            }
        };
        self.notifier.notify(notification);
        err
    }

    // ── Adoption ──

    /// Register interest in adopting `animal_id`. The animal must exist and be
    /// available; once the request is recorded the animal moves to pending.
    pub async fn submit_adoption(
        &self,
        animal_id: &str,
        form: &mut AdoptionForm,
    ) -> Result<Value, AppError> {
        const TITLE: &str = "Could not send the adoption request";
        match self.adopt(animal_id, form).await {
            Ok((row, name)) => {
                self.notifier.notify(Notification::info(
                    "Request sent",
                    format!("We received your interest in {name}. The shelter will contact you."),
                ));
                *form = AdoptionForm::default();
                Ok(row)
            }
            Err(e) => Err(self.fail(TITLE, e)),
        }
    }

    async fn adopt(&self, animal_id: &str, form: &AdoptionForm) -> Result<(Value, String), AppError> {
        form.validate()?;
        let animal = self
            .backend
            .select_one(ANIMALS, animal_id)
            .await?
            .map(|row| normalize_animal(&row))
            .ok_or_else(|| AppError::AnimalNotFound(animal_id.to_string()))?;
        if !animal.is_adoptable() {
            return Err(AppError::NotAvailable {
                name: animal.name,
                status: animal.status,
            });
        }

        let record = AdoptionRequestRecord::new(&animal.id, form, self.user_id());
        let row = self
            .backend
            .insert(ADOPTION_REQUESTS, to_row(&record)?)
            .await?;
        info!(animal_id = %animal.id, "adoption request recorded");

        // The request is already stored; a failed status flip is not a submission failure.
        let patch = json!({ "status": AnimalStatus::Pending.as_str() });
        match self.backend.update(ANIMALS, &animal.id, patch).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(animal_id = %animal.id, "animal vanished before status update"),
            Err(e) => warn!(animal_id = %animal.id, error = %e, "could not mark animal pending"),
        }
        Ok((row, animal.name))
    }

    // ── Stray report ──

    /// Report a stray. Photos are uploaded first, one by one, into a fresh
    /// `reports/<uuid>` folder; the record keeps the URLs that succeeded.
    pub async fn submit_report(
        &self,
        form: &mut ReportForm,
        photos: Vec<PhotoUpload>,
    ) -> Result<ReportReceipt, AppError> {
        const TITLE: &str = "Could not send the report";
        match self.report(form, photos).await {
            Ok(receipt) => {
                if !receipt.failed.is_empty() {
                    self.notifier.notify(Notification::error(
                        "Some photos were not uploaded",
                        receipt.failed.join(", "),
                    ));
                }
                self.notifier.notify(Notification::info(
                    "Report sent",
                    "Thank you. Our team will review it soon.",
                ));
                *form = ReportForm::default();
                Ok(receipt)
            }
            Err(e) => Err(self.fail(TITLE, e)),
        }
    }

    async fn report(
        &self,
        form: &ReportForm,
        photos: Vec<PhotoUpload>,
    ) -> Result<ReportReceipt, AppError> {
        form.validate()?;
        let folder = format!("{REPORTS_FOLDER}/{}", uuid::Uuid::new_v4());
        let outcome = upload_photos(self.storage.as_ref(), &folder, photos).await;

        let record = AnimalReportRecord::new(form, outcome.urls.clone(), self.user_id());
        let row = self
            .backend
            .insert(ANIMAL_REPORTS, to_row(&record)?)
            .await?;
        info!(
            photos = outcome.urls.len(),
            failed = outcome.failed.len(),
            "animal report recorded"
        );
        Ok(ReportReceipt {
            row,
            uploaded: outcome.urls,
            failed: outcome.failed,
        })
    }

    // ── Volunteer ──

    pub async fn submit_volunteer(&self, form: &mut VolunteerForm) -> Result<Value, AppError> {
        const TITLE: &str = "Could not send the application";
        match self.volunteer(form).await {
            Ok(row) => {
                self.notifier.notify(Notification::info(
                    "Application sent",
                    "We will get in touch about the next steps.",
                ));
                *form = VolunteerForm::default();
                Ok(row)
            }
            Err(e) => Err(self.fail(TITLE, e)),
        }
    }

    async fn volunteer(&self, form: &VolunteerForm) -> Result<Value, AppError> {
        form.validate()?;
        let record = VolunteerApplicationRecord::new(form, self.user_id());
        let row = self
            .backend
            .insert(VOLUNTEER_APPLICATIONS, to_row(&record)?)
            .await?;
        info!("volunteer application recorded");
        Ok(row)
    }
}
