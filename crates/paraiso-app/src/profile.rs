//! Profile page: the signed-in user's details and their submissions.

use std::sync::Arc;

use paraiso_core::records::{
    ADOPTION_REQUESTS, ANIMAL_REPORTS, ANIMALS, AdoptionSummary, PROFILES, ProfileRow,
    ReportSummary, VOLUNTEER_APPLICATIONS, VolunteerSummary,
};
use paraiso_core::{ProfileForm, User, normalize_animal};
use paraiso_store::{Backend, Query};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, warn};

use crate::AppError;
use crate::notify::{Notification, Notifier};
use crate::session::SessionContext;

#[derive(Debug, Clone, Default)]
pub struct ProfileOverview {
    pub profile: ProfileForm,
    /// Newest first, like the other lists.
    pub adoptions: Vec<AdoptionSummary>,
    pub reports: Vec<ReportSummary>,
    pub volunteering: Vec<VolunteerSummary>,
}

pub struct ProfileService {
    backend: Arc<dyn Backend>,
    session: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
}

impl ProfileService {
    pub fn new(
        backend: Arc<dyn Backend>,
        session: Arc<SessionContext>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backend,
            session,
            notifier,
        }
    }

    pub async fn load(&self) -> Result<ProfileOverview, AppError> {
        let user = self.session.require_user()?;
        match self.try_load(&user).await {
            Ok(overview) => Ok(overview),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to load profile");
                self.notifier.notify(Notification::error(
                    "Error",
                    "Could not load your profile.",
                ));
                Err(e)
            }
        }
    }

    async fn try_load(&self, user: &User) -> Result<ProfileOverview, AppError> {
        let row: ProfileRow = match self.backend.select_one(PROFILES, &user.id).await? {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(user_id = %user.id, error = %e, "malformed profile row");
                ProfileRow::default()
            }),
            None => ProfileRow::default(),
        };
        let profile = ProfileForm {
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            email: row
                .email
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| user.email.clone()),
        };

        let mut adoptions: Vec<AdoptionSummary> = self.own_rows(ADOPTION_REQUESTS, user).await?;
        for adoption in &mut adoptions {
            if let Some(row) = self.backend.select_one(ANIMALS, &adoption.animal_id).await? {
                let animal = normalize_animal(&row);
                adoption.animal_name = Some(animal.name);
                adoption.animal_species = Some(animal.species);
            }
        }
        let reports = self.own_rows(ANIMAL_REPORTS, user).await?;
        let volunteering = self.own_rows(VOLUNTEER_APPLICATIONS, user).await?;

        info!(
            user_id = %user.id,
            adoptions = adoptions.len(),
            reports = reports.len(),
            volunteering = volunteering.len(),
            "loaded profile"
        );
        Ok(ProfileOverview {
            profile,
            adoptions,
            reports,
            volunteering,
        })
    }

    /// Rows of `table` belonging to `user`, newest first. Rows that do not
    /// parse are logged and left out.
    async fn own_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        user: &User,
    ) -> Result<Vec<T>, AppError> {
        let query = Query::new()
            .eq("user_id", user.id.as_str())
            .order_by("created_at", true);
        let rows = self.backend.select(table, &query).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(table, error = %e, "skipping malformed row");
                    None
                }
            })
            .collect())
    }

    /// Save the profile. Creates the row on first save.
    pub async fn update(&self, form: &ProfileForm) -> Result<(), AppError> {
        let user = self.session.require_user()?;
        match self.try_update(&user, form).await {
            Ok(()) => {
                self.notifier.notify(Notification::info(
                    "Profile updated",
                    "Your details were saved.",
                ));
                Ok(())
            }
            Err(e) => {
                let notification = match &e {
                    AppError::Validation(v) => Notification::error("Check the form", v.to_string()),
                    other => Notification::blocking_error("Could not save the profile", other.to_string()),
                };
                self.notifier.notify(notification);
                Err(e)
            }
        }
    }

    async fn try_update(&self, user: &User, form: &ProfileForm) -> Result<(), AppError> {
        form.validate()?;
        let patch = json!({
            "first_name": form.first_name.trim(),
            "last_name": form.last_name.trim(),
            "phone": form.phone.trim(),
            "email": form.email.trim(),
        });
        if self
            .backend
            .update(PROFILES, &user.id, patch.clone())
            .await?
            .is_none()
        {
            let mut row = patch;
            row["id"] = json!(user.id.as_str());
            self.backend.insert(PROFILES, row).await?;
        }
        info!(user_id = %user.id, "profile saved");
        Ok(())
    }
}
