//! Rows written to and read back from the submission tables.

use serde::{Deserialize, Serialize};

use crate::animal::{Size, Species};
use crate::forms::{AdoptionForm, KeepOption, ReportForm, VolunteerForm};

pub const ANIMALS: &str = "animals";
pub const ADOPTION_REQUESTS: &str = "adoption_requests";
pub const ANIMAL_REPORTS: &str = "animal_reports";
pub const VOLUNTEER_APPLICATIONS: &str = "volunteer_applications";
pub const PROFILES: &str = "profiles";

/// Status every submission starts in.
pub const INITIAL_STATUS: &str = "pending";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionRequestRecord {
    pub animal_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AdoptionRequestRecord {
    pub fn new(animal_id: &str, form: &AdoptionForm, user_id: Option<String>) -> Self {
        Self {
            animal_id: animal_id.to_string(),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            message: form.message.clone(),
            status: INITIAL_STATUS.to_string(),
            user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalReportRecord {
    pub animal_name: Option<String>,
    pub species: Species,
    /// `male`, `female` or `unknown`.
    pub sex: String,
    pub age: String,
    pub size: Option<Size>,
    pub location: String,
    pub description: String,
    pub can_keep_temporarily: KeepOption,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    /// Public URLs of the photos that uploaded successfully.
    pub photos: Vec<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AnimalReportRecord {
    /// Callers validate the form first; a missing species falls back to `other`.
    pub fn new(form: &ReportForm, photos: Vec<String>, user_id: Option<String>) -> Self {
        let animal_name = form.animal_name.trim();
        Self {
            animal_name: (!animal_name.is_empty()).then(|| animal_name.to_string()),
            species: form.species.unwrap_or(Species::Other),
            sex: form
                .sex
                .map(|s| s.as_str())
                .unwrap_or("unknown")
                .to_string(),
            age: form.age.trim().to_string(),
            size: form.size,
            location: form.location.trim().to_string(),
            description: form.description.clone(),
            can_keep_temporarily: form.can_keep_temporarily,
            contact_name: form.contact_name.trim().to_string(),
            contact_phone: form.contact_phone.trim().to_string(),
            contact_email: form.contact_email.trim().to_string(),
            photos,
            status: INITIAL_STATUS.to_string(),
            user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerApplicationRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub availability: String,
    pub experience: String,
    pub reason: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl VolunteerApplicationRecord {
    pub fn new(form: &VolunteerForm, user_id: Option<String>) -> Self {
        Self {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            age: form.age.trim().to_string(),
            availability: form.availability.trim().to_string(),
            experience: form.experience.clone(),
            reason: form.reason.clone(),
            status: INITIAL_STATUS.to_string(),
            user_id,
        }
    }
}

// ── Profile views ──

/// Review state of a submission as shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl From<String> for ApplicationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => ApplicationStatus::Pending,
            "approved" => ApplicationStatus::Approved,
            "rejected" => ApplicationStatus::Rejected,
            _ => ApplicationStatus::Other(s),
        }
    }
}

impl ApplicationStatus {
    pub fn label(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "Under review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Other(s) => s,
        }
    }
}

/// A `profiles` row. Every column is nullable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdoptionSummary {
    pub id: String,
    pub animal_id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Filled in from the `animals` table after retrieval.
    #[serde(skip)]
    pub animal_name: Option<String>,
    #[serde(skip)]
    pub animal_species: Option<Species>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSummary {
    pub id: String,
    #[serde(default)]
    pub animal_name: Option<String>,
    pub species: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolunteerSummary {
    pub id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}
