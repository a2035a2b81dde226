//! Submission forms and their client-side validation.
//!
//! Forms hold exactly what the user typed. They are validated before any
//! backend call and cleared only after a successful submission.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animal::{Sex, Size, Species};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("you must agree to the volunteer terms to continue")]
    TermsNotAccepted,
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Loose shape check: `local@domain.tld`, no whitespace.
pub(crate) fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let invalid = || ValidationError::InvalidEmail(email.to_string());
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

// ── Adoption ──

/// Adoption interest for one animal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdoptionForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Optional free text about the adopter's home.
    pub message: String,
}

impl AdoptionForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("phone", &self.phone)?;
        validate_email(&self.email)
    }
}

// ── Stray report ──

/// Whether the reporter can shelter the animal until rescue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepOption {
    Yes,
    #[default]
    No,
    Maybe,
}

impl std::str::FromStr for KeepOption {
    type Err = crate::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(KeepOption::Yes),
            "no" => Ok(KeepOption::No),
            "maybe" => Ok(KeepOption::Maybe),
            _ => Err(crate::ParseEnumError {
                kind: "keep option",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    pub animal_name: String,
    pub species: Option<Species>,
    /// `None` is submitted as `unknown`.
    pub sex: Option<Sex>,
    pub age: String,
    pub size: Option<Size>,
    pub location: String,
    pub description: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub can_keep_temporarily: KeepOption,
}

impl ReportForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.species.is_none() {
            return Err(ValidationError::MissingField("species"));
        }
        require("location", &self.location)?;
        require("description", &self.description)?;
        require("contact name", &self.contact_name)?;
        require("contact phone", &self.contact_phone)?;
        require("contact email", &self.contact_email)?;
        validate_email(&self.contact_email)
    }
}

// ── Volunteer ──

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolunteerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub availability: String,
    pub experience: String,
    pub reason: String,
    pub agree_terms: bool,
}

impl VolunteerForm {
    /// Terms are checked first: without them nothing else matters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.agree_terms {
            return Err(ValidationError::TermsNotAccepted);
        }
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("phone", &self.phone)?;
        require("availability", &self.availability)?;
        require("reason", &self.reason)?;
        validate_email(&self.email)
    }
}

// ── Profile ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl ProfileForm {
    /// Every field is optional; an email, when given, must look like one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Ok(());
        }
        validate_email(&self.email)
    }
}
