//! The `Animal` entity and its enumerated columns.
//!
//! Animals are owned by the backend: this system reads them and flips
//! `status` from `available` to `pending`, nothing else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Horse,
    Other,
}

impl Species {
    pub const ALL: [Species; 4] = [Species::Dog, Species::Cat, Species::Horse, Species::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Horse => "horse",
            Species::Other => "other",
        }
    }
}

impl FromStr for Species {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" => Ok(Species::Dog),
            "cat" => Ok(Species::Cat),
            "horse" => Ok(Species::Horse),
            "other" => Ok(Species::Other),
            _ => Err(ParseEnumError::new("species", s)),
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sex of a catalogued animal.
///
/// Stray reports may also say `unknown`; that value never reaches an
/// [`Animal`] (it normalizes to `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => Err(ParseEnumError::new("sex", s)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }
}

impl FromStr for Size {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Size::Small),
            "medium" => Ok(Size::Medium),
            "large" => Ok(Size::Large),
            _ => Err(ParseEnumError::new("size", s)),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adoption state of an animal.
///
/// `Available → Pending` happens here on adoption interest;
/// `Pending → Adopted` is administrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimalStatus {
    Available,
    Pending,
    Adopted,
}

impl AnimalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Available => "available",
            AnimalStatus::Pending => "pending",
            AnimalStatus::Adopted => "adopted",
        }
    }

    /// Human-readable badge text.
    pub fn label(&self) -> &'static str {
        match self {
            AnimalStatus::Available => "Available",
            AnimalStatus::Pending => "In process",
            AnimalStatus::Adopted => "Adopted",
        }
    }
}

impl FromStr for AnimalStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(AnimalStatus::Available),
            "pending" => Ok(AnimalStatus::Pending),
            "adopted" => Ok(AnimalStatus::Adopted),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalogued rescue animal, as seen by the presentation layer.
///
/// Build it from a raw row with [`normalize_animal`](crate::normalize_animal);
/// never deserialize rows straight into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: String,
    pub name: String,
    pub species: Species,
    /// `None` when the stored value is `unknown` or unrecognised.
    pub sex: Option<Sex>,
    /// Free text, e.g. "2 years".
    pub age: String,
    pub size: Option<Size>,
    pub description: String,
    /// Absolute URLs, in display order. May be empty.
    pub photos: Vec<String>,
    pub location: String,
    pub status: AnimalStatus,
    /// ISO 8601 timestamp string, as stored.
    pub created_at: Option<String>,
}

impl Animal {
    /// Whether the animal can still receive adoption requests.
    pub fn is_adoptable(&self) -> bool {
        self.status == AnimalStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_parse_is_case_insensitive() {
        assert_eq!("Dog".parse::<Species>().unwrap(), Species::Dog);
        assert_eq!(" horse ".parse::<Species>().unwrap(), Species::Horse);
    }

    #[test]
    fn unknown_sex_is_rejected() {
        let err = "unknown".parse::<Sex>().unwrap_err();
        assert_eq!(err.kind, "sex");
        assert_eq!(err.to_string(), "invalid sex: \"unknown\"");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&AnimalStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }

    #[test]
    fn status_labels() {
        assert_eq!(AnimalStatus::Available.label(), "Available");
        assert_eq!(AnimalStatus::Pending.label(), "In process");
        assert_eq!(AnimalStatus::Adopted.label(), "Adopted");
    }

    #[test]
    fn display_matches_stored_form() {
        for species in Species::ALL {
            assert_eq!(species.to_string().parse::<Species>().unwrap(), species);
        }
        assert_eq!(Size::Large.to_string(), "large");
    }
}
