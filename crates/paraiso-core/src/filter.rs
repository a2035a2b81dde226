//! Catalog filter criteria.

use std::str::FromStr;

use crate::animal::{Animal, AnimalStatus, ParseEnumError, Sex, Species};

/// Filter state of the catalog screen. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub species: Option<Species>,
    pub sex: Option<Sex>,
    pub status: Option<AnimalStatus>,
    /// Matched against name and description after retrieval.
    pub search: String,
}

/// Parse a raw select value, treating `""` and the `"all"` sentinel as unset.
pub fn parse_filter<T>(raw: &str) -> Result<Option<T>, ParseEnumError>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    raw.parse().map(Some)
}

impl FilterCriteria {
    /// Build criteria from the raw strings a form would hold.
    pub fn from_raw(
        species: &str,
        sex: &str,
        status: &str,
        search: &str,
    ) -> Result<Self, ParseEnumError> {
        Ok(Self {
            species: parse_filter(species)?,
            sex: parse_filter(sex)?,
            status: parse_filter(status)?,
            search: search.to_string(),
        })
    }

    /// Equality predicates to push down to the store, as `(column, value)`.
    ///
    /// Only values that no other raw value normalizes into are pushed:
    /// `species = other` also covers unknown species, `status = available`
    /// covers a missing status and `status = pending` an unknown one. Those
    /// are left to [`matches`](Self::matches) on the normalized rows.
    pub fn predicates(&self) -> Vec<(&'static str, &'static str)> {
        let mut preds = Vec::with_capacity(3);
        if let Some(species) = self.species.filter(|s| *s != Species::Other) {
            preds.push(("species", species.as_str()));
        }
        if let Some(sex) = self.sex {
            preds.push(("sex", sex.as_str()));
        }
        if let Some(status) = self.status.filter(|s| *s == AnimalStatus::Adopted) {
            preds.push(("status", status.as_str()));
        }
        preds
    }

    /// The lowercased search term, or `None` when blank.
    pub fn search_term(&self) -> Option<String> {
        let term = self.search.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    /// Case-insensitive substring match on name OR description.
    pub fn matches_search(&self, animal: &Animal) -> bool {
        match self.search_term() {
            None => true,
            Some(term) => {
                animal.name.to_lowercase().contains(&term)
                    || animal.description.to_lowercase().contains(&term)
            }
        }
    }

    /// Full predicate: every set field must hold.
    pub fn matches(&self, animal: &Animal) -> bool {
        self.species.is_none_or(|s| animal.species == s)
            && self.sex.is_none_or(|s| animal.sex == Some(s))
            && self.status.is_none_or(|s| animal.status == s)
            && self.matches_search(animal)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
