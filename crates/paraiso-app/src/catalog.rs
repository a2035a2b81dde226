//! Animal Query Service: filtered retrieval from the `animals` table.
//!
//! Equality filters run in the store where the raw value is exact; every
//! filter is then checked again here, on the normalized rows, together with
//! the free-text search. Retrieval faults never reach the caller: they become an
//! error notification and an empty result.

use std::sync::Arc;

use paraiso_core::records::ANIMALS;
use paraiso_core::{Animal, FilterCriteria, normalize_animal};
use paraiso_store::{Backend, Query, StoreError};
use tracing::{info, warn};

use crate::notify::{Notification, Notifier};

/// How many animals the landing page features.
pub const FEATURED_LIMIT: usize = 4;

const LOAD_FAILED_TITLE: &str = "Error";
const LOAD_FAILED: &str = "Could not load the animals.";

#[derive(Clone)]
pub struct AnimalQueryService {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
}

impl AnimalQueryService {
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>) -> Self {
        Self { backend, notifier }
    }

    /// Animals matching `criteria`, in store order.
    ///
    /// An empty result means either "no matches" or "fetch failed"; only the
    /// notification side channel tells them apart.
    pub async fn fetch_animals(&self, criteria: &FilterCriteria) -> Vec<Animal> {
        match self.try_fetch_animals(criteria).await {
            Ok(animals) => animals,
            Err(e) => {
                self.report_fault(&e);
                Vec::new()
            }
        }
    }

    /// Same as [`fetch_animals`](Self::fetch_animals) but hands the fault back.
    pub async fn try_fetch_animals(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Animal>, StoreError> {
        let query = criteria
            .predicates()
            .into_iter()
            .fold(Query::new(), |q, (column, value)| q.eq(column, value));
        let rows = self.backend.select(ANIMALS, &query).await?;
        let fetched = rows.len();

        let animals: Vec<Animal> = rows
            .iter()
            .map(normalize_animal)
            .filter(|animal| criteria.matches(animal))
            .collect();
        info!(fetched, matched = animals.len(), "loaded animals");
        Ok(animals)
    }

    /// A single animal by id. Not-found is `None` without a notification
    /// (the caller goes back to the catalog); a fault is `None` with one.
    pub async fn get_animal(&self, id: &str) -> Option<Animal> {
        match self.backend.select_one(ANIMALS, id).await {
            Ok(row) => row.as_ref().map(normalize_animal),
            Err(e) => {
                self.report_fault(&e);
                None
            }
        }
    }

    /// The first `limit` available animals, for the landing page.
    ///
    /// Availability is decided on the normalized row, so a row without a
    /// status counts as available here just as it does in the catalog.
    pub async fn featured_animals(&self, limit: usize) -> Vec<Animal> {
        match self.backend.select(ANIMALS, &Query::new()).await {
            Ok(rows) => rows
                .iter()
                .map(normalize_animal)
                .filter(Animal::is_adoptable)
                .take(limit)
                .collect(),
            Err(e) => {
                self.report_fault(&e);
                Vec::new()
            }
        }
    }

    fn report_fault(&self, err: &StoreError) {
        warn!(error = %err, "failed to load animals");
        self.notifier
            .notify(Notification::error(LOAD_FAILED_TITLE, LOAD_FAILED));
    }
}
