//! Catalog State Controller.
//!
//! Owns the filter, result and loading state of one catalog screen. Every
//! trigger issues a [`FetchTicket`] tagged with a monotonically increasing
//! sequence number; only the response to the latest ticket is applied, so a
//! slow, superseded request can never overwrite newer results.
//!
//! Triggers:
//! - species or sex change: fetch immediately (when the value changed)
//! - status or search change: wait for an explicit [`search`](CatalogController::search)
//! - [`reset`](CatalogController::reset): clear everything, fetch once

use paraiso_core::{Animal, AnimalStatus, FilterCriteria, Sex, Species};
use tracing::debug;

use crate::catalog::AnimalQueryService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Species(Option<Species>),
    Sex(Option<Sex>),
    Status(Option<AnimalStatus>),
    Search(String),
}

/// A request the controller has issued and is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    /// Filter snapshot at the time of the trigger.
    pub criteria: FilterCriteria,
}

pub struct CatalogController {
    service: AnimalQueryService,
    filters: FilterCriteria,
    animals: Vec<Animal>,
    phase: Phase,
    latest: u64,
}

impl CatalogController {
    pub fn new(service: AnimalQueryService) -> Self {
        Self {
            service,
            filters: FilterCriteria::default(),
            animals: Vec::new(),
            phase: Phase::Idle,
            latest: 0,
        }
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn service(&self) -> &AnimalQueryService {
        &self.service
    }

    /// Initial load when the screen opens.
    pub fn mount(&mut self) -> FetchTicket {
        self.issue()
    }

    /// Apply a filter edit. Returns a ticket when the edit triggers a fetch.
    pub fn change(&mut self, change: FilterChange) -> Option<FetchTicket> {
        match change {
            FilterChange::Species(species) => {
                if self.filters.species == species {
                    return None;
                }
                self.filters.species = species;
                Some(self.issue())
            }
            FilterChange::Sex(sex) => {
                if self.filters.sex == sex {
                    return None;
                }
                self.filters.sex = sex;
                Some(self.issue())
            }
            FilterChange::Status(status) => {
                self.filters.status = status;
                None
            }
            FilterChange::Search(search) => {
                self.filters.search = search;
                None
            }
        }
    }

    /// The explicit search action (button or Enter).
    pub fn search(&mut self) -> FetchTicket {
        self.issue()
    }

    /// Clear every filter and fetch with the cleared criteria.
    pub fn reset(&mut self) -> FetchTicket {
        self.filters = FilterCriteria::default();
        self.issue()
    }

    fn issue(&mut self) -> FetchTicket {
        self.latest += 1;
        self.phase = Phase::Loading;
        FetchTicket {
            seq: self.latest,
            criteria: self.filters.clone(),
        }
    }

    /// Deliver the response to `ticket`. Returns `false` (and changes nothing)
    /// when a newer ticket has been issued since.
    pub fn complete(&mut self, ticket: &FetchTicket, animals: Vec<Animal>) -> bool {
        if ticket.seq != self.latest {
            debug!(
                seq = ticket.seq,
                latest = self.latest,
                "discarding superseded catalog response"
            );
            return false;
        }
        self.animals = animals;
        self.phase = Phase::Loaded;
        true
    }

    /// Fetch for `ticket` and deliver the result.
    pub async fn run(&mut self, ticket: FetchTicket) -> bool {
        let animals = self.service.fetch_animals(&ticket.criteria).await;
        self.complete(&ticket, animals)
    }

    /// Convenience for one-shot callers: apply `change` and, if it triggers, run the fetch.
    pub async fn apply(&mut self, change: FilterChange) -> bool {
        match self.change(change) {
            Some(ticket) => self.run(ticket).await,
            None => false,
        }
    }
}
