//! Airports, airlines and gates loaded once per view mount.
//!
//! The three lists are fetched concurrently and independently: a failure in one leaves the
//! other two untouched and the failed list reads as empty. Nothing here refreshes on its own;
//! call [`ReferenceData::load`] again to reload.

use std::collections::HashMap;
use tracing::{info, warn};

use crate::airlines::{Airline, AirlineId};
use crate::airports::{Airport, AirportId};
use crate::api_client::FlightApi;
use crate::error::ApiError;
use crate::gates::{Gate, GateId};

/// Load state of one reference list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState<T> {
    Loading,
    Loaded(Vec<T>),
    Failed(ApiError),
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        ListState::Loading
    }
}

impl<T> ListState<T> {
    /// Records when loaded; empty while loading or after a failure
    pub fn items(&self) -> &[T] {
        match self {
            ListState::Loaded(items) => items,
            ListState::Loading | ListState::Failed(_) => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ListState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<T> From<Result<Vec<T>, ApiError>> for ListState<T> {
    fn from(result: Result<Vec<T>, ApiError>) -> Self {
        match result {
            Ok(items) => ListState::Loaded(items),
            Err(e) => ListState::Failed(e),
        }
    }
}

/// One entry of a selection input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption<V> {
    pub value: V,
    pub label: String,
}

/// Immutable snapshot of the three reference lists plus id → label lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub airports: ListState<Airport>,
    pub airlines: ListState<Airline>,
    pub gates: ListState<Gate>,
    airport_labels: HashMap<AirportId, String>,
    airline_labels: HashMap<AirlineId, String>,
    gate_labels: HashMap<GateId, String>,
}

impl ReferenceData {
    /// All three lists still loading
    pub fn loading() -> Self {
        Self::default()
    }

    /// Build from already-resolved results (labels are derived here)
    pub fn from_results(
        airports: Result<Vec<Airport>, ApiError>,
        airlines: Result<Vec<Airline>, ApiError>,
        gates: Result<Vec<Gate>, ApiError>,
    ) -> Self {
        let airports = ListState::from(airports);
        let airlines = ListState::from(airlines);
        let gates = ListState::from(gates);

        let airport_labels = airports.items().iter().map(|a| (a.id, a.label())).collect();
        let airline_labels = airlines.items().iter().map(|a| (a.id, a.label())).collect();
        let gate_labels = gates.items().iter().map(|g| (g.id, g.label())).collect();

        Self {
            airports,
            airlines,
            gates,
            airport_labels,
            airline_labels,
            gate_labels,
        }
    }

    /// Fetch airports, airlines and gates concurrently. Never fails as a whole; each list
    /// carries its own outcome.
    pub async fn load(api: &dyn FlightApi) -> Self {
        let (airports, airlines, gates) =
            tokio::join!(api.list_airports(), api.list_airlines(), api.list_gates());

        for (name, error) in [
            ("airports", airports.as_ref().err()),
            ("airlines", airlines.as_ref().err()),
            ("gates", gates.as_ref().err()),
        ] {
            if let Some(e) = error {
                warn!("Failed to load {}, showing an empty list: {}", name, e);
            }
        }

        let data = Self::from_results(airports, airlines, gates);
        info!(
            "Reference data loaded: {} airports, {} airlines, {} gates",
            data.airports.items().len(),
            data.airlines.items().len(),
            data.gates.items().len()
        );
        data
    }

    pub fn airport(&self, id: AirportId) -> Option<&Airport> {
        self.airports.items().iter().find(|a| a.id == id)
    }

    pub fn airport_label(&self, id: AirportId) -> Option<&str> {
        self.airport_labels.get(&id).map(String::as_str)
    }

    pub fn airline_label(&self, id: AirlineId) -> Option<&str> {
        self.airline_labels.get(&id).map(String::as_str)
    }

    pub fn gate_label(&self, id: GateId) -> Option<&str> {
        self.gate_labels.get(&id).map(String::as_str)
    }

    pub fn airport_options(&self) -> Vec<SelectOption<AirportId>> {
        self.airports
            .items()
            .iter()
            .map(|a| SelectOption {
                value: a.id,
                label: a.label(),
            })
            .collect()
    }

    pub fn airline_options(&self) -> Vec<SelectOption<AirlineId>> {
        self.airlines
            .items()
            .iter()
            .map(|a| SelectOption {
                value: a.id,
                label: a.label(),
            })
            .collect()
    }

    pub fn gate_options(&self) -> Vec<SelectOption<GateId>> {
        self.gates
            .items()
            .iter()
            .map(|g| SelectOption {
                value: g.id,
                label: g.label(),
            })
            .collect()
    }

    /// Per-list failures, for reporting each one individually
    pub fn failures(&self) -> Vec<(&'static str, &ApiError)> {
        let mut failures = Vec::new();
        if let Some(e) = self.airports.error() {
            failures.push(("airports", e));
        }
        if let Some(e) = self.airlines.error() {
            failures.push(("airlines", e));
        }
        if let Some(e) = self.gates.error() {
            failures.push(("gates", e));
        }
        failures
    }
}
