//! Flightboard - client-side core of an airport arrivals and departures console
//!
//! Talks to the flights REST backend, caches airports, airlines and gates, keeps the filtered
//! flight list consistent under overlapping requests, and drives the shared create/edit form
//! and the two-step delete.

pub mod airlines;
pub mod airports;
pub mod api_client;
pub mod board;
pub mod config;
pub mod deletion;
pub mod edit_session;
pub mod error;
pub mod flight_query;
pub mod flights;
pub mod gates;
pub mod health;
pub mod logging;
pub mod notifications;
pub mod reference_data;
#[cfg(test)]
pub(crate) mod testing;
pub mod views;

pub use api_client::{FlightApi, FlightFilter, HttpApiClient};
pub use board::FlightBoard;
pub use config::ConsoleConfig;
pub use error::{ApiError, DeleteError, SubmitError, ValidationError};
pub use flights::{Flight, FlightPayload, FlightStatus, FlightType};
