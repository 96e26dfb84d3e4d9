//! In-memory [`FlightApi`] for unit tests.
//!
//! `FakeApi` keeps flights in a vector, records every call it receives, can be told to fail
//! specific operations, and can hold `list_flights` responses for a given filter until the
//! test releases them (to reproduce responses arriving out of order).

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::airlines::Airline;
use crate::airports::Airport;
use crate::api_client::{FlightApi, FlightFilter};
use crate::error::ApiError;
use crate::flights::{Flight, FlightId, FlightPayload, FlightStatus, FlightType};
use crate::gates::Gate;

/// API operations, for scripting failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    Health,
    ListAirports,
    ListAirlines,
    ListGates,
    ListFlights,
    CreateFlight,
    UpdateFlight,
    DeleteFlight,
}

/// A call received by the fake, with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Health,
    ListAirports,
    ListAirlines,
    ListGates,
    ListFlights(FlightFilter),
    CreateFlight(FlightPayload),
    UpdateFlight(FlightId, FlightPayload),
    DeleteFlight(FlightId),
}

impl ApiCall {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            ApiCall::CreateFlight(_) | ApiCall::UpdateFlight(..) | ApiCall::DeleteFlight(_)
        )
    }
}

type HeldResponse = oneshot::Receiver<Result<Vec<Flight>, ApiError>>;

#[derive(Default)]
struct FakeState {
    health: String,
    airports: Vec<Airport>,
    airlines: Vec<Airline>,
    gates: Vec<Gate>,
    flights: Vec<Flight>,
    next_id: FlightId,
    failures: HashMap<ApiOp, ApiError>,
    held_list_responses: HashMap<FlightFilter, VecDeque<HeldResponse>>,
    calls: Vec<ApiCall>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        {
            let mut state = api.state();
            state.health = "OK".to_string();
            state.next_id = 100;
        }
        api
    }

    /// Two airports, one airline, two gates (one without a terminal)
    pub fn with_reference_data() -> Self {
        let api = Self::new();
        {
            let mut state = api.state();
            state.airports = vec![
                Airport {
                    id: 7,
                    code: "YYT".to_string(),
                    city: "St. John's".to_string(),
                },
                Airport {
                    id: 3,
                    code: "YYZ".to_string(),
                    city: "Toronto".to_string(),
                },
            ];
            state.airlines = vec![Airline {
                id: 2,
                code: "AC".to_string(),
                name: "Air Canada".to_string(),
            }];
            state.gates = vec![
                Gate {
                    id: 5,
                    name: "A3".to_string(),
                    terminal: Some("T1".to_string()),
                },
                Gate {
                    id: 6,
                    name: "B1".to_string(),
                    terminal: None,
                },
            ];
        }
        api
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_health(&self, body: &str) {
        self.state().health = body.to_string();
    }

    pub fn insert_flight(&self, flight: Flight) {
        let mut state = self.state();
        state.next_id = state.next_id.max(flight.id + 1);
        state.flights.push(flight);
    }

    pub fn flights(&self) -> Vec<Flight> {
        self.state().flights.clone()
    }

    /// Make every subsequent call of `op` fail with `error`
    pub fn fail(&self, op: ApiOp, error: ApiError) {
        self.state().failures.insert(op, error);
    }

    pub fn fail_airports(&self, error: ApiError) {
        self.fail(ApiOp::ListAirports, error);
    }

    /// Undo [`FakeApi::fail`] for `op`
    pub fn succeed(&self, op: ApiOp) {
        self.state().failures.remove(&op);
    }

    /// The next `list_flights` call for `filter` waits for the returned sender instead of
    /// answering from the stored flights. Holds for the same filter queue up in call order.
    pub fn hold_list_flights(
        &self,
        filter: FlightFilter,
    ) -> oneshot::Sender<Result<Vec<Flight>, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.state()
            .held_list_responses
            .entry(filter)
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<ApiCall> {
        self.calls().into_iter().filter(ApiCall::is_write).collect()
    }

    pub fn count(&self, op: ApiOp) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call_op(call) == op)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        let mut state = self.state();
        let op = call_op(&call);
        state.calls.push(call);
        match state.failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn not_found(operation: &'static str, id: FlightId) -> ApiError {
        ApiError::server(operation, 404, format!("Flight {} not found", id))
    }
}

fn call_op(call: &ApiCall) -> ApiOp {
    match call {
        ApiCall::Health => ApiOp::Health,
        ApiCall::ListAirports => ApiOp::ListAirports,
        ApiCall::ListAirlines => ApiOp::ListAirlines,
        ApiCall::ListGates => ApiOp::ListGates,
        ApiCall::ListFlights(_) => ApiOp::ListFlights,
        ApiCall::CreateFlight(_) => ApiOp::CreateFlight,
        ApiCall::UpdateFlight(..) => ApiOp::UpdateFlight,
        ApiCall::DeleteFlight(_) => ApiOp::DeleteFlight,
    }
}

fn matches_filter(flight: &Flight, filter: &FlightFilter) -> bool {
    filter.airport_id.is_none_or(|id| flight.airport_id == id)
        && filter.flight_type.is_none_or(|t| flight.flight_type == t)
}

fn apply_payload(flight: &mut Flight, payload: &FlightPayload) {
    flight.flight_number = payload.flight_number.clone();
    flight.flight_type = payload.flight_type;
    flight.status = payload.status;
    flight.scheduled_time = payload.scheduled_time;
    flight.estimated_time = payload.estimated_time;
    flight.origin = payload.origin.clone();
    flight.destination = payload.destination.clone();
    flight.airport_id = payload.airport_id;
    flight.airline_id = payload.airline_id;
    flight.gate_id = payload.gate_id;
}

#[async_trait]
impl FlightApi for FakeApi {
    async fn health(&self) -> Result<String, ApiError> {
        self.record(ApiCall::Health)?;
        Ok(self.state().health.clone())
    }

    async fn list_airports(&self) -> Result<Vec<Airport>, ApiError> {
        self.record(ApiCall::ListAirports)?;
        Ok(self.state().airports.clone())
    }

    async fn list_airlines(&self) -> Result<Vec<Airline>, ApiError> {
        self.record(ApiCall::ListAirlines)?;
        Ok(self.state().airlines.clone())
    }

    async fn list_gates(&self) -> Result<Vec<Gate>, ApiError> {
        self.record(ApiCall::ListGates)?;
        Ok(self.state().gates.clone())
    }

    async fn list_flights(&self, filter: &FlightFilter) -> Result<Vec<Flight>, ApiError> {
        self.record(ApiCall::ListFlights(*filter))?;

        let held = self
            .state()
            .held_list_responses
            .get_mut(filter)
            .and_then(VecDeque::pop_front);
        if let Some(rx) = held {
            return rx
                .await
                .unwrap_or_else(|_| Err(ApiError::network("list_flights", "response dropped")));
        }

        Ok(self
            .state()
            .flights
            .iter()
            .filter(|f| matches_filter(f, filter))
            .cloned()
            .collect())
    }

    async fn create_flight(&self, payload: &FlightPayload) -> Result<Flight, ApiError> {
        self.record(ApiCall::CreateFlight(payload.clone()))?;

        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;

        let mut flight = sample_flight(id, &payload.flight_number, payload.flight_type);
        apply_payload(&mut flight, payload);
        flight.airport_code = None;
        flight.airline_name = None;
        flight.gate_name = None;
        state.flights.push(flight.clone());
        Ok(flight)
    }

    async fn update_flight(
        &self,
        id: FlightId,
        payload: &FlightPayload,
    ) -> Result<Flight, ApiError> {
        self.record(ApiCall::UpdateFlight(id, payload.clone()))?;

        let mut state = self.state();
        let flight = state
            .flights
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Self::not_found("update_flight", id))?;
        apply_payload(flight, payload);
        Ok(flight.clone())
    }

    async fn delete_flight(&self, id: FlightId) -> Result<(), ApiError> {
        self.record(ApiCall::DeleteFlight(id))?;

        let mut state = self.state();
        let before = state.flights.len();
        state.flights.retain(|f| f.id != id);
        if state.flights.len() == before {
            return Err(Self::not_found("delete_flight", id));
        }
        Ok(())
    }
}

/// A complete flight at airport 7 / airline 2 / gate 5, scheduled 2026-01-11 18:30
pub fn sample_flight(id: FlightId, flight_number: &str, flight_type: FlightType) -> Flight {
    let scheduled_time = NaiveDate::from_ymd_opt(2026, 1, 11)
        .and_then(|d| d.and_hms_opt(18, 30, 0))
        .unwrap_or_default();

    Flight {
        id,
        flight_number: flight_number.to_string(),
        flight_type,
        status: FlightStatus::OnTime,
        scheduled_time,
        estimated_time: None,
        origin: "Toronto".to_string(),
        destination: "St. John's".to_string(),
        airport_id: 7,
        airline_id: 2,
        gate_id: 5,
        airport_code: Some("YYT".to_string()),
        airline_name: Some("Air Canada".to_string()),
        gate_name: Some("A3".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_filters_and_records() {
        let api = FakeApi::new();
        api.insert_flight(sample_flight(1, "AC101", FlightType::Arrival));
        api.insert_flight(sample_flight(2, "AC102", FlightType::Departure));

        let arrivals = api
            .list_flights(&FlightFilter::new(Some(7), Some(FlightType::Arrival)))
            .await
            .unwrap();
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].flight_number, "AC101");

        let elsewhere = api
            .list_flights(&FlightFilter::new(Some(3), None))
            .await
            .unwrap();
        assert!(elsewhere.is_empty());
        assert_eq!(api.count(ApiOp::ListFlights), 2);
    }

    #[tokio::test]
    async fn test_fake_scripted_failure() {
        let api = FakeApi::new();
        api.fail(ApiOp::DeleteFlight, ApiError::network("delete_flight", "offline"));
        assert!(api.delete_flight(1).await.is_err());
        api.succeed(ApiOp::DeleteFlight);
        // Nothing stored, so the delete now reaches the 404 path
        assert_eq!(api.delete_flight(1).await.unwrap_err().status(), Some(404));
        assert_eq!(api.write_calls().len(), 2);
    }
}
