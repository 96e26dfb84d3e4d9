//! Flight list state driven by the current filter.
//!
//! Every filter change (or explicit refresh) issues a new request tagged with a monotonically
//! increasing sequence number. Only the response carrying the latest sequence number may
//! update the visible state; late answers to superseded requests are dropped on arrival.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::airports::AirportId;
use crate::api_client::{FlightApi, FlightFilter};
use crate::error::ApiError;
use crate::flights::{Flight, FlightType};

/// Visible state of the flight list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Flight>),
    /// Rendered as an empty list with a failure indication
    Failed(ApiError),
}

/// Identifies one issued list request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    filter: FlightFilter,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn filter(&self) -> &FlightFilter {
        &self.filter
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlightQueryController {
    filter: FlightFilter,
    state: QueryState,
    latest_seq: u64,
}

impl FlightQueryController {
    pub fn new(filter: FlightFilter) -> Self {
        Self {
            filter,
            state: QueryState::Idle,
            latest_seq: 0,
        }
    }

    pub fn filter(&self) -> &FlightFilter {
        &self.filter
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Flights to display: empty unless the latest request succeeded
    pub fn flights(&self) -> &[Flight] {
        match &self.state {
            QueryState::Loaded(flights) => flights,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.state {
            QueryState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Issue a request for the current filter: moves to `Loading` and supersedes any
    /// request still in flight
    pub fn begin(&mut self) -> RequestTicket {
        self.latest_seq += 1;
        self.state = QueryState::Loading;
        debug!("Flight query #{} issued for {:?}", self.latest_seq, self.filter);
        RequestTicket {
            seq: self.latest_seq,
            filter: self.filter,
        }
    }

    /// Replace the whole filter and issue a request for it
    pub fn set_filter(&mut self, filter: FlightFilter) -> RequestTicket {
        self.filter = filter;
        self.begin()
    }

    /// Change the airport selection (`None` for every airport)
    pub fn select_airport(&mut self, airport_id: Option<AirportId>) -> RequestTicket {
        self.set_filter(FlightFilter {
            airport_id,
            ..self.filter
        })
    }

    /// Change the direction tab (`None` for both directions)
    pub fn select_direction(&mut self, flight_type: Option<FlightType>) -> RequestTicket {
        self.set_filter(FlightFilter {
            flight_type,
            ..self.filter
        })
    }

    /// Publish the outcome of `ticket`'s request. Returns `false` (and changes nothing) when
    /// a newer request has been issued since.
    pub fn apply(&mut self, ticket: RequestTicket, result: Result<Vec<Flight>, ApiError>) -> bool {
        if ticket.seq != self.latest_seq {
            debug!(
                "Discarding stale flight query #{} (latest is #{})",
                ticket.seq, self.latest_seq
            );
            return false;
        }

        self.state = match result {
            Ok(flights) => {
                info!(
                    "Flight query #{} loaded {} flights for {:?}",
                    ticket.seq,
                    flights.len(),
                    ticket.filter
                );
                QueryState::Loaded(flights)
            }
            Err(e) => {
                warn!("Flight query #{} failed: {}", ticket.seq, e);
                QueryState::Failed(e)
            }
        };
        true
    }

    /// Perform `ticket`'s request and apply the result
    pub async fn run(&mut self, api: &dyn FlightApi, ticket: RequestTicket) -> bool {
        let result = api.list_flights(&ticket.filter).await;
        self.apply(ticket, result)
    }

    /// Re-query with the current filter (used after every successful write)
    pub async fn refresh(&mut self, api: &dyn FlightApi) -> bool {
        let ticket = self.begin();
        self.run(api, ticket).await
    }

    pub async fn change_filter(&mut self, api: &dyn FlightApi, filter: FlightFilter) -> bool {
        let ticket = self.set_filter(filter);
        self.run(api, ticket).await
    }
}

/// [`FlightQueryController`] shared between tasks, so several list requests can be in flight
/// at once. The lock is taken only to issue tickets and to apply results, never across the
/// network call.
#[derive(Clone)]
pub struct SharedFlightQuery {
    inner: Arc<RwLock<FlightQueryController>>,
    api: Arc<dyn FlightApi>,
}

impl SharedFlightQuery {
    pub fn new(api: Arc<dyn FlightApi>, filter: FlightFilter) -> Self {
        Self {
            inner: Arc::new(RwLock::new(FlightQueryController::new(filter))),
            api,
        }
    }

    /// Change the filter and fetch in the background. The task resolves to whether its
    /// result was applied.
    pub async fn set_filter(&self, filter: FlightFilter) -> JoinHandle<bool> {
        let ticket = self.inner.write().await.set_filter(filter);
        self.spawn_fetch(ticket)
    }

    pub async fn select_airport(&self, airport_id: Option<AirportId>) -> JoinHandle<bool> {
        let ticket = self.inner.write().await.select_airport(airport_id);
        self.spawn_fetch(ticket)
    }

    pub async fn select_direction(&self, flight_type: Option<FlightType>) -> JoinHandle<bool> {
        let ticket = self.inner.write().await.select_direction(flight_type);
        self.spawn_fetch(ticket)
    }

    pub async fn refresh(&self) -> JoinHandle<bool> {
        let ticket = self.inner.write().await.begin();
        self.spawn_fetch(ticket)
    }

    fn spawn_fetch(&self, ticket: RequestTicket) -> JoinHandle<bool> {
        let inner = Arc::clone(&self.inner);
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let result = api.list_flights(ticket.filter()).await;
            inner.write().await.apply(ticket, result)
        })
    }

    pub async fn state(&self) -> QueryState {
        self.inner.read().await.state().clone()
    }

    pub async fn filter(&self) -> FlightFilter {
        *self.inner.read().await.filter()
    }

    pub async fn flights(&self) -> Vec<Flight> {
        self.inner.read().await.flights().to_vec()
    }
}
