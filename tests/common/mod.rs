//! In-process mock of the flights backend for integration tests
//!
//! `MockBackend::start()` serves the `/api` routes from an axum router bound to an
//! ephemeral port on 127.0.0.1. Every request is recorded (method, path, query string and
//! JSON body) so tests can assert on exactly what went over the wire, and any route can be
//! scripted to answer with a fixed status and body instead of its normal behaviour.
//!
//! # Usage
//!
//! ```no_run
//! use common::MockBackend;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let backend = MockBackend::start().await.expect("Failed to start mock backend");
//!     let api = backend.client();
//!     // The server task is aborted when `backend` is dropped
//! }
//! ```

#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{Body, to_bytes};
use axum::extract::{Path, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use flightboard::HttpApiClient;

/// One request as the backend received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

struct BackendState {
    health: String,
    airports: Value,
    airlines: Value,
    gates: Value,
    flights: Vec<Value>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    scripted: HashMap<(Method, String), (StatusCode, String)>,
}

type SharedState = Arc<Mutex<BackendState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct MockBackend {
    addr: SocketAddr,
    state: SharedState,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend seeded with two airports, one airline, two gates and no flights
    pub async fn start() -> Result<Self> {
        let state = Arc::new(Mutex::new(BackendState {
            health: "OK".to_string(),
            airports: json!([
                {"id": 7, "code": "YYT", "city": "St. John's"},
                {"id": 3, "code": "YYZ", "city": "Toronto"}
            ]),
            airlines: json!([{"id": 2, "code": "AC", "name": "Air Canada"}]),
            gates: json!([
                {"id": 5, "name": "A3", "terminal": "T1"},
                {"id": 6, "name": "B1", "terminal": null}
            ]),
            flights: Vec::new(),
            next_id: 100,
            requests: Vec::new(),
            scripted: HashMap::new(),
        }));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind mock backend")?;
        let addr = listener
            .local_addr()
            .context("Failed to read mock backend address")?;

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> HttpApiClient {
        HttpApiClient::new(reqwest::Client::new(), self.base_url())
    }

    pub fn set_health(&self, body: &str) {
        lock(&self.state).health = body.to_string();
    }

    pub fn insert_flight(&self, flight: Value) {
        lock(&self.state).flights.push(flight);
    }

    pub fn flights(&self) -> Vec<Value> {
        lock(&self.state).flights.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests that hit `path` with `method`, oldest first
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Answer `method path` with `status` and `body` from now on
    pub fn respond_with(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        lock(&self.state)
            .scripted
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    pub fn clear_scripts(&self) {
        lock(&self.state).scripted.clear();
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A flight as the backend lists it, denormalized display fields included
pub fn flight_json(id: i64, flight_number: &str, flight_type: &str) -> Value {
    json!({
        "id": id,
        "flightNumber": flight_number,
        "type": flight_type,
        "status": "ON_TIME",
        "scheduledTime": "2026-01-11T18:30:00",
        "estimatedTime": null,
        "origin": "Toronto",
        "destination": "St. John's",
        "airportId": 7,
        "airlineId": 2,
        "gateId": 5,
        "airportCode": "YYT",
        "airlineName": "Air Canada",
        "gateName": "A3"
    })
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/airports", get(airports))
        .route("/api/airlines", get(airlines))
        .route("/api/gates", get(gates))
        .route("/api/flights", get(list_flights).post(create_flight))
        .route("/api/flights/{id}", put(update_flight).delete(delete_flight))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            record_and_script,
        ))
        .with_state(state)
}

async fn record_and_script(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let scripted = {
        let mut backend = lock(&state);
        backend.requests.push(RecordedRequest {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            body: serde_json::from_slice(&bytes).ok(),
        });
        backend
            .scripted
            .get(&(parts.method.clone(), parts.uri.path().to_string()))
            .cloned()
    };

    if let Some((status, body)) = scripted {
        return (status, body).into_response();
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn health(State(state): State<SharedState>) -> String {
    lock(&state).health.clone()
}

async fn airports(State(state): State<SharedState>) -> Json<Value> {
    Json(lock(&state).airports.clone())
}

async fn airlines(State(state): State<SharedState>) -> Json<Value> {
    Json(lock(&state).airlines.clone())
}

async fn gates(State(state): State<SharedState>) -> Json<Value> {
    Json(lock(&state).gates.clone())
}

async fn list_flights(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let backend = lock(&state);
    let flights = backend
        .flights
        .iter()
        .filter(|f| {
            params
                .get("airportId")
                .is_none_or(|id| f["airportId"].to_string() == *id)
                && params.get("type").is_none_or(|t| f["type"] == t.as_str())
        })
        .cloned()
        .collect();
    Json(Value::Array(flights))
}

async fn create_flight(
    State(state): State<SharedState>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut backend = lock(&state);
    let id = backend.next_id;
    backend.next_id += 1;

    if let Value::Object(map) = &mut body {
        map.insert("id".to_string(), json!(id));
    }
    backend.flights.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

fn not_found(id: i64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": format!("Flight {} not found", id)})),
    )
        .into_response()
}

async fn update_flight(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = lock(&state);
    let Some(flight) = backend.flights.iter_mut().find(|f| f["id"] == id) else {
        return not_found(id);
    };

    if let (Value::Object(stored), Value::Object(changes)) = (&mut *flight, body) {
        for (key, value) in changes {
            stored.insert(key, value);
        }
        stored.insert("id".to_string(), json!(id));
    }
    Json(flight.clone()).into_response()
}

async fn delete_flight(State(state): State<SharedState>, Path(id): Path<i64>) -> Response {
    let mut backend = lock(&state);
    let before = backend.flights.len();
    backend.flights.retain(|f| f["id"] != id);
    if backend.flights.len() == before {
        return not_found(id);
    }
    StatusCode::NO_CONTENT.into_response()
}
