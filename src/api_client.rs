use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::airlines::Airline;
use crate::airports::{Airport, AirportId};
use crate::config::ConsoleConfig;
use crate::error::ApiError;
use crate::flights::{Flight, FlightId, FlightPayload, FlightType};
use crate::gates::Gate;

/// Which flights a list query asks for. Both fields `None` means every flight (admin view).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlightFilter {
    pub airport_id: Option<AirportId>,
    pub flight_type: Option<FlightType>,
}

impl FlightFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(airport_id: Option<AirportId>, flight_type: Option<FlightType>) -> Self {
        Self {
            airport_id,
            flight_type,
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.airport_id.is_none() && self.flight_type.is_none()
    }

    /// Query parameters for `GET /api/flights`; unset fields are omitted entirely
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(airport_id) = self.airport_id {
            params.push(("airportId", airport_id.to_string()));
        }
        if let Some(flight_type) = self.flight_type {
            params.push(("type", flight_type.as_str().to_string()));
        }
        params
    }
}

/// Typed access to the flights REST API.
///
/// Every method is exactly one round trip. Nothing here retries; callers decide what a
/// failure means for their state.
#[async_trait]
pub trait FlightApi: Send + Sync {
    /// Raw body of `GET /api/health` ("OK" when the backend is healthy)
    async fn health(&self) -> Result<String, ApiError>;

    async fn list_airports(&self) -> Result<Vec<Airport>, ApiError>;

    async fn list_airlines(&self) -> Result<Vec<Airline>, ApiError>;

    async fn list_gates(&self) -> Result<Vec<Gate>, ApiError>;

    async fn list_flights(&self, filter: &FlightFilter) -> Result<Vec<Flight>, ApiError>;

    async fn create_flight(&self, payload: &FlightPayload) -> Result<Flight, ApiError>;

    async fn update_flight(&self, id: FlightId, payload: &FlightPayload)
    -> Result<Flight, ApiError>;

    async fn delete_flight(&self, id: FlightId) -> Result<(), ApiError>;
}

/// reqwest-backed [`FlightApi`] talking to the console backend
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    /// Create a client for `base_url` (e.g. "http://localhost:8080"), without the `/api` suffix
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Build the underlying HTTP client from configuration (applies the optional timeout)
    pub fn from_config(config: &ConsoleConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self::new(client, config.api_base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Send a request and turn transport failures and non-2xx statuses into [`ApiError`]
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!("{} failed without a response: {}", operation, e);
            ApiError::network(operation, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = server_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            warn!("{} rejected by server: {} {}", operation, status, message);
            return Err(ApiError::server(operation, status.as_u16(), message));
        }

        Ok(response)
    }

    /// Read the body as text first so decode failures can be reported with context
    async fn read_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        response: Response,
    ) -> Result<T, ApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(operation, format!("failed to read body: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            ApiError::decode(
                operation,
                format!(
                    "{} (body: {})",
                    e,
                    text.chars().take(200).collect::<String>()
                ),
            )
        })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        debug!("{}: GET /api/{}", operation, path);
        let response = self.send(operation, self.client.get(self.url(path))).await?;
        let items: Vec<T> = self.read_json(operation, response).await?;
        debug!("{}: {} records", operation, items.len());
        Ok(items)
    }
}

/// Pull a human readable message out of an error body: `{"message": ..}`, `{"error": ..}`
/// or the raw text. `None` when the body is blank.
fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return Some(message.clone());
            }
        }
    }

    Some(body.chars().take(500).collect())
}

#[async_trait]
impl FlightApi for HttpApiClient {
    async fn health(&self) -> Result<String, ApiError> {
        let response = self.send("health", self.client.get(self.url("health"))).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network("health", e.to_string()))?;

        // Some backends wrap the literal in JSON quotes
        Ok(serde_json::from_str::<String>(&text).unwrap_or(text))
    }

    async fn list_airports(&self) -> Result<Vec<Airport>, ApiError> {
        self.get_list("list_airports", "airports").await
    }

    async fn list_airlines(&self) -> Result<Vec<Airline>, ApiError> {
        self.get_list("list_airlines", "airlines").await
    }

    async fn list_gates(&self) -> Result<Vec<Gate>, ApiError> {
        self.get_list("list_gates", "gates").await
    }

    async fn list_flights(&self, filter: &FlightFilter) -> Result<Vec<Flight>, ApiError> {
        let params = filter.query_params();
        debug!("list_flights: GET /api/flights {:?}", params);

        let request = self.client.get(self.url("flights")).query(&params);
        let response = self.send("list_flights", request).await?;
        let flights: Vec<Flight> = self.read_json("list_flights", response).await?;

        debug!("list_flights: {} flights for {:?}", flights.len(), filter);
        Ok(flights)
    }

    async fn create_flight(&self, payload: &FlightPayload) -> Result<Flight, ApiError> {
        debug!("create_flight: POST /api/flights {}", payload.flight_number);
        let request = self.client.post(self.url("flights")).json(payload);
        let response = self.send("create_flight", request).await?;
        self.read_json("create_flight", response).await
    }

    async fn update_flight(
        &self,
        id: FlightId,
        payload: &FlightPayload,
    ) -> Result<Flight, ApiError> {
        debug!("update_flight: PUT /api/flights/{}", id);
        let request = self
            .client
            .put(self.url(&format!("flights/{}", id)))
            .json(payload);
        let response = self.send("update_flight", request).await?;
        self.read_json("update_flight", response).await
    }

    async fn delete_flight(&self, id: FlightId) -> Result<(), ApiError> {
        debug!("delete_flight: DELETE /api/flights/{}", id);
        let request = self.client.delete(self.url(&format!("flights/{}", id)));
        self.send("delete_flight", request).await?;
        Ok(())
    }
}
