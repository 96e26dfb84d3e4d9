use std::fmt;
use tracing::{info, warn};

use crate::api_client::FlightApi;
use crate::error::ApiError;

/// Backend health as shown in the console header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Loading,
    Ok,
    /// The health endpoint answered, but not with "OK"
    Unexpected(String),
    Error(ApiError),
}

impl BackendStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, BackendStatus::Ok)
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendStatus::Loading => write!(f, "Loading..."),
            BackendStatus::Ok => write!(f, "OK"),
            BackendStatus::Unexpected(body) => write!(f, "Unexpected ({})", body),
            BackendStatus::Error(e) => write!(f, "ERROR ({})", e),
        }
    }
}

/// Call `GET /api/health` once and classify the answer
pub async fn check_backend(api: &dyn FlightApi) -> BackendStatus {
    match api.health().await {
        Ok(body) if body.trim() == "OK" => {
            info!("Backend healthy");
            BackendStatus::Ok
        }
        Ok(body) => {
            warn!("Backend health returned unexpected body: {}", body);
            BackendStatus::Unexpected(body)
        }
        Err(e) => {
            warn!("Backend health check failed: {}", e);
            BackendStatus::Error(e)
        }
    }
}
