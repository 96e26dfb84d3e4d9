use anyhow::{Result, bail};
use std::sync::Arc;

use flightboard::api_client::FlightApi;
use flightboard::health::check_backend;

/// Print the backend status; fails unless the backend answered "OK"
pub async fn handle_health(api: Arc<dyn FlightApi>) -> Result<()> {
    let status = check_backend(api.as_ref()).await;
    println!("Backend status: {}", status);

    if !status.is_ok() {
        bail!("backend is not healthy");
    }
    Ok(())
}
