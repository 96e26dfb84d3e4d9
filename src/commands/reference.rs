use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use flightboard::api_client::FlightApi;

fn print_labels(rows: impl Iterator<Item = (i64, String)>) {
    for (id, label) in rows {
        println!("{:>6}  {}", id, label);
    }
}

pub async fn handle_list_airports(api: Arc<dyn FlightApi>) -> Result<()> {
    let airports = api
        .list_airports()
        .await
        .context("Failed to load airports")?;
    info!("Listing {} airports", airports.len());
    print_labels(airports.iter().map(|a| (a.id, a.label())));
    Ok(())
}

pub async fn handle_list_airlines(api: Arc<dyn FlightApi>) -> Result<()> {
    let airlines = api
        .list_airlines()
        .await
        .context("Failed to load airlines")?;
    info!("Listing {} airlines", airlines.len());
    print_labels(airlines.iter().map(|a| (a.id, a.label())));
    Ok(())
}

pub async fn handle_list_gates(api: Arc<dyn FlightApi>) -> Result<()> {
    let gates = api.list_gates().await.context("Failed to load gates")?;
    info!("Listing {} gates", gates.len());
    print_labels(gates.iter().map(|g| (g.id, g.label())));
    Ok(())
}
