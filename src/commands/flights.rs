use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Args;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use flightboard::airports::AirportId;
use flightboard::api_client::{FlightApi, FlightFilter};
use flightboard::board::FlightBoard;
use flightboard::edit_session::{DraftField, FieldEdit};
use flightboard::flights::{Flight, FlightId, FlightType};
use flightboard::notifications::NoticeLevel;
use flightboard::views::{FlightRow, render_flight_table};

/// Flight form fields as command line flags. Unset flags leave the field alone.
#[derive(Args, Debug, Default, Clone)]
pub struct FlightFields {
    /// Flight number, e.g. AC101
    #[arg(long = "number")]
    pub flight_number: Option<String>,

    /// ARRIVAL or DEPARTURE
    #[arg(long = "type")]
    pub flight_type: Option<String>,

    /// ON_TIME, DELAYED, BOARDING, CANCELLED or LANDED
    #[arg(long)]
    pub status: Option<String>,

    /// Scheduled time, YYYY-MM-DDTHH:MM
    #[arg(long)]
    pub scheduled: Option<String>,

    /// Estimated time, YYYY-MM-DDTHH:MM (an empty value clears it)
    #[arg(long)]
    pub estimated: Option<String>,

    #[arg(long)]
    pub origin: Option<String>,

    #[arg(long)]
    pub destination: Option<String>,

    /// Airport id
    #[arg(long)]
    pub airport: Option<String>,

    /// Airline id
    #[arg(long)]
    pub airline: Option<String>,

    /// Gate id
    #[arg(long)]
    pub gate: Option<String>,
}

impl FlightFields {
    /// One edit per flag that was given, in form order
    pub fn edits(&self) -> Result<Vec<FieldEdit>> {
        let values = [
            (DraftField::FlightNumber, &self.flight_number),
            (DraftField::FlightType, &self.flight_type),
            (DraftField::Status, &self.status),
            (DraftField::ScheduledTime, &self.scheduled),
            (DraftField::EstimatedTime, &self.estimated),
            (DraftField::Origin, &self.origin),
            (DraftField::Destination, &self.destination),
            (DraftField::AirportId, &self.airport),
            (DraftField::AirlineId, &self.airline),
            (DraftField::GateId, &self.gate),
        ];

        let edits = values
            .into_iter()
            .filter_map(|(field, raw)| raw.as_deref().map(|raw| FieldEdit::parse(field, raw)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edits)
    }
}

/// Write notices still within their lifetime: successes to stdout, failures to stderr
fn print_notices(board: &mut FlightBoard) {
    board.expire_notices(Utc::now());
    for notice in board.notices_mut().drain() {
        match notice.level {
            NoticeLevel::Error => eprintln!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => println!("{}", notice.message),
        }
    }
}

fn print_flight(board: &FlightBoard, flight: &Flight) {
    let row = FlightRow::from_flight(flight, board.reference());
    print!("{}", render_flight_table(&[row]));
}

/// Mount the board and fail if the flight list itself could not be loaded
async fn mount(board: &mut FlightBoard) -> Result<()> {
    board.mount().await;
    for (list, e) in board.reference().failures() {
        warn!("{} unavailable, labels may be missing: {}", list, e);
    }
    if let Some(e) = board.query().error() {
        return Err(e.clone()).context("Failed to load flights");
    }
    Ok(())
}

async fn ask_confirmation(prompt: &str) -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{} [y/N] ", prompt).as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read confirmation")?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn handle_list_flights(
    api: Arc<dyn FlightApi>,
    airport_id: Option<AirportId>,
    flight_type: Option<FlightType>,
) -> Result<()> {
    let filter = FlightFilter::new(airport_id, flight_type);
    info!("Listing flights for {:?}", filter);

    let mut board = FlightBoard::new(api, filter);
    mount(&mut board).await?;
    print!("{}", render_flight_table(&board.rows()));
    Ok(())
}

pub async fn handle_create_flight(
    api: Arc<dyn FlightApi>,
    fields: FlightFields,
    default_airport: Option<AirportId>,
) -> Result<()> {
    let edits = fields.edits()?;

    let mut board = FlightBoard::admin(api);
    mount(&mut board).await?;
    board.open_new();
    if fields.airport.is_none()
        && let Some(id) = default_airport
    {
        board.update_field(FieldEdit::AirportId(Some(id)));
    }
    for edit in edits {
        board.update_field(edit);
    }

    let result = board.submit().await;
    print_notices(&mut board);
    let outcome = result.context("Flight was not created")?;

    // Prefer the re-fetched row, which carries the backend's display names
    let created = board
        .query()
        .flights()
        .iter()
        .find(|f| f.id == outcome.flight.id)
        .unwrap_or(&outcome.flight);
    print_flight(&board, created);
    Ok(())
}

pub async fn handle_edit_flight(
    api: Arc<dyn FlightApi>,
    id: FlightId,
    fields: FlightFields,
) -> Result<()> {
    let edits = fields.edits()?;

    let mut board = FlightBoard::admin(api);
    mount(&mut board).await?;
    if !board.open_edit(id) {
        bail!("flight {} not found", id);
    }
    if edits.is_empty() {
        info!("No fields given, re-submitting flight {} unchanged", id);
    }
    for edit in edits {
        board.update_field(edit);
    }

    let result = board.submit().await;
    print_notices(&mut board);
    let outcome = result.context("Flight was not updated")?;

    print_flight(&board, &outcome.flight);
    Ok(())
}

pub async fn handle_delete_flight(
    api: Arc<dyn FlightApi>,
    id: FlightId,
    assume_yes: bool,
) -> Result<()> {
    let mut board = FlightBoard::admin(api);
    mount(&mut board).await?;

    let Some(row) = board.rows().into_iter().find(|row| row.id == id) else {
        bail!("flight {} not found", id);
    };

    board.request_delete(id);
    let prompt = format!(
        "Delete flight {} ({} {})?",
        row.flight_number, row.flight_type, row.scheduled_time
    );
    if !assume_yes && !ask_confirmation(&prompt).await? {
        board.dismiss_delete();
        println!("Deletion cancelled");
        return Ok(());
    }

    let result = board.confirm_delete().await;
    print_notices(&mut board);
    result.context("Flight was not deleted")?;
    Ok(())
}
