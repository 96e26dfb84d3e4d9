use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use flightboard::airports::AirportId;
use flightboard::api_client::{FlightApi, HttpApiClient};
use flightboard::config::ConsoleConfig;
use flightboard::flights::{FlightId, FlightType};
use flightboard::logging::{Verbosity, init_logging};

mod commands;

use commands::{
    FlightFields, handle_create_flight, handle_delete_flight, handle_edit_flight, handle_health,
    handle_list_airlines, handle_list_airports, handle_list_flights, handle_list_gates,
};

#[derive(Parser)]
#[command(name = "flightboard")]
#[command(about = "Console for airport arrivals and departures")]
#[command(version)]
struct Cli {
    /// Backend root URL (overrides config file and FLIGHTBOARD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend answers
    Health,
    /// List airports
    Airports,
    /// List airlines
    Airlines,
    /// List gates
    Gates,
    /// List, create, edit or delete flights
    Flights {
        #[command(subcommand)]
        command: FlightCommands,
    },
}

#[derive(Subcommand)]
enum FlightCommands {
    /// Show the flight list, optionally for one airport and direction
    List {
        /// Airport id (defaults to the configured airport)
        #[arg(long)]
        airport: Option<AirportId>,

        /// ARRIVAL or DEPARTURE
        #[arg(long = "type")]
        flight_type: Option<FlightType>,

        /// Ignore the configured default airport
        #[arg(long, conflicts_with = "airport")]
        all: bool,
    },
    /// Create a flight; every field except --estimated is required
    Create {
        #[command(flatten)]
        fields: FlightFields,
    },
    /// Change some fields of an existing flight
    Edit {
        id: FlightId,

        #[command(flatten)]
        fields: FlightFields,
    },
    /// Delete a flight after confirmation
    Delete {
        id: FlightId,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn resolve_config(cli: &Cli) -> Result<ConsoleConfig> {
    let mut config = ConsoleConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout_secs = Some(secs);
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(Verbosity::from_occurrences(cli.verbose));

    let config = resolve_config(&cli)?;
    debug!("Using backend at {}", config.api_base_url);

    let api: Arc<dyn FlightApi> = Arc::new(HttpApiClient::from_config(&config)?);

    match cli.command {
        Commands::Health => handle_health(api).await,
        Commands::Airports => handle_list_airports(api).await,
        Commands::Airlines => handle_list_airlines(api).await,
        Commands::Gates => handle_list_gates(api).await,
        Commands::Flights { command } => match command {
            FlightCommands::List {
                airport,
                flight_type,
                all,
            } => {
                let airport = if all {
                    None
                } else {
                    airport.or(config.default_airport_id)
                };
                handle_list_flights(api, airport, flight_type).await
            }
            FlightCommands::Create { fields } => {
                handle_create_flight(api, fields, config.default_airport_id).await
            }
            FlightCommands::Edit { id, fields } => handle_edit_flight(api, id, fields).await,
            FlightCommands::Delete { id, yes } => handle_delete_flight(api, id, yes).await,
        },
    }
}
