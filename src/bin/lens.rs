//! lens: LocalLens command-line client
//!
//! Runs the cached queries and places lookups from a terminal and prints
//! JSON to stdout.

use std::io::{self, IsTerminal, Read};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use locallens::cli::{Config, build_client};
use locallens::{LensGateway, LensError};

/// LocalLens CLI client
#[derive(Parser)]
#[command(name = "lens")]
#[command(version = locallens::PKG_VERSION)]
#[command(about = "LocalLens recommendations and places client")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "LOCALLENS_CONFIG")]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommendations near a point (cached)
    Recommendations {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },

    /// Insights near a point (cached)
    Insights {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },

    /// Resolve a location name to coordinates
    Geocode {
        /// Free-text location
        text: String,
    },

    /// Search places of a type around a point
    Search {
        /// Place type (e.g. "restaurant", "museum"); empty for things to do
        place_type: String,
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
        /// Radius in meters
        #[arg(short, long)]
        radius: Option<f64>,
        /// Maximum results
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show the detail record of a place
    Details {
        /// Place identifier
        place_id: String,
    },

    /// Generate a short summary of a place
    Summarize {
        /// Place name
        place: String,
        /// Location the place is in
        location: String,
    },

    /// Find things to do at a location, with summaries
    Discover {
        /// Free-text location
        location: String,
    },

    /// Geocode a location and search it for a place type
    QuickSearch {
        /// Free-text location
        location: String,
        /// Place type
        place_type: String,
    },

    /// Remove all cached responses
    ClearCache,

    /// Store the API key (omit to read from stdin)
    SetKey { key: Option<String> },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    debug!(api = %config.api.base_url, proxy = %config.api.proxy_url, "configuration loaded");
    let client = build_client(&config)?;

    match args.command {
        Command::Recommendations { lat, lon } => {
            print_json(&client.get_recommendations(lat, lon).await?)?;
        }
        Command::Insights { lat, lon } => {
            print_json(&client.get_insights(lat, lon).await?)?;
        }
        Command::Geocode { text } => {
            print_json(&client.geocode(&text).await?)?;
        }
        Command::Search {
            place_type,
            lat,
            lon,
            radius,
            limit,
        } => {
            let places = client
                .search_by_query(&place_type, lat, lon, radius, limit)
                .await?;
            print_json(&places)?;
        }
        Command::Details { place_id } => match client.place_details(&place_id).await? {
            Some(details) => print_json(&details)?,
            None => eprintln!("No details for place '{place_id}'"),
        },
        Command::Summarize { place, location } => {
            println!("{}", client.summarize_place(&place, &location).await?);
        }
        Command::Discover { location } => {
            let discovery = client.discover(&location).await?;
            if let Some(message) = &discovery.message {
                eprintln!("{message}");
            }
            print_json(&discovery.items)?;
        }
        Command::QuickSearch {
            location,
            place_type,
        } => {
            print_json(&client.quick_search(&location, &place_type).await?)?;
        }
        Command::ClearCache => {
            let removed = client.clear_cache().await;
            println!("Removed {removed} cached entries");
        }
        Command::SetKey { key } => {
            let key = read_input(key)?;
            client.update_credential(key.trim()).await;
            println!("API key updated");
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), LensError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Use the argument if present, otherwise read stdin.
fn read_input(arg: Option<String>) -> io::Result<String> {
    if let Some(text) = arg {
        return Ok(text);
    }
    if io::stdin().is_terminal() {
        eprintln!("Enter API key, then EOF (Ctrl-D):");
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
