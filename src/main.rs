//! CLI interface for sky-flights

use clap::{Parser, Subcommand};
use sky_flights::shell::{render_header, render_search_view};
use sky_flights::{controller_from_config, Config, FlightError, Outcome, SearchQuery};
use std::fs;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sky-flights")]
#[command(about = "Search flights between cities, with a driving route between them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for flights
    Search {
        /// Origin city
        #[arg(short, long)]
        from: String,
        /// Destination city
        #[arg(short, long)]
        to: String,
        /// Departure date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Return date for round trips (YYYY-MM-DD)
        #[arg(short, long)]
        return_date: Option<String>,
        /// Print the full search state as JSON
        #[arg(long)]
        json: bool,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<String>,
        /// Print a static map URL showing the route
        #[arg(long)]
        map: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sky_flights=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build the query and check it before any configuration is loaded.
fn validated_query(
    from: String,
    to: String,
    date: String,
    return_date: Option<String>,
) -> Result<SearchQuery, FlightError> {
    let query = SearchQuery {
        origin_city: from,
        destination_city: to,
        date,
        return_date,
    };
    query.validate()?;
    Ok(query)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            from,
            to,
            date,
            return_date,
            json,
            output,
            map,
        } => {
            let query = match validated_query(from, to, date, return_date) {
                Ok(query) => query,
                Err(e) => {
                    eprintln!("Error searching for flights: {}", e);
                    std::process::exit(1);
                }
            };

            let config = Config::from_env()?;
            let controller = controller_from_config(&config)?;
            debug!("Search controller ready");

            eprintln!("Searching for flights...");
            let report = controller.submit(query).await;
            let state = &report.state;

            if json || output.is_some() {
                let json = serde_json::to_string_pretty(state)?;
                if let Some(output_file) = output {
                    fs::write(&output_file, &json)?;
                    println!("Results saved to {}", output_file);
                } else {
                    println!("{}", json);
                }
            } else {
                println!("{}", render_header());
                println!("{}", render_search_view(state));
            }

            if map {
                match config.google_maps_api_key.as_deref() {
                    Some(key) => {
                        let url = state.map_view().static_map_url(&config.maps_base_url, key, 640, 480)?;
                        println!("Map: {}", url);
                    }
                    None => eprintln!("GOOGLE_MAPS_API_KEY not set, no map available"),
                }
            }

            if matches!(report.outcome(), Some(Outcome::Failed) | None) {
                if let Some(error) = state.error_message() {
                    eprintln!("Error searching for flights: {}", error);
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
