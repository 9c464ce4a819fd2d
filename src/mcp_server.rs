// src/mcp_server.rs

use anyhow::Result;
use rmcp::{
    model::{ServerCapabilities, ServerInfo},
    schemars, tool,
    transport::stdio,
    ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use sky_flights::{controller_from_config, Config, ItineraryRow, SearchQuery, SearchReport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Flight search MCP server. Each tool call runs on its own controller so
/// concurrent calls never supersede each other.
#[derive(Clone)]
pub struct FlightServer {
    config: Arc<Config>,
}

impl FlightServer {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Initialize logging to file; stdout carries the protocol.
    fn init_logging() -> Result<()> {
        let log_dir = PathBuf::from("logs");
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = tracing_appender::rolling::daily(&log_dir, "sky-flights-mcp.log");

        tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info"))
                    .add_directive("sky_flights=debug".parse()?),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            )
            .init();

        info!("Logging initialized - logs will be written to logs/sky-flights-mcp.log.*");
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, schemars::JsonSchema)]
pub struct FlightSearchParams {
    #[schemars(description = "Origin city name (e.g., London)")]
    pub origin_city: String,
    #[schemars(description = "Destination city name (e.g., New York)")]
    pub destination_city: String,
    #[schemars(description = "Departure date in YYYY-MM-DD format")]
    pub date: String,
    #[schemars(description = "Return date in YYYY-MM-DD format for round trips")]
    pub return_date: Option<String>,
    #[schemars(description = "Maximum number of flights to return (default: 30)")]
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RouteSummary {
    pub summary: String,
    pub distance: String,
    pub duration: String,
}

#[derive(Debug, Serialize)]
pub struct FlightSearchResult {
    pub total_flights: usize,
    pub flights: Vec<ItineraryRow>,
    pub route: Option<RouteSummary>,
    pub error: Option<String>,
}

#[tool(tool_box)]
impl FlightServer {
    /// Flight search between two cities
    #[tool(description = "Search for flights between two cities on a date, with an optional return date. Also returns a driving route between the cities when one is available.")]
    async fn search_flights(&self, #[tool(aggr)] params: FlightSearchParams) -> String {
        info!(
            origin_city = %params.origin_city,
            destination_city = %params.destination_city,
            date = %params.date,
            return_date = params.return_date.as_deref(),
            max_results = params.max_results.unwrap_or(30),
            "Flight search request received"
        );

        let query = SearchQuery {
            origin_city: params.origin_city,
            destination_city: params.destination_city,
            date: params.date,
            return_date: params.return_date,
        };
        let controller = match controller_from_config(&self.config) {
            Ok(controller) => controller,
            Err(e) => {
                error!("Error creating search clients: {}", e);
                return format!(r#"{{"error": "Error creating search clients: {}"}}"#, e);
            }
        };
        let report = controller.submit(query).await;
        debug!(generation = report.generation, superseded = report.superseded, "Search returned");

        format_search_result_json(report, params.max_results)
    }
}

fn format_search_result_json(report: SearchReport, max_results: Option<usize>) -> String {
    let state = report.state;
    let total_flights = state.rows.len();
    let limit = max_results.unwrap_or(30);

    let result = FlightSearchResult {
        total_flights,
        flights: state.rows.into_iter().take(limit).collect(),
        route: state.route.map(|route| RouteSummary {
            summary: route.summary,
            distance: route.distance_text,
            duration: route.duration_text,
        }),
        error: state.interaction.error_message,
    };

    if let Some(error) = &result.error {
        error!(error = %error, "Flight search finished with errors");
    }

    serde_json::to_string_pretty(&result)
        .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize results: {}"}}"#, e))
}

#[tool(tool_box)]
impl ServerHandler for FlightServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("A flight search server that resolves city names to airports, returns itineraries with price and duration, and a driving route between the cities.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = FlightServer::init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting MCP Flight Server");
    let config = Config::from_env()?;
    let server = FlightServer::new(config);
    let transport = stdio();

    let service = server.serve(transport).await?;
    info!("MCP service started, waiting for requests");

    service.waiting().await?;

    info!("MCP service shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sky_flights::{InteractionState, RouteResult, SearchState};

    fn row(destination: &str, price: &str) -> ItineraryRow {
        ItineraryRow {
            destination: destination.to_string(),
            departure_date: "8/15/2025".to_string(),
            arrival_date: "8/15/2025".to_string(),
            price: price.to_string(),
            duration: "1h 15m".to_string(),
        }
    }

    fn report_with(rows: Vec<ItineraryRow>, route: Option<RouteResult>, error: Option<&str>) -> SearchReport {
        SearchReport {
            generation: 1,
            superseded: false,
            state: SearchState {
                generation: 1,
                rows,
                route,
                interaction: InteractionState {
                    loading: false,
                    error_message: error.map(str::to_string),
                },
                ..SearchState::default()
            },
        }
    }

    #[test]
    fn test_result_json_limits_flights_and_keeps_total() {
        let route = RouteResult {
            summary: "A1 and E15".to_string(),
            distance_text: "459 km".to_string(),
            duration_text: "5 hours 41 mins".to_string(),
            ..RouteResult::default()
        };
        let report = report_with(
            vec![row("Paris", "$99"), row("Paris", "$121"), row("Paris", "$140")],
            Some(route),
            Some("Could not calculate directions: ZERO_RESULTS"),
        );

        let json: serde_json::Value =
            serde_json::from_str(&format_search_result_json(report, Some(2))).unwrap();
        assert_eq!(json["total_flights"], 3);
        assert_eq!(json["flights"].as_array().unwrap().len(), 2);
        assert_eq!(json["flights"][1]["price"], "$121");
        assert_eq!(json["route"]["summary"], "A1 and E15");
        assert_eq!(json["route"]["distance"], "459 km");
        assert_eq!(json["route"]["duration"], "5 hours 41 mins");
        assert_eq!(json["error"], "Could not calculate directions: ZERO_RESULTS");
    }

    #[test]
    fn test_result_json_defaults() {
        let rows = (0..35).map(|i| row("Paris", &format!("${}", 100 + i))).collect();
        let report = report_with(rows, None, None);

        let json: serde_json::Value =
            serde_json::from_str(&format_search_result_json(report, None)).unwrap();
        assert_eq!(json["total_flights"], 35);
        assert_eq!(json["flights"].as_array().unwrap().len(), 30);
        assert!(json["route"].is_null());
        assert!(json["error"].is_null());
    }
}
