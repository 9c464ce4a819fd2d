//! # Sky Flights Library
//!
//! Flight search between two cities through the Sky-Scrapper API, with a
//! driving route between the same places computed by the Google Directions
//! API and rendered onto a static map view.
//!
//! The library is built around [`SearchController`], which owns the
//! interaction state of one search view and drives the two adapters
//! ([`SearchGateway`] and [`RouteProvider`]) through a search.

pub mod client;
pub mod config;
pub mod directions;
pub mod format;
pub mod map;
pub mod models;
pub mod search;
pub mod shell;

#[cfg(test)]
mod test_server;

use thiserror::Error;

// Re-export main types for convenience
pub use client::{ItineraryQuery, SearchGateway, SkyScrapperClient};
pub use config::Config;
pub use directions::{GoogleDirectionsClient, RouteProvider};
pub use format::{format_date, format_duration};
pub use map::{LatLng, MapOptions, MapView};
pub use models::*;
pub use search::{
    InteractionState, Outcome, SearchController, SearchEvent, SearchPhase, SearchReport,
    SearchState,
};

/// Error types for the flights library
#[derive(Error, Debug)]
pub enum FlightError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid date format: {0}")]
    DateParseError(String),

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Invalid location data for city: {0}")]
    InvalidLocation(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    UpstreamStatus { endpoint: String, status: u16 },

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No flights found")]
    NoResults,

    #[error("Could not calculate directions: {0}")]
    RouteUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`FlightError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transport,
    NoResults,
    RouteUnavailable,
    Config,
}

impl FlightError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlightError::Validation(_) | FlightError::DateParseError(_) => ErrorKind::Validation,
            FlightError::CityNotFound(_) | FlightError::InvalidLocation(_) => ErrorKind::NotFound,
            FlightError::HttpError(_)
            | FlightError::UpstreamStatus { .. }
            | FlightError::JsonError(_) => ErrorKind::Transport,
            FlightError::NoResults => ErrorKind::NoResults,
            FlightError::RouteUnavailable(_) => ErrorKind::RouteUnavailable,
            FlightError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Build a controller wired to the real Sky-Scrapper and Google Directions
/// clients.
pub fn controller_from_config(
    config: &Config,
) -> Result<SearchController<SkyScrapperClient, GoogleDirectionsClient>, FlightError> {
    let gateway = SkyScrapperClient::new(config)?;
    let routes = GoogleDirectionsClient::new(config)?;
    Ok(SearchController::new(gateway, routes))
}

/// Simple one-shot search between two cities with configuration read from
/// the environment.
///
/// # Example
/// ```rust,no_run
/// use sky_flights::search_flights_between_cities;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = search_flights_between_cities("London", "Paris", "2025-08-15", None).await?;
/// println!("Found {} flights", report.state.rows.len());
/// # Ok(())
/// # }
/// ```
pub async fn search_flights_between_cities(
    from_city: &str,
    to_city: &str,
    date: &str,
    return_date: Option<&str>,
) -> Result<SearchReport, FlightError> {
    let config = Config::from_env()?;
    let controller = controller_from_config(&config)?;
    let query = SearchQuery {
        origin_city: from_city.to_string(),
        destination_city: to_city.to_string(),
        date: date.to_string(),
        return_date: return_date.map(str::to_string),
    };
    Ok(controller.submit(query).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(FlightError::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(FlightError::DateParseError("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(FlightError::CityNotFound("Paris".into()).kind(), ErrorKind::NotFound);
        assert_eq!(FlightError::InvalidLocation("Paris".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            FlightError::UpstreamStatus { endpoint: "searchFlights".into(), status: 500 }.kind(),
            ErrorKind::Transport
        );
        assert_eq!(FlightError::NoResults.kind(), ErrorKind::NoResults);
        assert_eq!(
            FlightError::RouteUnavailable("ZERO_RESULTS".into()).kind(),
            ErrorKind::RouteUnavailable
        );
    }

    #[test]
    fn test_error_messages() {
        let err = FlightError::UpstreamStatus { endpoint: "searchAirport".into(), status: 429 };
        assert_eq!(err.to_string(), "searchAirport returned HTTP 429");
        assert_eq!(FlightError::NoResults.to_string(), "No flights found");
    }

    #[test]
    fn test_controller_from_config() {
        let config = Config::new("test-key");
        assert!(controller_from_config(&config).is_ok());
    }
}
