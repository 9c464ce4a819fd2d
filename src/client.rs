//! HTTP client for the Sky-Scrapper flight search API

use crate::config::Config;
use crate::models::{AirportRecord, Itinerary, LocationRef};
use crate::FlightError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Parameters of one itinerary search, taken from two resolved locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryQuery {
    pub origin_sky_id: String,
    pub destination_sky_id: String,
    pub origin_entity_id: String,
    pub destination_entity_id: String,
    pub date: String,
    pub return_date: Option<String>,
}

impl ItineraryQuery {
    pub fn between(
        origin: &LocationRef,
        destination: &LocationRef,
        date: &str,
        return_date: Option<&str>,
    ) -> Self {
        Self {
            origin_sky_id: origin.sky_id.clone(),
            destination_sky_id: destination.sky_id.clone(),
            origin_entity_id: origin.entity_id.clone(),
            destination_entity_id: destination.entity_id.clone(),
            date: date.to_string(),
            return_date: return_date.map(str::to_string),
        }
    }

    /// Query-string pairs; `returnDate` is only sent when present.
    pub fn to_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![
            ("originSkyId", self.origin_sky_id.as_str()),
            ("destinationSkyId", self.destination_sky_id.as_str()),
            ("originEntityId", self.origin_entity_id.as_str()),
            ("destinationEntityId", self.destination_entity_id.as_str()),
            ("date", self.date.as_str()),
        ];
        if let Some(return_date) = &self.return_date {
            params.push(("returnDate", return_date.as_str()));
        }
        params
    }
}

/// City resolution and itinerary lookup against a flight search backend.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// All locations matching a free-text city name. Never empty on success.
    async fn resolve_city(&self, city: &str) -> Result<Vec<LocationRef>, FlightError>;

    /// Itineraries between two resolved locations. Never empty on success.
    async fn search_itineraries(&self, query: &ItineraryQuery)
        -> Result<Vec<Itinerary>, FlightError>;
}

#[derive(Debug, Deserialize)]
struct AirportSearchResponse {
    #[serde(default)]
    data: Option<Vec<AirportRecord>>,
}

#[derive(Debug, Deserialize)]
struct FlightSearchResponse {
    #[serde(default)]
    data: Option<FlightSearchData>,
}

#[derive(Debug, Deserialize)]
struct FlightSearchData {
    #[serde(default)]
    itineraries: Option<Vec<Itinerary>>,
}

/// Sky-Scrapper client on RapidAPI
pub struct SkyScrapperClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
    locale: String,
}

impl SkyScrapperClient {
    pub fn new(config: &Config) -> Result<Self, FlightError> {
        debug!(base_url = %config.flights_base_url, "Creating Sky-Scrapper client");
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.flights_base_url.trim_end_matches('/').to_string(),
            api_key: config.rapidapi_key.clone(),
            api_host: config.rapidapi_host.clone(),
            locale: config.locale.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FlightError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        info!(url = %url, "Making HTTP request to Sky-Scrapper");

        let start_time = std::time::Instant::now();
        let response = self
            .http_client
            .get(&url)
            .query(params)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .send()
            .await?;
        let status = response.status();

        info!(
            endpoint = endpoint,
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "HTTP request completed"
        );

        if !status.is_success() {
            error!(endpoint = endpoint, status = %status, "HTTP request failed");
            return Err(FlightError::UpstreamStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(body_length = body.len(), "Received response body");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SearchGateway for SkyScrapperClient {
    #[instrument(level = "info", skip(self))]
    async fn resolve_city(&self, city: &str) -> Result<Vec<LocationRef>, FlightError> {
        let response: AirportSearchResponse = self
            .get_json("searchAirport", &[("query", city), ("locale", self.locale.as_str())])
            .await?;

        let locations = locations_from(response, city)?;
        info!(city = city, matches = locations.len(), "City resolved");
        Ok(locations)
    }

    #[instrument(level = "info", skip(self, query), fields(origin = %query.origin_sky_id, destination = %query.destination_sky_id))]
    async fn search_itineraries(
        &self,
        query: &ItineraryQuery,
    ) -> Result<Vec<Itinerary>, FlightError> {
        let response: FlightSearchResponse =
            self.get_json("searchFlights", &query.to_params()).await?;

        let itineraries = itineraries_from(response)?;
        info!(itineraries_found = itineraries.len(), "Itinerary search completed");
        Ok(itineraries)
    }
}

fn locations_from(
    response: AirportSearchResponse,
    city: &str,
) -> Result<Vec<LocationRef>, FlightError> {
    match response.data {
        Some(records) if !records.is_empty() => {
            Ok(records.into_iter().map(LocationRef::from).collect())
        }
        _ => {
            warn!(city = city, "No airport data found for city");
            Err(FlightError::CityNotFound(city.to_string()))
        }
    }
}

fn itineraries_from(response: FlightSearchResponse) -> Result<Vec<Itinerary>, FlightError> {
    match response.data.and_then(|d| d.itineraries) {
        Some(itineraries) if !itineraries.is_empty() => Ok(itineraries),
        _ => {
            warn!("No flights found");
            Err(FlightError::NoResults)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SkyScrapperClient::new(&Config::new("key").with_flights_base_url("http://localhost/api/"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "http://localhost/api");
    }

    #[test]
    fn test_query_params_skip_missing_return_date() {
        let origin = LocationRef::new("LOND", "27544008", "London");
        let destination = LocationRef::new("NYCA", "27537542", "New York");

        let query = ItineraryQuery::between(&origin, &destination, "2025-08-15", None);
        let params = query.to_params();
        assert_eq!(params.len(), 5);
        assert!(params.contains(&("originSkyId", "LOND")));
        assert!(params.contains(&("destinationEntityId", "27537542")));
        assert!(!params.iter().any(|(k, _)| *k == "returnDate"));

        let query = ItineraryQuery::between(&origin, &destination, "2025-08-15", Some("2025-08-22"));
        assert!(query.to_params().contains(&("returnDate", "2025-08-22")));
    }

    #[test]
    fn test_parse_airport_response() {
        let json = r#"{"status": true, "data": [
            {"skyId": "PARI", "entityId": "27539733", "presentation": {"title": "Paris"}},
            {"skyId": "CDG", "entityId": "95565041", "presentation": {"title": "Paris Charles de Gaulle"}}
        ]}"#;
        let response: AirportSearchResponse = serde_json::from_str(json).unwrap();
        let locations = locations_from(response, "Paris").unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].sky_id, "PARI");
    }

    #[test]
    fn test_empty_airport_response_is_not_found() {
        for json in [r#"{"status": true, "data": []}"#, r#"{"status": false}"#] {
            let response: AirportSearchResponse = serde_json::from_str(json).unwrap();
            let err = locations_from(response, "Atlantis").unwrap_err();
            assert!(matches!(err, FlightError::CityNotFound(ref c) if c == "Atlantis"));
        }
    }

    #[test]
    fn test_parse_flight_response() {
        let json = r#"{"status": true, "data": {"itineraries": [
            {"id": "a", "price": {"raw": 99.0, "formatted": "$99"}, "legs": []},
            {"id": "b", "price": {"raw": 120.5, "formatted": "$121"}, "legs": []}
        ]}}"#;
        let response: FlightSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(itineraries_from(response).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_flight_response_is_no_results() {
        for json in [
            r#"{"status": true, "data": {"itineraries": []}}"#,
            r#"{"status": true, "data": {}}"#,
            r#"{"status": false, "message": "Something went wrong"}"#,
        ] {
            let response: FlightSearchResponse = serde_json::from_str(json).unwrap();
            assert!(matches!(itineraries_from(response), Err(FlightError::NoResults)));
        }
    }

    #[tokio::test]
    async fn test_resolve_city_request_wiring() {
        let body = r#"{"status": true, "data": [{"skyId": "NYCA", "entityId": "27537542", "presentation": {"title": "New York"}}]}"#;
        let (base_url, server) = crate::test_server::serve_once("200 OK", body).await;
        let client = SkyScrapperClient::new(&Config::new("secret").with_flights_base_url(base_url)).unwrap();

        let locations = client.resolve_city("New York").await.unwrap();
        assert_eq!(locations, vec![LocationRef::new("NYCA", "27537542", "New York")]);

        let request = server.await.unwrap();
        assert_eq!(
            crate::test_server::request_line(&request),
            "GET /searchAirport?query=New+York&locale=en-US HTTP/1.1"
        );
        let headers = request.to_lowercase();
        assert!(headers.contains("x-rapidapi-key: secret"));
        assert!(headers.contains("x-rapidapi-host: sky-scrapper.p.rapidapi.com"));
    }

    #[tokio::test]
    async fn test_rate_limited_resolve_is_upstream_status() {
        let (base_url, server) =
            crate::test_server::serve_once("429 Too Many Requests", r#"{"message": "slow down"}"#).await;
        let client = SkyScrapperClient::new(&Config::new("secret").with_flights_base_url(base_url)).unwrap();

        let err = client.resolve_city("Paris").await.unwrap_err();
        assert!(matches!(
            err,
            FlightError::UpstreamStatus { ref endpoint, status: 429 } if endpoint == "searchAirport"
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_on_itinerary_search() {
        let (base_url, server) =
            crate::test_server::serve_once("500 Internal Server Error", "{}").await;
        let client = SkyScrapperClient::new(&Config::new("secret").with_flights_base_url(base_url)).unwrap();
        let query = ItineraryQuery::between(
            &LocationRef::new("LOND", "27544008", "London"),
            &LocationRef::new("PARI", "27539733", "Paris"),
            "2025-08-15",
            Some("2025-08-22"),
        );

        let err = client.search_itineraries(&query).await.unwrap_err();
        assert!(matches!(
            err,
            FlightError::UpstreamStatus { ref endpoint, status: 500 } if endpoint == "searchFlights"
        ));
        assert_eq!(err.kind(), crate::ErrorKind::Transport);

        let request = server.await.unwrap();
        assert_eq!(
            crate::test_server::request_line(&request),
            "GET /searchFlights?originSkyId=LOND&destinationSkyId=PARI&originEntityId=27544008&destinationEntityId=27539733&date=2025-08-15&returnDate=2025-08-22 HTTP/1.1"
        );
    }
}
