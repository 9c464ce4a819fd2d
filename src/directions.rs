//! Driving directions through the Google Directions API.

use crate::config::Config;
use crate::models::{RouteResult, TravelMode};
use crate::FlightError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Computes a route between two place names.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn compute_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<RouteResult, FlightError>;
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    overview_polyline: Option<EncodedPolyline>,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    #[serde(default)]
    start_address: String,
    #[serde(default)]
    end_address: String,
    #[serde(default)]
    distance: Option<TextValue>,
    #[serde(default)]
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
    value: u64,
}

pub struct GoogleDirectionsClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleDirectionsClient {
    pub fn new(config: &Config) -> Result<Self, FlightError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.maps_base_url.trim_end_matches('/').to_string(),
            api_key: config.google_maps_api_key.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl RouteProvider for GoogleDirectionsClient {
    #[instrument(level = "info", skip(self))]
    async fn compute_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<RouteResult, FlightError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Google Maps API key not configured, skipping directions");
            return Err(FlightError::RouteUnavailable(
                "Google Maps API is not configured".to_string(),
            ));
        };

        let url = format!("{}/directions/json", self.base_url);
        let start_time = std::time::Instant::now();
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("mode", mode.as_str()),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| FlightError::RouteUnavailable(e.to_string()))?;

        let status = response.status();
        info!(
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "Directions request completed"
        );
        if !status.is_success() {
            return Err(FlightError::RouteUnavailable(format!("HTTP {}", status)));
        }

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| FlightError::RouteUnavailable(e.to_string()))?;
        route_from(body)
    }
}

fn route_from(response: DirectionsResponse) -> Result<RouteResult, FlightError> {
    if response.status != "OK" {
        warn!(
            status = %response.status,
            error_message = response.error_message.as_deref(),
            "Could not calculate directions"
        );
        return Err(FlightError::RouteUnavailable(response.status));
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Err(FlightError::RouteUnavailable("no routes returned".to_string()));
    };
    debug!(legs = route.legs.len(), summary = %route.summary, "Route received");

    let first_leg = route.legs.first();
    let last_leg = route.legs.last();
    let (distance_text, distance_meters) = sum_text_values(route.legs.iter().map(|l| l.distance.as_ref()));
    let (duration_text, duration_seconds) = sum_text_values(route.legs.iter().map(|l| l.duration.as_ref()));

    Ok(RouteResult {
        summary: route.summary.clone(),
        start_address: first_leg.map(|l| l.start_address.clone()).unwrap_or_default(),
        end_address: last_leg.map(|l| l.end_address.clone()).unwrap_or_default(),
        distance_text,
        distance_meters,
        duration_text,
        duration_seconds,
        polyline: route.overview_polyline.map(|p| p.points).unwrap_or_default(),
    })
}

// A driving route without waypoints has exactly one leg, whose text is kept.
fn sum_text_values<'a>(values: impl Iterator<Item = Option<&'a TextValue>>) -> (String, u64) {
    let values: Vec<&TextValue> = values.flatten().collect();
    let total = values.iter().map(|v| v.value).sum();
    let text = match values.as_slice() {
        [single] => single.text.clone(),
        _ => String::new(),
    };
    (text, total)
}
