//! Data model shared by the clients, the view-model and the front-ends.

use crate::format::{format_date, format_duration};
use crate::FlightError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user typed into the search form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin_city: String,
    pub destination_city: String,
    pub date: String,               // YYYY-MM-DD
    pub return_date: Option<String>, // YYYY-MM-DD
}

impl SearchQuery {
    pub fn new(origin_city: &str, destination_city: &str, date: &str) -> Self {
        Self {
            origin_city: origin_city.to_string(),
            destination_city: destination_city.to_string(),
            date: date.to_string(),
            return_date: None,
        }
    }

    pub fn with_return_date(mut self, return_date: &str) -> Self {
        self.return_date = Some(return_date.to_string());
        self
    }

    /// Check the required fields before any network call is made.
    pub fn validate(&self) -> Result<(), FlightError> {
        if self.origin_city.trim().is_empty()
            || self.destination_city.trim().is_empty()
            || self.date.trim().is_empty()
        {
            return Err(FlightError::Validation(
                "Please provide origin city, destination city, and travel date.".to_string(),
            ));
        }

        parse_date(&self.date)?;
        if let Some(return_date) = self.normalized_return_date() {
            parse_date(return_date)?;
        }
        Ok(())
    }

    /// Return date with blank input treated as absent.
    pub fn normalized_return_date(&self) -> Option<&str> {
        self.return_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, FlightError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| FlightError::DateParseError(format!("expected YYYY-MM-DD, got {}", date)))
}

/// Airport-search record as returned by `searchAirport`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportRecord {
    #[serde(default)]
    pub sky_id: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub presentation: Option<Presentation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub suggestion_title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// Resolved identifier pair for a city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    /// Empty when the upstream record carried no `skyId`.
    pub sky_id: String,
    pub entity_id: String,
    pub display_name: String,
}

impl LocationRef {
    pub fn new(sky_id: &str, entity_id: &str, display_name: &str) -> Self {
        Self {
            sky_id: sky_id.to_string(),
            entity_id: entity_id.to_string(),
            display_name: display_name.to_string(),
        }
    }

    pub fn has_sky_id(&self) -> bool {
        !self.sky_id.trim().is_empty()
    }
}

impl From<AirportRecord> for LocationRef {
    fn from(record: AirportRecord) -> Self {
        let display_name = record
            .presentation
            .and_then(|p| p.title.or(p.suggestion_title))
            .unwrap_or_default();
        Self {
            sky_id: record.sky_id.unwrap_or_default(),
            entity_id: record.entity_id.unwrap_or_default(),
            display_name,
        }
    }
}

/// One itinerary from `searchFlights`. Every field is optional upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub raw: Option<f64>,
    #[serde(default)]
    pub formatted: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    #[serde(default)]
    pub departure: Option<String>,
    #[serde(default)]
    pub arrival: Option<String>,
    #[serde(default)]
    pub origin: Option<Place>,
    #[serde(default)]
    pub destination: Option<Place>,
    #[serde(default)]
    pub duration_in_minutes: Option<i64>,
    #[serde(default)]
    pub stop_count: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_code: Option<String>,
}

pub const DESTINATION_FALLBACK: &str = "Destination Not Available";
pub const NOT_AVAILABLE: &str = "N/A";

/// Display-ready fields derived from an [`Itinerary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryRow {
    pub destination: String,
    pub departure_date: String,
    pub arrival_date: String,
    pub price: String,
    pub duration: String,
}

impl From<&Itinerary> for ItineraryRow {
    fn from(itinerary: &Itinerary) -> Self {
        let first = itinerary.legs.first();
        let last = itinerary.legs.last();

        let departure = first.and_then(|leg| leg.departure.as_deref());
        let arrival = last.and_then(|leg| leg.arrival.as_deref());

        Self {
            destination: first
                .and_then(|leg| leg.destination.as_ref())
                .and_then(|place| place.name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DESTINATION_FALLBACK.to_string()),
            departure_date: format_date(departure),
            arrival_date: format_date(arrival),
            price: itinerary
                .price
                .as_ref()
                .and_then(|p| p.formatted.clone())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            duration: format_duration(departure, arrival),
        }
    }
}

/// Driving directions between two places, reduced to what the views use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub summary: String,
    pub start_address: String,
    pub end_address: String,
    pub distance_text: String,
    pub distance_meters: u64,
    pub duration_text: String,
    pub duration_seconds: u64,
    /// Encoded overview polyline.
    pub polyline: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            "bicycling" | "cycling" => Ok(TravelMode::Bicycling),
            "transit" => Ok(TravelMode::Transit),
            _ => Err(FlightError::Validation(format!("Invalid travel mode: {}", s))),
        }
    }
}
