//! Search view-model.
//!
//! [`SearchController`] owns the interaction state of one search view and
//! runs a search through validation, city resolution and the concurrent
//! itinerary/route fetch. Every state change is a [`SearchEvent`] applied
//! through [`SearchState::apply`]. Each submission gets a new generation and
//! events from older generations are dropped, so the last submitted search
//! is the one that ends up displayed.

use crate::client::{ItineraryQuery, SearchGateway};
use crate::directions::RouteProvider;
use crate::map::MapView;
use crate::models::{Itinerary, ItineraryRow, LocationRef, RouteResult, SearchQuery, TravelMode};
use crate::FlightError;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// How a settled search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Itineraries and route both loaded.
    Success,
    /// Exactly one of itineraries and route loaded.
    Partial,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SearchPhase {
    #[default]
    Idle,
    Validating,
    Resolving,
    Fetching,
    Settled(Outcome),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionState {
    pub loading: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    Submitted { generation: u64, query: SearchQuery },
    ValidationFailed { generation: u64, message: String },
    Started { generation: u64 },
    ResolutionFailed { generation: u64, message: String },
    Resolved { generation: u64, origin: LocationRef, destination: LocationRef },
    ItinerariesLoaded { generation: u64, itineraries: Vec<Itinerary> },
    ItinerariesFailed { generation: u64, message: String },
    RouteLoaded { generation: u64, route: RouteResult },
    RouteFailed { generation: u64, message: String },
    Settled { generation: u64, outcome: Outcome },
}

impl SearchEvent {
    pub fn generation(&self) -> u64 {
        match self {
            SearchEvent::Submitted { generation, .. }
            | SearchEvent::ValidationFailed { generation, .. }
            | SearchEvent::Started { generation }
            | SearchEvent::ResolutionFailed { generation, .. }
            | SearchEvent::Resolved { generation, .. }
            | SearchEvent::ItinerariesLoaded { generation, .. }
            | SearchEvent::ItinerariesFailed { generation, .. }
            | SearchEvent::RouteLoaded { generation, .. }
            | SearchEvent::RouteFailed { generation, .. }
            | SearchEvent::Settled { generation, .. } => *generation,
        }
    }
}

/// Everything the search view displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    /// Generation of the most recent submission.
    pub generation: u64,
    pub query: SearchQuery,
    pub phase: SearchPhase,
    pub interaction: InteractionState,
    pub origin: Option<LocationRef>,
    pub destination: Option<LocationRef>,
    pub itineraries: Vec<Itinerary>,
    pub rows: Vec<ItineraryRow>,
    pub route: Option<RouteResult>,
}

impl SearchState {
    /// Apply one event. Returns `false` when the event belongs to a
    /// superseded search and was dropped.
    pub fn apply(&mut self, event: SearchEvent) -> bool {
        let generation = event.generation();
        let current = match &event {
            SearchEvent::Submitted { .. } => generation > self.generation,
            _ => generation == self.generation,
        };
        if !current {
            debug!(
                event_generation = generation,
                current_generation = self.generation,
                "Dropping event from superseded search"
            );
            return false;
        }

        match event {
            SearchEvent::Submitted { generation, query } => {
                self.generation = generation;
                self.query = query;
                self.phase = SearchPhase::Validating;
                self.interaction.error_message = None;
            }
            SearchEvent::ValidationFailed { message, .. } => {
                self.phase = SearchPhase::Idle;
                self.interaction.loading = false;
                self.interaction.error_message = Some(message);
            }
            SearchEvent::Started { .. } => {
                self.phase = SearchPhase::Resolving;
                self.interaction.loading = true;
                self.interaction.error_message = None;
                self.origin = None;
                self.destination = None;
                self.itineraries.clear();
                self.rows.clear();
                self.route = None;
            }
            SearchEvent::ResolutionFailed { message, .. } => {
                self.phase = SearchPhase::Settled(Outcome::Failed);
                self.interaction.loading = false;
                self.interaction.error_message = Some(message);
            }
            SearchEvent::Resolved { origin, destination, .. } => {
                self.phase = SearchPhase::Fetching;
                self.origin = Some(origin);
                self.destination = Some(destination);
            }
            SearchEvent::ItinerariesLoaded { itineraries, .. } => {
                self.rows = itineraries.iter().map(ItineraryRow::from).collect();
                self.itineraries = itineraries;
            }
            SearchEvent::ItinerariesFailed { message, .. }
            | SearchEvent::RouteFailed { message, .. } => {
                self.push_error(message);
            }
            SearchEvent::RouteLoaded { route, .. } => {
                self.route = Some(route);
            }
            SearchEvent::Settled { outcome, .. } => {
                self.phase = SearchPhase::Settled(outcome);
                self.interaction.loading = false;
            }
        }
        true
    }

    fn push_error(&mut self, message: String) {
        self.interaction.error_message = Some(match self.interaction.error_message.take() {
            Some(existing) => format!("{}; {}", existing, message),
            None => message,
        });
    }

    pub fn is_loading(&self) -> bool {
        self.interaction.loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.interaction.error_message.as_deref()
    }

    /// Map view with the current route as its overlay.
    pub fn map_view(&self) -> MapView {
        let mut view = MapView::default();
        view.set_route(self.route.clone());
        view
    }
}

/// Result of one [`SearchController::submit`] call.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub generation: u64,
    /// A later submission replaced this one before it settled.
    pub superseded: bool,
    /// Displayed state when the call returned.
    pub state: SearchState,
}

impl SearchReport {
    pub fn outcome(&self) -> Option<Outcome> {
        match (self.superseded, self.state.phase) {
            (false, SearchPhase::Settled(outcome)) => Some(outcome),
            _ => None,
        }
    }
}

pub struct SearchController<G, R> {
    gateway: G,
    routes: R,
    state: Mutex<SearchState>,
    last_generation: AtomicU64,
}

impl<G, R> SearchController<G, R>
where
    G: SearchGateway,
    R: RouteProvider,
{
    pub fn new(gateway: G, routes: R) -> Self {
        Self {
            gateway,
            routes,
            state: Mutex::new(SearchState::default()),
            last_generation: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> SearchState {
        self.state.lock().await.clone()
    }

    async fn dispatch(&self, event: SearchEvent) -> bool {
        self.state.lock().await.apply(event)
    }

    async fn report(&self, generation: u64) -> SearchReport {
        let state = self.snapshot().await;
        SearchReport {
            generation,
            superseded: state.generation != generation,
            state,
        }
    }

    /// Run one search to completion.
    #[instrument(level = "info", skip(self, query), fields(origin = %query.origin_city, destination = %query.destination_city))]
    pub async fn submit(&self, query: SearchQuery) -> SearchReport {
        let generation = self.last_generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, date = %query.date, "Search submitted");

        self.dispatch(SearchEvent::Submitted { generation, query: query.clone() }).await;

        if let Err(e) = query.validate() {
            warn!(generation, error = %e, "Search input rejected");
            self.dispatch(SearchEvent::ValidationFailed { generation, message: e.to_string() })
                .await;
            return self.report(generation).await;
        }

        self.dispatch(SearchEvent::Started { generation }).await;

        let origin_city = query.origin_city.trim();
        let destination_city = query.destination_city.trim();

        // Both lookups always run, one after the other.
        let origin = self.gateway.resolve_city(origin_city).await;
        let destination = self.gateway.resolve_city(destination_city).await;

        let (origin, destination) = match (
            first_location(origin, origin_city),
            first_location(destination, destination_city),
        ) {
            (Ok(origin), Ok(destination)) => (origin, destination),
            (Err(e), _) | (_, Err(e)) => {
                warn!(generation, error = %e, "Could not retrieve airport data");
                self.dispatch(SearchEvent::ResolutionFailed {
                    generation,
                    message: format!("Could not retrieve airport data: {}", e),
                })
                .await;
                return self.report(generation).await;
            }
        };
        debug!(
            generation,
            origin_sky_id = %origin.sky_id,
            destination_sky_id = %destination.sky_id,
            "Cities resolved"
        );

        let itinerary_query =
            ItineraryQuery::between(&origin, &destination, query.date.trim(), query.normalized_return_date());
        self.dispatch(SearchEvent::Resolved { generation, origin, destination }).await;

        let fetch_itineraries = async {
            match self.gateway.search_itineraries(&itinerary_query).await {
                Ok(itineraries) => {
                    info!(generation, itineraries_found = itineraries.len(), "Itineraries loaded");
                    self.dispatch(SearchEvent::ItinerariesLoaded { generation, itineraries }).await;
                    true
                }
                Err(e) => {
                    warn!(generation, error = %e, "Itinerary search failed");
                    self.dispatch(SearchEvent::ItinerariesFailed {
                        generation,
                        message: itinerary_message(&e),
                    })
                    .await;
                    false
                }
            }
        };
        let fetch_route = async {
            match self
                .routes
                .compute_route(origin_city, destination_city, TravelMode::Driving)
                .await
            {
                Ok(route) => {
                    info!(generation, summary = %route.summary, "Route loaded");
                    self.dispatch(SearchEvent::RouteLoaded { generation, route }).await;
                    true
                }
                Err(e) => {
                    warn!(generation, error = %e, "Route computation failed");
                    self.dispatch(SearchEvent::RouteFailed { generation, message: e.to_string() })
                        .await;
                    false
                }
            }
        };
        let (itineraries_ok, route_ok) = tokio::join!(fetch_itineraries, fetch_route);

        let outcome = match (itineraries_ok, route_ok) {
            (true, true) => Outcome::Success,
            (false, false) => Outcome::Failed,
            _ => Outcome::Partial,
        };
        if !self.dispatch(SearchEvent::Settled { generation, outcome }).await {
            info!(generation, "Search superseded before settling");
        } else {
            info!(generation, outcome = ?outcome, "Search settled");
        }
        self.report(generation).await
    }
}

fn first_location(
    result: Result<Vec<LocationRef>, FlightError>,
    city: &str,
) -> Result<LocationRef, FlightError> {
    let location = result?
        .into_iter()
        .next()
        .ok_or_else(|| FlightError::CityNotFound(city.to_string()))?;
    if !location.has_sky_id() {
        return Err(FlightError::InvalidLocation(city.to_string()));
    }
    Ok(location)
}

fn itinerary_message(error: &FlightError) -> String {
    match error {
        FlightError::NoResults => "No flights found.".to_string(),
        other => format!("Error fetching flight data: {}", other),
    }
}
