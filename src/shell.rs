//! Presentation shell: theme, navigation chrome, and the text rendering of
//! the search view used by the front-ends.

use crate::search::{Outcome, SearchPhase, SearchState};
use std::fmt::Write;

pub struct Theme;

impl Theme {
    pub const PRIMARY: &'static str = "#202124";
    pub const SECONDARY: &'static str = "#1D72B8";
    pub const BACKGROUND: &'static str = "#202124";
    pub const PAPER: &'static str = "#333";
}

pub const APP_TITLE: &str = "Google";

pub const NAV_LINKS: [&str; 5] = ["Travel", "Explore", "Flights", "Hotels", "Vacation rentals"];

/// Entries below the divider in the drawer.
pub const ACCOUNT_LINKS: [&str; 3] = ["Profile", "Settings", "Logout"];

/// Left navigation drawer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drawer {
    pub open: bool,
}

impl Drawer {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Selecting any entry closes the drawer.
    pub fn select(&mut self, label: &str) -> Option<&'static str> {
        let selected = NAV_LINKS
            .iter()
            .chain(ACCOUNT_LINKS.iter())
            .find(|link| **link == label)
            .copied();
        self.close();
        selected
    }

    pub fn entries(&self) -> Vec<&'static str> {
        if !self.open {
            return Vec::new();
        }
        NAV_LINKS.iter().chain(ACCOUNT_LINKS.iter()).copied().collect()
    }
}

/// App-bar popup grid, open while it has an anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppMenu {
    pub anchor: Option<String>,
}

impl AppMenu {
    pub fn open_at(&mut self, anchor: &str) {
        self.anchor = Some(anchor.to_string());
    }

    pub fn close(&mut self) {
        self.anchor = None;
    }

    pub fn is_open(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn select(&mut self, label: &str) -> Option<&'static str> {
        let selected = NAV_LINKS.iter().find(|link| **link == label).copied();
        self.close();
        selected
    }

    /// Links laid out two per row.
    pub fn grid(&self) -> Vec<Vec<&'static str>> {
        if !self.is_open() {
            return Vec::new();
        }
        NAV_LINKS.chunks(2).map(|row| row.to_vec()).collect()
    }
}

pub fn render_header() -> String {
    format!("{}  |  {}", APP_TITLE, NAV_LINKS.join("  "))
}

/// Text rendering of the search panel. Never panics, whatever the state.
pub fn render_search_view(state: &SearchState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Flight Search");

    let query = &state.query;
    if !query.origin_city.is_empty() || !query.destination_city.is_empty() {
        let _ = write!(
            out,
            "{} -> {} on {}",
            or_dash(&query.origin_city),
            or_dash(&query.destination_city),
            or_dash(&query.date)
        );
        if let Some(return_date) = query.normalized_return_date() {
            let _ = write!(out, ", returning {}", return_date);
        }
        out.push('\n');
    }

    match state.phase {
        SearchPhase::Idle | SearchPhase::Validating => {}
        SearchPhase::Resolving | SearchPhase::Fetching => {
            let _ = writeln!(out, "Searching...");
        }
        SearchPhase::Settled(Outcome::Success) => {}
        SearchPhase::Settled(Outcome::Partial) => {
            let _ = writeln!(out, "Some results could not be loaded.");
        }
        SearchPhase::Settled(Outcome::Failed) => {
            let _ = writeln!(out, "Search failed.");
        }
    }

    if let Some(error) = state.error_message() {
        let _ = writeln!(out, "Error: {}", error);
    }

    for (i, row) in state.rows.iter().enumerate() {
        let _ = writeln!(out, "\n--- Flight {} ---", i + 1);
        let _ = writeln!(out, "{}", row.destination);
        let _ = writeln!(out, "{} - {}", row.departure_date, row.arrival_date);
        let _ = writeln!(out, "Price: {}", row.price);
        let _ = writeln!(out, "Duration: {}", row.duration);
    }

    if let Some(route) = &state.route {
        let _ = writeln!(out, "\nDriving route: {}", or_dash(&route.summary));
        let _ = writeln!(
            out,
            "{} -> {} ({}, {})",
            or_dash(&route.start_address),
            or_dash(&route.end_address),
            or_dash(&route.distance_text),
            or_dash(&route.duration_text)
        );
    }

    out
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItineraryRow, RouteResult, SearchQuery};
    use crate::search::InteractionState;

    #[test]
    fn test_theme_constants() {
        assert_eq!(Theme::PRIMARY, "#202124");
        assert_eq!(Theme::SECONDARY, "#1D72B8");
        assert_eq!(Theme::PAPER, "#333");
    }

    #[test]
    fn test_drawer_open_close() {
        let mut drawer = Drawer::default();
        assert!(drawer.entries().is_empty());
        drawer.open();
        assert_eq!(drawer.entries().len(), 8);
        assert_eq!(drawer.select("Settings"), Some("Settings"));
        assert!(!drawer.open);

        drawer.open();
        assert_eq!(drawer.select("Nowhere"), None);
        assert!(!drawer.open);
    }

    #[test]
    fn test_app_menu_grid() {
        let mut menu = AppMenu::default();
        assert!(menu.grid().is_empty());
        menu.open_at("bento-menu");
        let grid = menu.grid();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec!["Travel", "Explore"]);
        assert_eq!(grid[2], vec!["Vacation rentals"]);
        assert_eq!(menu.select("Hotels"), Some("Hotels"));
        assert!(!menu.is_open());
    }

    #[test]
    fn test_render_header() {
        let header = render_header();
        assert!(header.starts_with("Google"));
        assert!(header.contains("Vacation rentals"));
    }

    #[test]
    fn test_render_any_state() {
        let empty = render_search_view(&SearchState::default());
        assert_eq!(empty, "Flight Search\n");

        let state = SearchState {
            query: SearchQuery::new("London", "", "").with_return_date(" "),
            phase: SearchPhase::Fetching,
            interaction: InteractionState { loading: true, error_message: Some("boom".into()) },
            rows: vec![ItineraryRow {
                destination: "Paris".into(),
                departure_date: "8/15/2025".into(),
                arrival_date: "8/22/2025".into(),
                price: "$120".into(),
                duration: "N/A".into(),
            }],
            route: Some(RouteResult::default()),
            ..Default::default()
        };
        let text = render_search_view(&state);
        assert!(text.contains("London -> - on -"));
        assert!(text.contains("Searching..."));
        assert!(text.contains("Error: boom"));
        assert!(text.contains("Price: $120"));
        assert!(text.contains("Driving route: -"));
    }
}
