//! Map view: fixed-centre dark map with an optional route overlay, rendered
//! as a Google Static Maps request.

use crate::models::RouteResult;
use crate::FlightError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Eiffel Tower.
pub const DEFAULT_CENTER: LatLng = LatLng { lat: 48.8584, lng: 2.2945 };
pub const DEFAULT_ZOOM: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Styler {
    Color(String),
    Visibility(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStyle {
    pub feature_type: Option<String>,
    pub element_type: Option<String>,
    pub stylers: Vec<Styler>,
}

impl MapStyle {
    fn new(feature_type: Option<&str>, element_type: &str, styler: Styler) -> Self {
        Self {
            feature_type: feature_type.map(str::to_string),
            element_type: Some(element_type.to_string()),
            stylers: vec![styler],
        }
    }

    /// `feature:road|element:geometry|color:0x2c3e50`
    pub fn to_static_param(&self) -> String {
        let mut parts = Vec::new();
        if let Some(feature) = &self.feature_type {
            parts.push(format!("feature:{}", feature));
        }
        if let Some(element) = &self.element_type {
            parts.push(format!("element:{}", element));
        }
        for styler in &self.stylers {
            match styler {
                Styler::Color(hex) => parts.push(format!("color:0x{}", hex.trim_start_matches('#'))),
                Styler::Visibility(v) => parts.push(format!("visibility:{}", v)),
            }
        }
        parts.join("|")
    }
}

/// The dark colour scheme used by the search view.
pub fn dark_styles() -> Vec<MapStyle> {
    let color = |hex: &str| Styler::Color(hex.to_string());
    vec![
        MapStyle::new(None, "geometry", color("#212121")),
        MapStyle::new(None, "labels.icon", Styler::Visibility("off".to_string())),
        MapStyle::new(None, "labels.text.fill", color("#757575")),
        MapStyle::new(None, "labels.text.stroke", color("#212121")),
        MapStyle::new(Some("administrative"), "geometry.fill", color("#757575")),
        MapStyle::new(Some("poi"), "geometry", color("#2c3e50")),
        MapStyle::new(Some("road"), "geometry", color("#2c3e50")),
        MapStyle::new(Some("water"), "geometry", color("#1a1a1a")),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
    pub styles: Vec<MapStyle>,
    pub disable_default_ui: bool,
    pub zoom_control: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            styles: dark_styles(),
            disable_default_ui: true,
            zoom_control: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub options: MapOptions,
    pub overlay: Option<RouteResult>,
}

impl MapView {
    pub fn new(options: MapOptions) -> Self {
        Self { options, overlay: None }
    }

    pub fn set_route(&mut self, route: Option<RouteResult>) {
        self.overlay = route;
    }

    /// Static Maps URL for this view. The route overlay is drawn as an
    /// encoded path with start and end markers.
    pub fn static_map_url(
        &self,
        base_url: &str,
        api_key: &str,
        width: u32,
        height: u32,
    ) -> Result<Url, FlightError> {
        let mut params: Vec<(String, String)> = vec![
            (
                "center".to_string(),
                format!("{},{}", self.options.center.lat, self.options.center.lng),
            ),
            ("zoom".to_string(), self.options.zoom.to_string()),
            ("size".to_string(), format!("{}x{}", width, height)),
        ];
        params.extend(
            self.options
                .styles
                .iter()
                .map(|style| ("style".to_string(), style.to_static_param())),
        );

        if let Some(route) = &self.overlay {
            if !route.polyline.is_empty() {
                params.push((
                    "path".to_string(),
                    format!("color:0x1D72B8ff|weight:4|enc:{}", route.polyline),
                ));
            }
            if !route.start_address.is_empty() {
                params.push(("markers".to_string(), format!("label:A|{}", route.start_address)));
            }
            if !route.end_address.is_empty() {
                params.push(("markers".to_string(), format!("label:B|{}", route.end_address)));
            }
        }
        params.push(("key".to_string(), api_key.to_string()));

        let endpoint = format!("{}/staticmap", base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, &params)
            .map_err(|e| FlightError::Config(format!("Invalid maps base URL {}: {}", base_url, e)))
    }
}
