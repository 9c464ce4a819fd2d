//! Runtime configuration for the API clients.
//!
//! Values come from the process environment, with a `.env` file in the
//! working directory honoured through `dotenv`.

use crate::FlightError;
use std::fmt;
use tracing::debug;

pub const DEFAULT_RAPIDAPI_HOST: &str = "sky-scrapper.p.rapidapi.com";
pub const DEFAULT_FLIGHTS_BASE_URL: &str = "https://sky-scrapper.p.rapidapi.com/api/v1/flights";
pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct Config {
    pub rapidapi_key: String,
    pub rapidapi_host: String,
    pub flights_base_url: String,
    pub locale: String,
    pub google_maps_api_key: Option<String>,
    pub maps_base_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Config with every optional value at its default.
    pub fn new(rapidapi_key: impl Into<String>) -> Self {
        Self {
            rapidapi_key: rapidapi_key.into(),
            rapidapi_host: DEFAULT_RAPIDAPI_HOST.to_string(),
            flights_base_url: DEFAULT_FLIGHTS_BASE_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            google_maps_api_key: None,
            maps_base_url: DEFAULT_MAPS_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read the configuration from the environment.
    ///
    /// `RAPIDAPI_KEY` is required. `RAPIDAPI_HOST`, `SKY_SCRAPPER_BASE_URL`,
    /// `SEARCH_LOCALE`, `GOOGLE_MAPS_API_KEY`, `GOOGLE_MAPS_BASE_URL` and
    /// `HTTP_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self, FlightError> {
        let rapidapi_key = dotenv::var("RAPIDAPI_KEY")
            .map_err(|_| FlightError::Config("RAPIDAPI_KEY not set".to_string()))?;
        Self::from_lookup(rapidapi_key, |name| dotenv::var(name).ok())
    }

    fn from_lookup<F>(rapidapi_key: String, lookup: F) -> Result<Self, FlightError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if rapidapi_key.trim().is_empty() {
            return Err(FlightError::Config("RAPIDAPI_KEY is empty".to_string()));
        }

        let mut config = Self::new(rapidapi_key);
        if let Some(host) = lookup("RAPIDAPI_HOST") {
            config.rapidapi_host = host;
        }
        if let Some(url) = lookup("SKY_SCRAPPER_BASE_URL") {
            config.flights_base_url = url;
        }
        if let Some(locale) = lookup("SEARCH_LOCALE") {
            config.locale = locale;
        }
        config.google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(url) = lookup("GOOGLE_MAPS_BASE_URL") {
            config.maps_base_url = url;
        }
        if let Some(raw) = lookup("HTTP_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                FlightError::Config(format!("HTTP_TIMEOUT_SECS must be a whole number, got {}", raw))
            })?;
        }

        debug!(
            rapidapi_host = %config.rapidapi_host,
            locale = %config.locale,
            maps_enabled = config.google_maps_api_key.is_some(),
            timeout_secs = config.timeout_secs,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn with_google_maps_key(mut self, key: impl Into<String>) -> Self {
        self.google_maps_api_key = Some(key.into());
        self
    }

    pub fn with_flights_base_url(mut self, url: impl Into<String>) -> Self {
        self.flights_base_url = url.into();
        self
    }

    pub fn with_maps_base_url(mut self, url: impl Into<String>) -> Self {
        self.maps_base_url = url.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

const REDACTED: &str = "<redacted>";

// API keys never reach logs or panic messages.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rapidapi_key", &REDACTED)
            .field("rapidapi_host", &self.rapidapi_host)
            .field("flights_base_url", &self.flights_base_url)
            .field("locale", &self.locale)
            .field("google_maps_api_key", &self.google_maps_api_key.as_ref().map(|_| REDACTED))
            .field("maps_base_url", &self.maps_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
