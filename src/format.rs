//! Display formatting for itinerary timestamps.

use crate::models::NOT_AVAILABLE;
use chrono::{DateTime, NaiveDateTime};

/// Parse an upstream timestamp. Sky-Scrapper sends zone-less local times
/// (`2024-02-20T12:35:00`); RFC 3339 values are normalised to UTC.
///
/// A zone-less value carries no offset and is read as if it were UTC, so
/// durations are only meaningful when both ends use the same form.
/// Sky-Scrapper legs are always zone-less.
pub fn parse_timestamp(ts: &str) -> Option<NaiveDateTime> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Elapsed time between two timestamps as `1d 3h 30m`, or `N/A`.
///
/// The day part is left out when it is zero. Missing or unparseable
/// timestamps, and an arrival before the departure, give `N/A`.
pub fn format_duration(departure: Option<&str>, arrival: Option<&str>) -> String {
    let (Some(departure), Some(arrival)) = (
        departure.and_then(parse_timestamp),
        arrival.and_then(parse_timestamp),
    ) else {
        return NOT_AVAILABLE.to_string();
    };

    let elapsed = arrival - departure;
    if elapsed < chrono::Duration::zero() {
        return NOT_AVAILABLE.to_string();
    }
    let total_minutes = elapsed.num_minutes();

    let days = total_minutes / (24 * 60);
    let hours = (total_minutes % (24 * 60)) / 60;
    let minutes = total_minutes % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

/// Short en-US date (`1/2/2024`), or `N/A`.
pub fn format_date(ts: Option<&str>) -> String {
    ts.and_then(parse_timestamp)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_over_a_day() {
        assert_eq!(
            format_duration(Some("2024-01-01T10:00:00Z"), Some("2024-01-02T13:30:00Z")),
            "1d 3h 30m"
        );
    }

    #[test]
    fn test_duration_zero() {
        assert_eq!(
            format_duration(Some("2024-01-01T10:00:00Z"), Some("2024-01-01T10:00:00Z")),
            "0h 0m"
        );
    }

    #[test]
    fn test_duration_missing() {
        assert_eq!(format_duration(None, Some("2024-01-01T10:00:00Z")), "N/A");
        assert_eq!(format_duration(Some("2024-01-01T10:00:00Z"), None), "N/A");
        assert_eq!(format_duration(None, None), "N/A");
    }

    #[test]
    fn test_duration_unparseable_or_negative() {
        assert_eq!(format_duration(Some("yesterday"), Some("2024-01-01T10:00:00Z")), "N/A");
        assert_eq!(
            format_duration(Some("2024-01-02T10:00:00Z"), Some("2024-01-01T10:00:00Z")),
            "N/A"
        );
    }

    #[test]
    fn test_duration_arrival_seconds_before_departure() {
        assert_eq!(
            format_duration(Some("2024-01-01T10:00:30"), Some("2024-01-01T10:00:00")),
            "N/A"
        );
        assert_eq!(
            format_duration(Some("2024-01-01T10:00:00"), Some("2024-01-01T10:00:45")),
            "0h 0m"
        );
    }

    #[test]
    fn test_duration_zone_less_and_offsets() {
        assert_eq!(
            format_duration(Some("2024-02-20T12:35:00"), Some("2024-02-20T15:50:00")),
            "3h 15m"
        );
        // zone-less is read as UTC: 05:00 UTC to 10:00
        assert_eq!(
            format_duration(Some("2024-01-01T10:00:00+05:00"), Some("2024-01-01T10:00:00")),
            "5h 0m"
        );
        // 10:00 UTC to 13:00+02:00 (11:00 UTC)
        assert_eq!(
            format_duration(Some("2024-01-01T10:00:00Z"), Some("2024-01-01T13:00:00+02:00")),
            "1h 0m"
        );
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-01-02T13:30:00Z")), "1/2/2024");
        assert_eq!(format_date(Some("2024-11-25T08:00:00")), "11/25/2024");
        assert_eq!(format_date(Some("not a date")), "N/A");
        assert_eq!(format_date(None), "N/A");
    }
}
