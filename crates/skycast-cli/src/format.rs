//! Plain-text rendering of lookup results, history, and statistics.

use skycast_lookup::LookupOutcome;
use skycast_store::{HistoryRecord, Statistics};
use skycast_weather::LookupResult;

/// Render one lookup outcome.
pub fn weather(outcome: &LookupOutcome) -> String {
    let (location, weather) = match &outcome.result {
        LookupResult::Failure { reason } => return format!("Error: {reason}"),
        LookupResult::Success { location, weather } => (location, weather),
    };

    let title = match location {
        Some(loc) => match (&loc.name, &loc.country) {
            (Some(name), Some(country)) => format!("{name}, {country}"),
            (Some(name), None) => name.clone(),
            _ => format!("{}, {}", loc.latitude, loc.longitude),
        },
        None => "Unknown location".to_string(),
    };

    let mut lines = vec![title];
    lines.push(format!("Temperature: {} °C", weather.temperature));
    lines.push(format!("Windspeed: {} km/h", weather.windspeed));
    lines.push(format!("Wind direction: {}°", weather.wind_direction));
    lines.push(format!(
        "Observed: {}",
        weather.observed_at.format("%Y-%m-%d %H:%M UTC")
    ));
    lines.push(format!("Source: {}", outcome.source.as_str()));
    lines.join("\n")
}

/// Render the recent-history listing.
pub fn history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "History is empty.".to_string();
    }

    let mut lines = vec!["Recent weather requests:".to_string(), "-".repeat(60)];
    for record in records {
        let place = match (&record.city, record.latitude, record.longitude) {
            (Some(city), _, _) => city.clone(),
            (None, Some(lat), Some(lon)) => format!("{lat}, {lon}"),
            _ => "?".to_string(),
        };
        let temp = record
            .temperature
            .map(|t| format!("{t:.1}°C"))
            .unwrap_or_else(|| "—".to_string());
        let wind = record
            .windspeed
            .map(|w| format!("{w} km/h"))
            .unwrap_or_else(|| "—".to_string());
        lines.push(format!(
            "{} | {:20} | {:>7} | wind {:>9} | {}",
            record.requested_at.format("%Y-%m-%d %H:%M"),
            place,
            temp,
            wind,
            record.source.as_str()
        ));
    }
    lines.join("\n")
}

/// Render the statistics summary.
pub fn statistics(stats: &Statistics) -> String {
    let mut lines = vec![format!(
        "Requests: {}, unique locations: {}",
        stats.total_requests, stats.unique_locations
    )];
    match &stats.temperature {
        Some(temps) => lines.push(format!(
            "Temperature: average {:.1}°C, min {:.1}°C, max {:.1}°C",
            temps.average, temps.min, temps.max
        )),
        None => lines.push("Temperature: no data".to_string()),
    }
    lines.join("\n")
}
