//! Forecast report rendering
//!
//! Turns a committed snapshot into the views printed by the CLI.

use application::{
    CurrentConditions, DayForecast, HourlyForecast, Suggestion, forecast_transformer,
    life_index_suggestions,
};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use domain::{DomainError, Language, Snapshot};
use serde::Serialize;

/// Which part of the forecast to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum View {
    /// Every view below
    #[default]
    All,
    /// Current conditions
    Current,
    /// Hourly forecast with the precipitation summary
    Hourly,
    /// Daily forecast
    Daily,
    /// Life index suggestions
    Lifeindex,
}

impl View {
    fn includes(self, part: Self) -> bool {
        self == Self::All || self == part
    }
}

/// Serializable forecast report
#[derive(Debug, Serialize)]
pub struct ForecastReport {
    pub location_key: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentConditions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlyForecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<Vec<DayForecast>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifeindex: Option<Vec<Suggestion>>,
}

/// Build the requested views of a snapshot
pub fn build_report(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    language: Language,
    view: View,
) -> Result<ForecastReport, DomainError> {
    let current = if view.includes(View::Current) {
        Some(forecast_transformer::current_conditions(snapshot, language)?)
    } else {
        None
    };
    let hourly = if view.includes(View::Hourly) {
        Some(forecast_transformer::hourly_forecast(snapshot, now, language)?)
    } else {
        None
    };
    let daily = if view.includes(View::Daily) {
        Some(forecast_transformer::daily_forecast(snapshot, language)?)
    } else {
        None
    };
    let lifeindex = view
        .includes(View::Lifeindex)
        .then(|| life_index_suggestions(snapshot));

    Ok(ForecastReport {
        location_key: snapshot.location_key.clone(),
        available: forecast_transformer::is_available(snapshot, now),
        current,
        hourly,
        daily,
        lifeindex,
    })
}

/// One line summary used by `watch`
pub fn summary_line(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    language: Language,
) -> Result<String, DomainError> {
    let current = forecast_transformer::current_conditions(snapshot, language)?;
    let hourly = forecast_transformer::hourly_forecast(snapshot, now, language)?;
    let place = current
        .city
        .unwrap_or_else(|| snapshot.location_key.clone());
    Ok(format!(
        "{place} {} {:.1}° {}",
        current.localized_condition, current.temperature, hourly.summary
    ))
}
