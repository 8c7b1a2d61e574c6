//! Forecast day cards and hourly chart datasets

use chrono::{NaiveDate, NaiveDateTime};

use crate::constants::PLACEHOLDER;
use crate::error::DashboardError;
use crate::metrics::{format_temperature, round1};
use crate::models::{ForecastDay, ForecastDocument, HourSample, Pollutant, Unit};

/// Hours shown by the rolling window
pub const ROLLING_HOURS: usize = 24;

/// Fewer qualifying hours than this and the rolling window falls back to the head of the data
pub const MIN_ROLLING_HOURS: usize = 8;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCard {
    pub label: String,
    pub temperature: String,
    pub condition: String,
    pub precipitation: String,
}

/// Parse WeatherAPI local timestamps such as `2025-08-17 9:05`
pub fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT).ok()
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

pub fn build_day_cards(days: &[ForecastDay], unit: Unit) -> Vec<DayCard> {
    days.iter()
        .enumerate()
        .map(|(index, day)| {
            let label = if index == 0 {
                "Today".to_string()
            } else {
                parse_date(day.date.as_deref())
                    .map_or_else(|| PLACEHOLDER.to_string(), |d| d.format("%a").to_string())
            };
            let metrics = day.day.as_ref();
            let average = metrics.and_then(|m| unit.pick(m.avgtemp_c, m.avgtemp_f));
            let condition = metrics
                .and_then(|m| m.condition.as_ref())
                .and_then(|c| c.text.clone())
                .unwrap_or_else(|| "—".to_string());
            let precipitation = metrics
                .and_then(|m| m.totalprecip_mm)
                .map_or_else(|| PLACEHOLDER.to_string(), |mm| mm.to_string());

            DayCard {
                label,
                temperature: format_temperature(average, unit),
                condition,
                precipitation: format!("{precipitation} mm"),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollutantSeries {
    pub pollutant: Pollutant,
    /// One decimal place; `None` where the reading is missing or non-positive
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    pub title: String,
    pub unit: Unit,
    pub labels: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub pollutants: Vec<PollutantSeries>,
}

/// Hours at or after the document's local time, capped at 24.
///
/// With fewer than 8 qualifying hours the first 24 hours of the whole
/// forecast are used instead.
pub fn rolling_window(document: &ForecastDocument) -> Vec<&HourSample> {
    let now = document
        .location
        .localtime
        .as_deref()
        .and_then(parse_local_time);

    let upcoming: Vec<&HourSample> = match now {
        Some(now) => document
            .hours()
            .filter(|hour| {
                hour.time
                    .as_deref()
                    .and_then(parse_local_time)
                    .is_some_and(|t| t >= now)
            })
            .take(ROLLING_HOURS)
            .collect(),
        None => Vec::new(),
    };

    if upcoming.len() < MIN_ROLLING_HOURS {
        return document.hours().take(ROLLING_HOURS).collect();
    }
    upcoming
}

fn hour_label(hour: &HourSample) -> String {
    match hour.time.as_deref() {
        Some(raw) => parse_local_time(raw)
            .map_or_else(|| raw.to_string(), |t| t.format("%H:%M").to_string()),
        None => PLACEHOLDER.to_string(),
    }
}

fn pollutant_series(hours: &[&HourSample]) -> Vec<PollutantSeries> {
    Pollutant::ALL
        .iter()
        .filter_map(|&pollutant| {
            let values: Vec<Option<f64>> = hours
                .iter()
                .map(|h| {
                    h.air_quality
                        .as_ref()
                        .and_then(|aq| pollutant.reading(aq))
                        .filter(|v| *v > 0.0)
                        .map(round1)
                })
                .collect();
            values
                .iter()
                .any(Option::is_some)
                .then_some(PollutantSeries { pollutant, values })
        })
        .collect()
}

/// Chart data for the rolling window, or for one forecast day when selected.
///
/// A selected day outside the forecast yields empty series.
pub fn build_hourly_series(
    document: &ForecastDocument,
    selected_day: Option<usize>,
    unit: Unit,
) -> HourlySeries {
    let (title, hours): (String, Vec<&HourSample>) = match selected_day {
        None => ("Next 24 hours".to_string(), rolling_window(document)),
        Some(index) => match document.forecast_days.get(index) {
            Some(day) => (
                parse_date(day.date.as_deref()).map_or_else(
                    || PLACEHOLDER.to_string(),
                    |d| d.format("%a, %b %-d").to_string(),
                ),
                day.hour.iter().collect(),
            ),
            None => (PLACEHOLDER.to_string(), Vec::new()),
        },
    };

    HourlySeries {
        title,
        unit,
        labels: hours.iter().map(|h| hour_label(h)).collect(),
        temperature: hours.iter().map(|h| unit.pick(h.temp_c, h.temp_f)).collect(),
        pollutants: pollutant_series(&hours),
    }
}

// ============================================================================
// Chart surfaces
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Temperature,
    Pollutants,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub color: &'static str,
    pub values: Vec<Option<f64>>,
}

/// Everything a chart surface needs to draw one line chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub y_axis: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

fn pollutant_color(pollutant: Pollutant) -> &'static str {
    match pollutant {
        Pollutant::Pm25 => "#ff7a7a",
        Pollutant::Pm10 => "#67c7ff",
        Pollutant::No2 => "#ffd66b",
        Pollutant::O3 => "#7ee67a",
        Pollutant::So2 => "#c86bff",
        Pollutant::Co => "#b0b0b0",
    }
}

impl HourlySeries {
    pub fn temperature_chart(&self) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Temperature,
            title: self.title.clone(),
            y_axis: format!("°{}", self.unit.symbol()),
            labels: self.labels.clone(),
            datasets: vec![Dataset {
                label: "Temp".to_string(),
                color: "rgba(110,193,228,0.95)",
                values: self.temperature.clone(),
            }],
        }
    }

    pub fn pollutant_chart(&self) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Pollutants,
            title: self.title.clone(),
            y_axis: "µg/m³".to_string(),
            labels: self.labels.clone(),
            datasets: self
                .pollutants
                .iter()
                .map(|series| Dataset {
                    label: series.pollutant.label().to_string(),
                    color: pollutant_color(series.pollutant),
                    values: series.values.clone(),
                })
                .collect(),
        }
    }
}

/// A drawing surface for one chart
pub trait ChartSurface: Send + Sync {
    fn draw(&self, chart: &ChartSpec) -> Result<(), DashboardError>;

    fn clear(&self);

    /// Release the chart; the next `draw` starts from scratch
    fn destroy(&self);
}
