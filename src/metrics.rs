//! Current conditions and air quality projected into display strings

use chrono::{DateTime, Local};

use crate::constants::PLACEHOLDER;
use crate::models::{AirQualitySample, CurrentConditions, ForecastDocument, Location, Unit};

/// Text for every metric on the current-conditions panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFields {
    pub place: String,
    pub local_time: String,
    /// When the dashboard last applied a forecast, in the viewer's clock
    pub updated: String,
    pub temperature: String,
    pub condition: String,
    pub last_updated: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub visibility: String,
    pub pressure: String,
    pub uv: String,
    pub air_quality: AirQualityPanel,
}

/// A coloured AQI label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pill {
    pub text: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirQualityPanel {
    pub summary: String,
    pub pills: Vec<Pill>,
    /// Colour key; empty when there is no data
    pub legend: Vec<Pill>,
}

const NO_DATA_COLOR: &str = "rgba(255,255,255,0.04)";

/// US EPA index labels and colours, index 1 first
const EPA_BANDS: [(&str, &str); 6] = [
    ("Good", "#7ee67a"),
    ("Moderate", "#ffd66b"),
    ("Unhealthy for Sensitive Groups", "#ffb37a"),
    ("Unhealthy", "#ff7a7a"),
    ("Very Unhealthy", "#c86bff"),
    ("Hazardous", "#8b3a3a"),
];

/// Swatches explaining the pill colours
const AQI_LEGEND: [(&str, &str); 3] = [
    ("Good", "#7ee67a"),
    ("Moderate", "#ffdf7a"),
    ("Unhealthy", "#ffb37a"),
];

fn legend() -> Vec<Pill> {
    AQI_LEGEND
        .iter()
        .map(|&(text, color)| Pill {
            text: text.to_string(),
            color,
        })
        .collect()
}

/// Rough PM concentration bands in µg/m³
pub fn color_for_pm(value: f64) -> &'static str {
    if value <= 12.0 {
        "#7ee67a"
    } else if value <= 35.4 {
        "#ffd66b"
    } else if value <= 55.4 {
        "#ff9b6b"
    } else if value <= 150.4 {
        "#ff7a7a"
    } else {
        "#c86bff"
    }
}

/// Label and colour for an EPA index, `None` outside 1..=6
pub fn epa_band(index: u8) -> Option<(&'static str, &'static str)> {
    let slot = usize::from(index).checked_sub(1)?;
    EPA_BANDS.get(slot).copied()
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn or_placeholder<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// `12°C`, or `--°C` when missing
pub fn format_temperature(value: Option<f64>, unit: Unit) -> String {
    // `+ 0.0` turns a rounded -0 into 0
    let number = value.map_or_else(
        || PLACEHOLDER.to_string(),
        |v| format!("{}", v.round() + 0.0),
    );
    format!("{number}°{}", unit.symbol())
}

pub fn format_place(location: &Location) -> String {
    match location.region.as_deref().filter(|r| !r.is_empty()) {
        Some(region) => format!("{}, {region}, {}", location.name, location.country),
        None => format!("{}, {}", location.name, location.country),
    }
}

pub fn project_air_quality(sample: Option<&AirQualitySample>) -> AirQualityPanel {
    let Some(sample) = sample.filter(|s| !s.is_empty()) else {
        return AirQualityPanel {
            summary: format!("AQI: {PLACEHOLDER}"),
            pills: vec![Pill {
                text: "No AQI data".to_string(),
                color: NO_DATA_COLOR,
            }],
            legend: Vec::new(),
        };
    };

    let mut pills = Vec::new();
    if let Some(pm25) = sample.pm2_5.map(round1) {
        pills.push(Pill {
            text: format!("PM2.5: {pm25} µg/m³"),
            color: color_for_pm(pm25),
        });
    }
    if let Some(pm10) = sample.pm10.map(round1) {
        pills.push(Pill {
            text: format!("PM10: {pm10} µg/m³"),
            color: color_for_pm(pm10),
        });
    }

    let overall = sample.us_epa_index.and_then(epa_band);
    if let Some((label, color)) = overall {
        pills.push(Pill {
            text: format!("AQI: {label}"),
            color,
        });
    }

    AirQualityPanel {
        summary: format!("AQI: {}", overall.map_or("—", |(label, _)| label)),
        pills,
        legend: legend(),
    }
}

/// `Updated: 2025-08-17 09:05:12`, or `Updated: --` before any fetch
pub fn format_updated(fetched_at: Option<DateTime<Local>>) -> String {
    let stamp = fetched_at.map_or_else(
        || PLACEHOLDER.to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    format!("Updated: {stamp}")
}

pub fn project_current(
    location: &Location,
    current: &CurrentConditions,
    unit: Unit,
) -> DisplayFields {
    let wind = match (current.wind_kph, current.wind_dir.as_deref()) {
        (Some(kph), Some(dir)) => format!("{kph} kph ({dir})"),
        (Some(kph), None) => format!("{kph} kph"),
        (None, _) => format!("{PLACEHOLDER} kph"),
    };

    DisplayFields {
        place: format_place(location),
        local_time: format!(
            "Local Time: {}",
            location.localtime.as_deref().unwrap_or(PLACEHOLDER)
        ),
        updated: format_updated(None),
        temperature: format_temperature(unit.pick(current.temp_c, current.temp_f), unit),
        condition: current.condition_text().unwrap_or("—").to_string(),
        last_updated: format!(
            "Last: {}",
            current.last_updated.as_deref().unwrap_or(PLACEHOLDER)
        ),
        feels_like: format!(
            "Feels: {}",
            format_temperature(unit.pick(current.feelslike_c, current.feelslike_f), unit)
        ),
        humidity: format!(
            "Humidity: {}%",
            or_placeholder(current.humidity.map(|h| h.round()))
        ),
        wind,
        visibility: format!("{} km", or_placeholder(current.vis_km)),
        pressure: format!("{} mb", or_placeholder(current.pressure_mb)),
        uv: or_placeholder(current.uv),
        air_quality: project_air_quality(current.air_quality.as_ref()),
    }
}

/// Project the whole current-conditions panel of a document applied at `fetched_at`
pub fn project(
    document: &ForecastDocument,
    unit: Unit,
    fetched_at: Option<DateTime<Local>>,
) -> DisplayFields {
    DisplayFields {
        updated: format_updated(fetched_at),
        ..project_current(&document.location, &document.current, unit)
    }
}
