use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

// ============================================================================
// WeatherAPI forecast.json Models
// ============================================================================

/// Raw response; top-level sections are checked by `ForecastDocument::from_json`
#[derive(Debug, Deserialize)]
pub struct ForecastEnvelope {
    pub location: Option<Location>,
    pub current: Option<CurrentConditions>,
    pub forecast: Option<ForecastSection>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastSection {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

/// A validated forecast response
#[derive(Debug, Clone)]
pub struct ForecastDocument {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast_days: Vec<ForecastDay>,
}

impl ForecastDocument {
    /// Parse a response body, requiring `location`, `current` and `forecast`
    pub fn from_json(body: &str) -> Result<Self, DashboardError> {
        let envelope: ForecastEnvelope =
            serde_json::from_str(body).map_err(|e| DashboardError::parse(e.to_string()))?;

        let location = envelope
            .location
            .ok_or_else(|| DashboardError::parse("missing `location`"))?;
        let current = envelope
            .current
            .ok_or_else(|| DashboardError::parse("missing `current`"))?;
        let forecast = envelope
            .forecast
            .ok_or_else(|| DashboardError::parse("missing `forecast`"))?;

        Ok(Self {
            location,
            current,
            forecast_days: forecast.forecastday,
        })
    }

    /// Every hourly sample across all forecast days, in order
    pub fn hours(&self) -> impl Iterator<Item = &HourSample> {
        self.forecast_days.iter().flat_map(|day| day.hour.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: String,
    /// Local time as reported, e.g. `2025-08-17 9:05`
    #[serde(default)]
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub last_updated: Option<String>,
    pub temp_c: Option<f64>,
    pub temp_f: Option<f64>,
    pub feelslike_c: Option<f64>,
    pub feelslike_f: Option<f64>,
    pub is_day: Option<u8>,
    pub condition: Option<Condition>,
    pub humidity: Option<f64>,
    pub wind_kph: Option<f64>,
    pub wind_dir: Option<String>,
    pub vis_km: Option<f64>,
    pub pressure_mb: Option<f64>,
    pub uv: Option<f64>,
    pub air_quality: Option<AirQualitySample>,
}

impl CurrentConditions {
    pub fn condition_text(&self) -> Option<&str> {
        self.condition.as_ref().and_then(|c| c.text.as_deref())
    }

    /// Missing flag counts as daytime
    pub fn is_daytime(&self) -> bool {
        self.is_day != Some(0)
    }
}

/// Pollutant concentrations in µg/m³ plus the US EPA index
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AirQualitySample {
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    #[serde(rename = "us-epa-index")]
    pub us_epa_index: Option<u8>,
}

impl AirQualitySample {
    pub fn is_empty(&self) -> bool {
        Pollutant::ALL.iter().all(|p| p.reading(self).is_none()) && self.us_epa_index.is_none()
    }
}

/// Pollutants charted from hourly samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    O3,
    So2,
    Co,
}

impl Pollutant {
    pub const ALL: [Self; 6] = [
        Self::Pm25,
        Self::Pm10,
        Self::No2,
        Self::O3,
        Self::So2,
        Self::Co,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pm25 => "PM2.5",
            Self::Pm10 => "PM10",
            Self::No2 => "NO2",
            Self::O3 => "O3",
            Self::So2 => "SO2",
            Self::Co => "CO",
        }
    }

    pub fn reading(self, sample: &AirQualitySample) -> Option<f64> {
        match self {
            Self::Pm25 => sample.pm2_5,
            Self::Pm10 => sample.pm10,
            Self::No2 => sample.no2,
            Self::O3 => sample.o3,
            Self::So2 => sample.so2,
            Self::Co => sample.co,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastDay {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub day: Option<DayMetrics>,
    #[serde(default)]
    pub hour: Vec<HourSample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DayMetrics {
    pub avgtemp_c: Option<f64>,
    pub avgtemp_f: Option<f64>,
    pub condition: Option<Condition>,
    pub totalprecip_mm: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HourSample {
    /// e.g. `2025-08-17 14:00`
    pub time: Option<String>,
    pub temp_c: Option<f64>,
    pub temp_f: Option<f64>,
    pub air_quality: Option<AirQualitySample>,
}

// ============================================================================
// Display Models
// ============================================================================

/// Temperature unit selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    /// Pick the reading matching this unit
    pub fn pick(self, celsius: Option<f64>, fahrenheit: Option<f64>) -> Option<f64> {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => fahrenheit,
        }
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SearchRequest {
    /// City name, postcode or "lat,lon"
    pub query: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct LocateRequest {
    /// Latitude reported by the device; omit to use the configured position
    pub latitude: Option<f64>,
    /// Longitude reported by the device
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SelectDayRequest {
    /// Forecast day index, 0 = today
    pub index: usize,
}
