//! Maps the current condition text onto a decorative scene

use crate::models::CurrentConditions;

/// Wind speed above which any condition is shown as windy
const WINDY_KPH: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneCategory {
    Sunny,
    Night,
    Cloudy,
    Rain,
    Thunder,
    Snow,
    Fog,
    Wind,
}

impl SceneCategory {
    pub const ALL: [Self; 8] = [
        Self::Sunny,
        Self::Night,
        Self::Cloudy,
        Self::Rain,
        Self::Thunder,
        Self::Snow,
        Self::Fog,
        Self::Wind,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Night => "night",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Thunder => "thunder",
            Self::Snow => "snow",
            Self::Fog => "fog",
            Self::Wind => "wind",
        }
    }
}

/// Keyword sets in priority order; the first set with a hit wins.
const KEYWORDS: [(SceneCategory, &[&str]); 4] = [
    (SceneCategory::Thunder, &["thunder", "storm"]),
    (SceneCategory::Rain, &["rain", "shower", "drizzle"]),
    (SceneCategory::Snow, &["snow", "sleet", "blizzard", "flurr"]),
    (SceneCategory::Fog, &["mist", "fog", "haze", "smoke", "dust"]),
];

const WIND_WORDS: &[&str] = &["wind", "breeze", "gust"];
const CLOUD_WORDS: &[&str] = &["cloud", "overcast", "partly"];

fn time_of_day(is_daytime: bool) -> SceneCategory {
    if is_daytime {
        SceneCategory::Sunny
    } else {
        SceneCategory::Night
    }
}

/// Classify a condition string.
///
/// Matching is case-insensitive and by substring. "Clear"/"Sunny" and any
/// unrecognised text both resolve to the time-of-day default.
pub fn classify(condition_text: &str, is_daytime: bool, wind_kph: f64) -> SceneCategory {
    let text = condition_text.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if let Some((category, _)) = KEYWORDS.iter().find(|(_, words)| has_any(words)) {
        return *category;
    }
    if has_any(WIND_WORDS) || wind_kph > WINDY_KPH {
        return SceneCategory::Wind;
    }
    if has_any(CLOUD_WORDS) {
        return SceneCategory::Cloudy;
    }
    time_of_day(is_daytime)
}

pub fn classify_current(current: &CurrentConditions) -> SceneCategory {
    classify(
        current.condition_text().unwrap_or_default(),
        current.is_daytime(),
        current.wind_kph.unwrap_or(0.0),
    )
}
