/// User agent string for HTTP requests
pub const USER_AGENT: &str = "weather-dashboard/0.1.0";

/// WeatherAPI base URL
pub const WEATHER_API_BASE: &str = "https://api.weatherapi.com/v1";

/// Location fetched when the dashboard starts
pub const DEFAULT_QUERY: &str = "London";

/// Locations offered by the "random location" action
pub const SAMPLE_LOCATIONS: [&str; 8] = [
    "London",
    "New York",
    "Tokyo",
    "Mumbai",
    "Reykjavik",
    "Cairo",
    "Paris",
    "Sydney",
];

/// Maximum number of characters of an error body kept in a transport error
pub const ERROR_BODY_LIMIT: usize = 200;

/// Placeholder rendered for any missing value
pub const PLACEHOLDER: &str = "--";

/// Glyph shown when the scene has no illustration
pub const FALLBACK_GLYPH: &str = "--";
