//! Device position lookup

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DashboardError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DashboardError::geolocation(
                "latitude must be -90 to 90, longitude must be -180 to 180",
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse `"lat,lon"`
    pub fn parse(value: &str) -> Result<Self, DashboardError> {
        let (lat, lon) = value
            .split_once(',')
            .ok_or_else(|| DashboardError::geolocation(format!("not a position: {value}")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| DashboardError::geolocation(format!("{part}: {e}")))
        };
        Self::new(parse(lat)?, parse(lon)?)
    }

    /// Query string for the forecast API, four decimal places
    pub fn to_query(self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Source of the device's current position
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(&self) -> Result<Position, DashboardError>;
}

/// Reports a position fixed at startup, or that none is available
#[derive(Debug, Clone, Default)]
pub struct FixedPosition {
    position: Option<Position>,
}

impl FixedPosition {
    pub fn new(position: Option<Position>) -> Self {
        Self { position }
    }

    pub fn from_config(value: Option<&str>) -> Result<Self, DashboardError> {
        value.map(Position::parse).transpose().map(Self::new)
    }
}

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(&self) -> Result<Position, DashboardError> {
        self.position
            .ok_or(DashboardError::GeolocationUnsupported)
    }
}

/// Ask `provider` for a position, giving up after `limit`
pub async fn locate_with_timeout(
    provider: &dyn PositionProvider,
    limit: Duration,
) -> Result<Position, DashboardError> {
    tokio::time::timeout(limit, provider.current_position())
        .await
        .map_err(|_| DashboardError::geolocation("Timeout expired"))?
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverAnswers;

    #[async_trait]
    impl PositionProvider for NeverAnswers {
        async fn current_position(&self) -> Result<Position, DashboardError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_query_has_four_decimals() {
        let position = Position::new(51.507_351, -0.127_758).expect("valid position");
        assert_eq!(position.to_query(), "51.5074,-0.1278");
    }

    #[test]
    fn test_parse() {
        let position = Position::parse(" 35.6762, 139.6503 ").expect("should parse");
        assert_eq!(position.to_query(), "35.6762,139.6503");
        assert!(Position::parse("London").is_err());
        assert!(Position::parse("95,0").is_err());
    }

    #[tokio::test]
    async fn test_fixed_position_unavailable() {
        let err = FixedPosition::default().current_position().await.unwrap_err();
        assert_eq!(err, DashboardError::GeolocationUnsupported);
        assert_eq!(err.user_message(), "Geolocation not supported");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let err = locate_with_timeout(&NeverAnswers, Duration::from_secs(10))
            .await
            .unwrap_err();
        assert_eq!(err, DashboardError::geolocation("Timeout expired"));
    }
}
