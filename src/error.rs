//! Error types for the dashboard

use thiserror::Error;

/// Every failure the dashboard can report to the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Input rejected before any network call
    #[error("{message}")]
    Validation { message: String },

    /// Non-success HTTP status or a failed round trip
    #[error("API error {} - {message}", status_label(.status))]
    Transport { status: Option<u16>, message: String },

    /// Body is not JSON or lacks required top-level fields
    #[error("Invalid forecast response: {message}")]
    Parse { message: String },

    /// Position denied or timed out
    #[error("Unable to get location: {message}")]
    Geolocation { message: String },

    /// No position provider at all
    #[error("Geolocation not supported")]
    GeolocationUnsupported,

    /// A chart or icon could not be initialised
    #[error("Render failed: {message}")]
    Render { message: String },

    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "(no response)".to_string(), |code| code.to_string())
}

impl DashboardError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transport<S: Into<String>>(status: Option<u16>, message: S) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn geolocation<S: Into<String>>(message: S) -> Self {
        Self::Geolocation {
            message: message.into(),
        }
    }

    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The single status line shown to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::Geolocation { .. } | Self::GeolocationUnsupported => self.to_string(),
            other => format!("Error: {other}"),
        }
    }
}
