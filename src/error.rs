//! Error types and handling for `SkiWeather`

use thiserror::Error;

/// Main error type for the `SkiWeather` library
#[derive(Error, Debug)]
pub enum SkiWeatherError {
    /// An upstream provider could not deliver usable data (network, status, timeout)
    #[error("{source_name} unavailable: {message}")]
    SourceUnavailable {
        source_name: &'static str,
        message: String,
    },

    /// A provider answered but the payload could not be interpreted
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// No station could be located for the requested coordinate
    #[error("No ground station found near ({latitude:.4}, {longitude:.4})")]
    StationNotFound { latitude: f64, longitude: f64 },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport-level HTTP errors
    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SkiWeatherError {
    /// Create a new source-unavailable error
    pub fn source_unavailable<S: Into<String>>(source_name: &'static str, message: S) -> Self {
        Self::SourceUnavailable {
            source_name,
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True when the error only means "treat this source as absent"
    #[must_use]
    pub fn is_degradable(&self) -> bool {
        !matches!(self, Self::Config { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkiWeatherError::SourceUnavailable { .. } | SkiWeatherError::Http { .. } => {
                "Weather provider unreachable. Showing whatever data is still available.".to_string()
            }
            SkiWeatherError::Parse { .. } => {
                "Weather provider returned data in an unexpected format.".to_string()
            }
            SkiWeatherError::StationNotFound { .. } => {
                "No ground station near this resort.".to_string()
            }
            SkiWeatherError::Config { message } => {
                format!("Configuration error: {message}")
            }
            SkiWeatherError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for SkiWeatherError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}
