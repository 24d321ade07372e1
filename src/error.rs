//! Error types and handling for the `FlightWx` engine

use thiserror::Error;

/// Main error type for the `FlightWx` engine.
///
/// Every variant here is fatal for a decision run and is raised before any
/// weather fetch starts. Per-station fetch failures live in
/// [`crate::weather::FetchError`] and never surface through this type.
#[derive(Error, Debug)]
pub enum FlightWxError {
    /// Malformed coordinates, windows or configuration values
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration could not be read or deserialized
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Station catalog could not be read or parsed
    #[error("Station catalog error: {message}")]
    Catalog { message: String },

    /// Recorded weather fixture could not be read or parsed
    #[error("Weather fixture error: {message}")]
    Fixture { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl FlightWxError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a new fixture error
    pub fn fixture<S: Into<String>>(message: S) -> Self {
        Self::Fixture {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FlightWxError::Validation { message } => format!("Invalid input: {message}"),
            FlightWxError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            FlightWxError::Catalog { .. } => {
                "Unable to load the station catalog. Please check the catalog path.".to_string()
            }
            FlightWxError::Fixture { message } => format!("Unable to load recorded weather: {message}"),
            FlightWxError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
