//! Error types for the PetFriends test suite
//!
//! Only transport failures, local file problems and scenario failures are
//! errors. A non-200 answer from the service is data, not an error: it is
//! returned to the caller as an [`ApiResponse`](crate::api::ApiResponse).

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PetFriends test suite
#[derive(Error, Debug)]
pub enum Error {
    // === Transport Errors ===
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed with status {status}: {body}")]
    Authentication { status: u16, body: String },

    #[error("Invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid test scenario '{name}': {reason}")]
    ScenarioParse { name: String, reason: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Test Errors ===
    #[error("Test assertion failed: {0}")]
    TestAssertion(String),

    #[error("Precondition not met: {0}")]
    Precondition(String),
}

impl Error {
    /// Create an invalid URL error
    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error for `path`
    pub fn file_read(path: &std::path::Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a scenario parse error
    pub fn scenario_parse(name: &str, reason: impl ToString) -> Self {
        Self::ScenarioParse {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
