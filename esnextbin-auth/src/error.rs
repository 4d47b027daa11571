use std::time::Duration;
use thiserror::Error;

/// Failures of the authorization flow.
///
/// Cloneable so a single outcome can be delivered to every caller waiting on
/// the same pending authorization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Too many tries to open {url} ({attempts} attempts)")]
    TooManyAttempts { attempts: u32, url: String },

    #[error("Impossible to get access token, code is not present")]
    MissingCode,

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Authorization timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Authorization was cancelled")]
    Cancelled,

    #[error("Failed to open authorization page: {0}")]
    Surface(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cookie storage error: {0}")]
    Storage(String),
}

impl From<config::ConfigError> for AuthError {
    fn from(err: config::ConfigError) -> Self {
        AuthError::Configuration(err.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    // The gatekeeper URL carries the OAuth code
    fn from(err: reqwest::Error) -> Self {
        AuthError::AuthorizationFailed(err.without_url().to_string())
    }
}

impl From<url::ParseError> for AuthError {
    fn from(err: url::ParseError) -> Self {
        AuthError::Configuration(format!("Invalid URL: {}", err))
    }
}
