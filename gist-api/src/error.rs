use esnextbin_auth::AuthError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GistApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Still rejected after one round of re-authorization
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("({status}) {message}")]
    Api { status: StatusCode, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GistApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GistApiError::NotFound(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GistApiError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            GistApiError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            GistApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GistApiError {
    // The request URL carries the access token, so it is dropped from the message
    fn from(err: reqwest::Error) -> Self {
        GistApiError::Transport(err.without_url().to_string())
    }
}

/// Error body returned by the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub documentation_url: Option<String>,
}

impl ErrorResponse {
    /// Best description of a failed response: the API message, the raw body,
    /// or the status reason, in that order
    pub fn describe(status: StatusCode, body: &str) -> String {
        if let Ok(response) = serde_json::from_str::<ErrorResponse>(body) {
            return response.message;
        }
        let body = body.trim();
        if !body.is_empty() {
            return body.to_string();
        }
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    }
}
