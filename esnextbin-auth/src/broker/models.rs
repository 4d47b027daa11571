use serde::{Deserialize, Serialize};

/// Data posted by the authorization page once the provider redirects back to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    #[serde(rename = "githubAuthCode", default)]
    pub github_auth_code: Option<String>,
}

/// A cross-context notification together with the origin of its sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthMessage {
    pub origin: String,
    pub data: AuthPayload,
}

impl AuthMessage {
    pub fn new(origin: impl Into<String>, data: AuthPayload) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }

    pub fn with_code(origin: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(
            origin,
            AuthPayload {
                github_auth_code: Some(code.into()),
            },
        )
    }

    /// The authorization code, if the message carries a non-empty one
    pub fn code(&self) -> Option<&str> {
        self.data
            .github_auth_code
            .as_deref()
            .filter(|code| !code.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Idle,
    Pending,
    Resolved,
    Failed,
}
