use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

use crate::common::TokenResponse;
use crate::error::AuthError;

/// Converts an OAuth code into a bearer token
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self, code: &str) -> Result<SecretString, AuthError>;
}

/// Client for the gatekeeper service, which holds the OAuth client secret
pub struct Gatekeeper {
    http_client: Client,
    endpoint: Url,
}

impl Gatekeeper {
    pub fn new(endpoint: Url) -> Result<Self, AuthError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }
}

#[async_trait]
impl TokenExchange for Gatekeeper {
    async fn exchange(&self, code: &str) -> Result<SecretString, AuthError> {
        if code.trim().is_empty() {
            return Err(AuthError::MissingCode);
        }

        let resp = self
            .http_client
            .get(self.endpoint.clone())
            .query(&[("code", code)])
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await?;

        token_from_response(resp)
    }
}

fn token_from_response(resp: TokenResponse) -> Result<SecretString, AuthError> {
    match resp {
        TokenResponse {
            token: Some(token), ..
        } if !token.is_empty() => {
            tracing::debug!("Gatekeeper exchanged code for token");
            Ok(SecretString::from(token))
        }
        TokenResponse {
            error: Some(error), ..
        } => Err(AuthError::AuthorizationFailed(format!(
            "Gatekeeper rejected code: {}",
            error
        ))),
        _ => Err(AuthError::AuthorizationFailed(
            "Gatekeeper response carried no token".to_string(),
        )),
    }
}
