use esnextbin_auth::{CredentialStore, OAuthBroker};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

use crate::endpoints::{Endpoint, GistIdentity};
use crate::error::{ErrorResponse, GistApiError};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::BASE_URL;

/// Authorization rounds a single call may trigger before giving up
pub const MAX_AUTHORIZATION_ROUNDS: u32 = 1;

enum Dispatch {
    Done(Value),
    Unauthorized(String),
}

/// Gist API client that authorizes on demand.
///
/// A call without a stored token, or one rejected with 401, runs the OAuth
/// flow once and is then retried. Anything else is returned as is.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    transport: Arc<dyn Transport>,
    broker: Arc<OAuthBroker>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>, broker: Arc<OAuthBroker>) -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            transport,
            broker,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.broker.credentials()
    }

    pub fn broker(&self) -> &OAuthBroker {
        &self.broker
    }

    pub async fn send<E>(&self, endpoint: E) -> Result<E::Response, GistApiError>
    where
        E: Endpoint,
    {
        let body = endpoint.body()?;
        let value = self.call(E::METHOD, endpoint.identity(), body).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn call(
        &self,
        method: Method,
        identity: Option<&GistIdentity>,
        body: Option<Value>,
    ) -> Result<Value, GistApiError> {
        let url = self.resource_url(identity)?;
        let mut rounds = 0;

        loop {
            let rejection = match self.credentials().load() {
                None => "no stored access token".to_string(),
                Some(token) => match self.dispatch(&method, &url, &token, body.as_ref()).await? {
                    Dispatch::Done(value) => return Ok(value),
                    Dispatch::Unauthorized(message) => message,
                },
            };

            if rounds >= MAX_AUTHORIZATION_ROUNDS {
                tracing::warn!("{} {} still unauthorized: {}", method, url.path(), rejection);
                return Err(GistApiError::Unauthorized(rejection));
            }
            rounds += 1;

            tracing::info!("Authorization required ({}), starting OAuth flow", rejection);
            self.broker.authorize().await?;
        }
    }

    pub fn resource_url(&self, identity: Option<&GistIdentity>) -> Result<Url, GistApiError> {
        let mut url = Url::parse(&self.base_url)?;

        if let Some(identity) = identity {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty().push(identity.id.as_str());
            if let Some(sha) = &identity.sha {
                segments.push(sha);
            }
        }

        Ok(url)
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &Url,
        token: &SecretString,
        body: Option<&Value>,
    ) -> Result<Dispatch, GistApiError> {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("access_token", token.expose_secret());

        tracing::debug!("{} {}", method, url.path());
        let response = self
            .transport
            .execute(HttpRequest {
                method: method.clone(),
                url,
                body: body.cloned(),
            })
            .await?;

        classify(response)
    }
}

fn classify(response: HttpResponse) -> Result<Dispatch, GistApiError> {
    let status = response.status;
    if status.is_success() {
        return Ok(Dispatch::Done(decode_body(&response.body)?));
    }

    let message = ErrorResponse::describe(status, &response.body);
    match status {
        StatusCode::UNAUTHORIZED => Ok(Dispatch::Unauthorized(message)),
        StatusCode::NOT_FOUND => Err(GistApiError::NotFound(message)),
        status => Err(GistApiError::Api { status, message }),
    }
}

/// Empty and `null` bodies decode to an empty object
fn decode_body(body: &str) -> Result<Value, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_str(body)? {
        Value::Null => Ok(Value::Object(Map::new())),
        value => Ok(value),
    }
}
