//! Test doubles for the authorization collaborators.
//!
//! `TestAuth` wires a broker to an in-memory cookie jar, a surface that
//! answers like the real authorization page and a gatekeeper that always
//! hands out the same token.

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::broker::{AuthMessage, AuthorizationPort, AuthorizationSurface, OAuthBroker};
use crate::common::Cookie;
use crate::credential::{CookieStorage, CredentialStore, MemoryCookieStorage};
use crate::error::AuthError;
use crate::gatekeeper::TokenExchange;

pub const TEST_ORIGIN: &str = "http://esnextb.in";
pub const TEST_AUTHORIZE_URL: &str =
    "https://github.com/login/oauth/authorize?client_id=test-client&scope=gist";

enum SurfaceBehavior {
    Silent,
    Reply(Vec<AuthMessage>),
    Close,
    Fail,
}

/// Records every page it is asked to open and reacts as configured
pub struct RecordingSurface {
    port: Option<AuthorizationPort>,
    behavior: SurfaceBehavior,
    opened: Mutex<Vec<Url>>,
}

impl RecordingSurface {
    /// Never answers, like a popup the user ignores
    pub fn silent() -> Self {
        Self::build(None, SurfaceBehavior::Silent)
    }

    /// Posts `messages` to `port` each time the page is opened
    pub fn replying(port: AuthorizationPort, messages: Vec<AuthMessage>) -> Self {
        Self::build(Some(port), SurfaceBehavior::Reply(messages))
    }

    /// Reports the page as closed right after opening it
    pub fn closing(port: AuthorizationPort) -> Self {
        Self::build(Some(port), SurfaceBehavior::Close)
    }

    pub fn failing() -> Self {
        Self::build(None, SurfaceBehavior::Fail)
    }

    fn build(port: Option<AuthorizationPort>, behavior: SurfaceBehavior) -> Self {
        Self {
            port,
            behavior,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AuthorizationSurface for RecordingSurface {
    fn open(&self, url: &Url) -> Result<(), AuthError> {
        if let SurfaceBehavior::Fail = self.behavior {
            return Err(AuthError::Surface("no display".to_string()));
        }

        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.clone());

        match (&self.behavior, &self.port) {
            (SurfaceBehavior::Reply(messages), Some(port)) => {
                for message in messages {
                    port.post(message.clone());
                }
            }
            (SurfaceBehavior::Close, Some(port)) => {
                port.close();
            }
            _ => {}
        }
        Ok(())
    }
}

/// Token exchange with a fixed answer; records the codes it receives
pub struct StaticExchange {
    outcome: Result<String, AuthError>,
    codes: Mutex<Vec<String>>,
}

impl StaticExchange {
    pub fn ok(token: impl Into<String>) -> Self {
        Self {
            outcome: Ok(token.into()),
            codes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self {
            outcome: Err(error),
            codes: Mutex::new(Vec::new()),
        }
    }

    pub fn codes(&self) -> Vec<String> {
        self.codes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl TokenExchange for StaticExchange {
    async fn exchange(&self, code: &str) -> Result<SecretString, AuthError> {
        if code.is_empty() {
            return Err(AuthError::MissingCode);
        }
        self.codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(code.to_string());

        // Behave like a network call and give other tasks a turn
        tokio::task::yield_now().await;

        self.outcome.clone().map(SecretString::from)
    }
}

/// Cookie storage whose medium is never available
pub struct UnavailableCookieStorage;

impl CookieStorage for UnavailableCookieStorage {
    fn get(&self, _name: &str) -> Result<Option<Cookie>, AuthError> {
        Err(AuthError::Storage("cookies disabled".to_string()))
    }

    fn set(&self, _cookie: Cookie) -> Result<(), AuthError> {
        Err(AuthError::Storage("cookies disabled".to_string()))
    }

    fn remove(&self, _name: &str) -> Result<(), AuthError> {
        Err(AuthError::Storage("cookies disabled".to_string()))
    }
}

/// A broker wired to fakes, with handles to inspect each of them
pub struct TestAuth {
    pub broker: Arc<OAuthBroker>,
    pub credentials: CredentialStore,
    pub port: AuthorizationPort,
    pub surface: Arc<RecordingSurface>,
    pub exchange: Arc<StaticExchange>,
}

impl TestAuth {
    /// Every authorization succeeds: the page answers with `code` and the
    /// gatekeeper turns it into `token`
    pub fn replying(code: &str, token: &str) -> Self {
        let port = AuthorizationPort::new();
        let surface = Arc::new(RecordingSurface::replying(
            port.clone(),
            vec![AuthMessage::with_code(TEST_ORIGIN, code)],
        ));
        Self::with_surface(port, surface, StaticExchange::ok(token))
    }

    pub fn with_surface(
        port: AuthorizationPort,
        surface: Arc<RecordingSurface>,
        exchange: StaticExchange,
    ) -> Self {
        let credentials = CredentialStore::new(Arc::new(MemoryCookieStorage::new()));
        let exchange = Arc::new(exchange);
        let authorization_url = Url::parse(TEST_AUTHORIZE_URL).expect("valid test URL");

        let broker = Arc::new(OAuthBroker::new(
            authorization_url,
            TEST_ORIGIN,
            port.clone(),
            surface.clone(),
            exchange.clone(),
            credentials.clone(),
        ));

        Self {
            broker,
            credentials,
            port,
            surface,
            exchange,
        }
    }
}
