mod models;
mod port;
mod surface;

pub use models::{AuthMessage, AuthPayload, AuthorizationStatus};
pub use port::AuthorizationPort;
pub use surface::{AuthorizationSurface, BrowserSurface};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use url::Url;

use crate::config::Settings;
use crate::credential::{CredentialStore, CREDENTIAL_TTL};
use crate::error::AuthError;
use crate::gatekeeper::TokenExchange;
use port::{Listener, PortEvent};

/// Authorization attempts allowed per process; the attempt that reaches this
/// count fails without opening the authorization page
pub const MAX_AUTHORIZATION_ATTEMPTS: u32 = 3;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

type Outcome = Result<(), AuthError>;

enum SessionState {
    Idle,
    Pending { waiters: Vec<oneshot::Sender<Outcome>> },
    Resolved,
    Failed,
}

struct Session {
    attempts: u32,
    state: SessionState,
}

enum Begin {
    Lead,
    Join(oneshot::Receiver<Outcome>),
}

/// Runs the popup OAuth flow and stores the resulting token.
///
/// At most one authorization is in flight. Callers that arrive while one is
/// pending wait for it and receive its outcome instead of starting another.
pub struct OAuthBroker {
    authorization_url: Url,
    app_origin: String,
    timeout: Duration,
    port: AuthorizationPort,
    surface: Arc<dyn AuthorizationSurface>,
    exchange: Arc<dyn TokenExchange>,
    credentials: CredentialStore,
    session: Mutex<Session>,
}

impl OAuthBroker {
    pub fn new(
        authorization_url: Url,
        app_origin: impl Into<String>,
        port: AuthorizationPort,
        surface: Arc<dyn AuthorizationSurface>,
        exchange: Arc<dyn TokenExchange>,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            authorization_url,
            app_origin: app_origin.into(),
            timeout: DEFAULT_TIMEOUT,
            port,
            surface,
            exchange,
            credentials,
            session: Mutex::new(Session {
                attempts: 0,
                state: SessionState::Idle,
            }),
        }
    }

    pub fn from_settings(
        settings: &Settings,
        port: AuthorizationPort,
        surface: Arc<dyn AuthorizationSurface>,
        exchange: Arc<dyn TokenExchange>,
        credentials: CredentialStore,
    ) -> Result<Self, AuthError> {
        Ok(Self::new(
            settings.authorization_url()?,
            settings.app_origin()?,
            port,
            surface,
            exchange,
            credentials,
        )
        .with_timeout(settings.authorization_timeout()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn port(&self) -> AuthorizationPort {
        self.port.clone()
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn attempts(&self) -> u32 {
        self.lock().attempts
    }

    pub fn status(&self) -> AuthorizationStatus {
        match self.lock().state {
            SessionState::Idle => AuthorizationStatus::Idle,
            SessionState::Pending { .. } => AuthorizationStatus::Pending,
            SessionState::Resolved => AuthorizationStatus::Resolved,
            SessionState::Failed => AuthorizationStatus::Failed,
        }
    }

    pub async fn authorize(&self) -> Result<(), AuthError> {
        match self.begin()? {
            Begin::Join(rx) => {
                tracing::debug!("Authorization already pending, waiting for it");
                rx.await.unwrap_or(Err(AuthError::Cancelled))
            }
            Begin::Lead => {
                let mut attempt = Attempt {
                    broker: self,
                    settled: false,
                };
                let outcome = self.run_attempt().await;
                attempt.settle(outcome.clone());
                outcome
            }
        }
    }

    fn begin(&self) -> Result<Begin, AuthError> {
        let mut session = self.lock();

        if let SessionState::Pending { waiters } = &mut session.state {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            return Ok(Begin::Join(rx));
        }

        session.attempts += 1;
        if session.attempts >= MAX_AUTHORIZATION_ATTEMPTS {
            tracing::warn!(
                "Refusing authorization attempt {} of {}",
                session.attempts,
                MAX_AUTHORIZATION_ATTEMPTS
            );
            return Err(AuthError::TooManyAttempts {
                attempts: session.attempts,
                url: self.authorization_url.to_string(),
            });
        }

        session.state = SessionState::Pending {
            waiters: Vec::new(),
        };
        Ok(Begin::Lead)
    }

    async fn run_attempt(&self) -> Outcome {
        // Register before opening so an immediate reply is not lost
        let mut listener = self.port.listen();

        tracing::info!("Opening authorization page {}", self.authorization_url);
        self.surface.open(&self.authorization_url)?;

        let code = tokio::time::timeout(self.timeout, self.wait_for_code(&mut listener))
            .await
            .map_err(|_| AuthError::Timeout(self.timeout))??;
        drop(listener);

        let token = self.exchange.exchange(&code).await?;
        self.credentials.save(&token, CREDENTIAL_TTL);

        tracing::info!("Authorization completed");
        Ok(())
    }

    async fn wait_for_code(&self, listener: &mut Listener) -> Result<String, AuthError> {
        while let Some(event) = listener.recv().await {
            match event {
                PortEvent::Closed => {
                    tracing::info!("Authorization page closed before completion");
                    return Err(AuthError::Cancelled);
                }
                PortEvent::Message(message) if message.origin != self.app_origin => {
                    tracing::warn!(
                        "Ignoring authorization message from foreign origin {}",
                        message.origin
                    );
                }
                PortEvent::Message(message) => match message.code() {
                    Some(code) => return Ok(code.to_string()),
                    None => tracing::debug!("Authorization message without code, still waiting"),
                },
            }
        }
        Err(AuthError::Cancelled)
    }

    fn finish(&self, outcome: Outcome) {
        let next = if outcome.is_ok() {
            SessionState::Resolved
        } else {
            SessionState::Failed
        };

        let previous = std::mem::replace(&mut self.lock().state, next);
        if let SessionState::Pending { waiters } = previous {
            for waiter in waiters {
                let _ = waiter.send(outcome.clone());
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Settles the pending session even if the leading future is dropped mid-flight
struct Attempt<'a> {
    broker: &'a OAuthBroker,
    settled: bool,
}

impl Attempt<'_> {
    fn settle(&mut self, outcome: Outcome) {
        self.settled = true;
        self.broker.finish(outcome);
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.broker.finish(Err(AuthError::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        RecordingSurface, StaticExchange, TestAuth, TEST_AUTHORIZE_URL, TEST_ORIGIN,
    };
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn authorize_stores_exchanged_token() {
        let auth = TestAuth::replying("code-1", "tok-1");

        auth.broker.authorize().await.unwrap();

        assert_eq!(auth.credentials.load().unwrap().expose_secret(), "tok-1");
        assert_eq!(auth.exchange.codes(), vec!["code-1".to_string()]);
        assert_eq!(auth.surface.opened().len(), 1);
        assert_eq!(
            auth.surface.opened()[0].as_str(),
            TEST_AUTHORIZE_URL
        );
        assert_eq!(auth.broker.status(), AuthorizationStatus::Resolved);
        assert!(!auth.port.is_listening());
    }

    #[tokio::test]
    async fn third_attempt_fails_without_opening_the_page() {
        let auth = TestAuth::replying("code-1", "tok-1");

        auth.broker.authorize().await.unwrap();
        auth.broker.authorize().await.unwrap();
        let err = auth.broker.authorize().await.unwrap_err();

        assert!(matches!(err, AuthError::TooManyAttempts { attempts: 3, .. }));
        assert_eq!(auth.surface.opened().len(), 2);
        assert_eq!(auth.broker.attempts(), 3);
    }

    #[tokio::test]
    async fn foreign_origin_and_codeless_messages_are_ignored() {
        let port = AuthorizationPort::new();
        let surface = Arc::new(RecordingSurface::replying(
            port.clone(),
            vec![
                AuthMessage::with_code("https://evil.example", "stolen"),
                AuthMessage::new(TEST_ORIGIN, AuthPayload::default()),
                AuthMessage::with_code(TEST_ORIGIN, ""),
                AuthMessage::with_code(TEST_ORIGIN, "genuine"),
            ],
        ));
        let auth = TestAuth::with_surface(port, surface, StaticExchange::ok("tok-1"));

        auth.broker.authorize().await.unwrap();

        assert_eq!(auth.exchange.codes(), vec!["genuine".to_string()]);
    }

    #[tokio::test]
    async fn exchange_failure_rejects_and_stores_nothing() {
        let port = AuthorizationPort::new();
        let surface = Arc::new(RecordingSurface::replying(
            port.clone(),
            vec![AuthMessage::with_code(TEST_ORIGIN, "code-1")],
        ));
        let failure = AuthError::AuthorizationFailed("gatekeeper down".to_string());
        let auth = TestAuth::with_surface(port, surface, StaticExchange::failing(failure.clone()));

        assert_eq!(auth.broker.authorize().await.unwrap_err(), failure);
        assert!(auth.credentials.load().is_none());
        assert_eq!(auth.broker.status(), AuthorizationStatus::Failed);
    }

    #[tokio::test]
    async fn closed_page_cancels_the_attempt() {
        let port = AuthorizationPort::new();
        let surface = Arc::new(RecordingSurface::closing(port.clone()));
        let auth = TestAuth::with_surface(port, surface, StaticExchange::ok("tok-1"));

        assert_eq!(auth.broker.authorize().await.unwrap_err(), AuthError::Cancelled);
        assert_eq!(auth.exchange.codes().len(), 0);
        assert!(!auth.port.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_page_times_out() {
        let port = AuthorizationPort::new();
        let surface = Arc::new(RecordingSurface::silent());
        let auth = TestAuth::with_surface(port, surface, StaticExchange::ok("tok-1"));

        let err = auth.broker.authorize().await.unwrap_err();

        assert_eq!(err, AuthError::Timeout(DEFAULT_TIMEOUT));
        assert_eq!(auth.broker.status(), AuthorizationStatus::Failed);
    }

    #[tokio::test]
    async fn surface_failure_fails_the_attempt() {
        let port = AuthorizationPort::new();
        let surface = Arc::new(RecordingSurface::failing());
        let auth = TestAuth::with_surface(port, surface, StaticExchange::ok("tok-1"));

        assert!(matches!(
            auth.broker.authorize().await,
            Err(AuthError::Surface(_))
        ));
        assert!(!auth.port.is_listening());
    }

    #[tokio::test]
    async fn concurrent_requests_join_the_pending_attempt() {
        let auth = TestAuth::replying("code-1", "tok-1");

        let (first, second) = tokio::join!(auth.broker.authorize(), auth.broker.authorize());

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(auth.surface.opened().len(), 1);
        assert_eq!(auth.exchange.codes().len(), 1);
        assert_eq!(auth.broker.attempts(), 1);
    }

    #[tokio::test]
    async fn joined_waiters_share_the_failure() {
        let port = AuthorizationPort::new();
        let surface = Arc::new(RecordingSurface::replying(
            port.clone(),
            vec![AuthMessage::with_code(TEST_ORIGIN, "code-1")],
        ));
        let failure = AuthError::AuthorizationFailed("bad_code".to_string());
        let auth = TestAuth::with_surface(port, surface, StaticExchange::failing(failure.clone()));

        let (first, second) = tokio::join!(auth.broker.authorize(), auth.broker.authorize());

        assert_eq!(first.unwrap_err(), failure);
        assert_eq!(second.unwrap_err(), failure);
    }

    #[tokio::test]
    async fn dropped_attempt_releases_waiters() {
        let port = AuthorizationPort::new();
        let surface = Arc::new(RecordingSurface::silent());
        let auth = TestAuth::with_surface(port, surface, StaticExchange::ok("tok-1"));

        let mut leader = Box::pin(auth.broker.authorize());
        let mut follower = Box::pin(auth.broker.authorize());

        // Drive the leader until it waits on the page, then queue the follower
        assert!(poll_once(leader.as_mut()).await.is_none());
        assert_eq!(auth.broker.status(), AuthorizationStatus::Pending);
        assert!(poll_once(follower.as_mut()).await.is_none());

        drop(leader);
        assert_eq!(follower.await.unwrap_err(), AuthError::Cancelled);

        assert_eq!(auth.broker.status(), AuthorizationStatus::Failed);
        assert!(!auth.port.is_listening());
    }

    async fn poll_once<F: std::future::Future + Unpin>(mut fut: F) -> Option<F::Output> {
        use std::pin::Pin;
        use std::task::Poll;

        std::future::poll_fn(|cx| {
            Poll::Ready(match Pin::new(&mut fut).poll(cx) {
                Poll::Ready(out) => Some(out),
                Poll::Pending => None,
            })
        })
        .await
    }
}
