// Types persisted by the credential store
pub mod common;

mod broker;
mod config;
mod credential;
mod error;
mod gatekeeper;

// Fakes for the external collaborators, shared with downstream crates' tests
pub mod testing;

pub use broker::{
    AuthMessage, AuthPayload, AuthorizationPort, AuthorizationStatus, AuthorizationSurface,
    BrowserSurface, OAuthBroker, MAX_AUTHORIZATION_ATTEMPTS,
};
pub use common::{Cookie, TokenResponse};
pub use config::Settings;
pub use credential::{
    CookieStorage, CredentialStore, FileCookieStorage, MemoryCookieStorage, CREDENTIAL_TTL,
    OAUTH_TOKEN_COOKIE,
};
pub use error::AuthError;
pub use gatekeeper::{Gatekeeper, TokenExchange};
