use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use super::CookieStorage;
use crate::common::Cookie;

pub const OAUTH_TOKEN_COOKIE: &str = "oauth_token";

/// Six months, counted as 30-day months
pub const CREDENTIAL_TTL: Duration = Duration::seconds(60 * 60 * 24 * 30 * 6);

/// Holds the single bearer token on top of a cookie jar.
///
/// Storage failures never surface: a failed read is "no token" and a failed
/// write or removal is logged and dropped.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn CookieStorage>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn CookieStorage>) -> Self {
        Self { storage }
    }

    pub fn save(&self, token: &SecretString, ttl: Duration) {
        let cookie = Cookie {
            name: OAUTH_TOKEN_COOKIE.to_string(),
            value: token.expose_secret().to_string(),
            expires_at: Utc::now() + ttl,
        };
        let expires_at = cookie.expires_at;

        match self.storage.set(cookie) {
            Ok(()) => tracing::debug!("Stored OAuth token, expires_at: {}", expires_at),
            Err(e) => tracing::warn!("Failed to store OAuth token: {}", e),
        }
    }

    pub fn load(&self) -> Option<SecretString> {
        match self.storage.get(OAUTH_TOKEN_COOKIE) {
            Ok(Some(cookie)) if !cookie.is_expired_at(Utc::now()) && !cookie.value.is_empty() => {
                Some(SecretString::from(cookie.value))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Cookie storage unavailable, treating as no token: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(OAUTH_TOKEN_COOKIE) {
            tracing::warn!("Failed to remove OAuth token: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::MemoryCookieStorage;
    use crate::testing::UnavailableCookieStorage;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryCookieStorage::new()))
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn load_returns_saved_token() {
        let store = store();
        assert!(store.load().is_none());

        store.save(&secret("tok-1"), CREDENTIAL_TTL);
        assert_eq!(store.load().unwrap().expose_secret(), "tok-1");
    }

    #[test]
    fn save_overwrites_previous_token() {
        let store = store();
        store.save(&secret("tok-1"), CREDENTIAL_TTL);
        store.save(&secret("tok-2"), CREDENTIAL_TTL);

        assert_eq!(store.load().unwrap().expose_secret(), "tok-2");
    }

    #[test]
    fn expired_token_is_absent() {
        let store = store();
        store.save(&secret("tok-1"), Duration::seconds(-1));

        assert!(store.load().is_none());
    }

    #[test]
    fn clear_ignores_remaining_ttl_and_is_idempotent() {
        let store = store();
        store.save(&secret("tok-1"), CREDENTIAL_TTL);

        store.clear();
        assert!(store.load().is_none());
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn unavailable_storage_reads_as_no_token() {
        let store = CredentialStore::new(Arc::new(UnavailableCookieStorage));

        store.save(&secret("tok-1"), CREDENTIAL_TTL);
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn ttl_is_six_thirty_day_months() {
        assert_eq!(CREDENTIAL_TTL.num_days(), 180);
    }
}
