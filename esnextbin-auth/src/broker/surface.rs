use url::Url;

use crate::error::AuthError;

/// Something that can show the provider's authorization page to the user
pub trait AuthorizationSurface: Send + Sync {
    fn open(&self, url: &Url) -> Result<(), AuthError>;
}

/// Opens the authorization page in the system browser
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSurface;

impl AuthorizationSurface for BrowserSurface {
    fn open(&self, url: &Url) -> Result<(), AuthError> {
        open::that(url.as_str()).map_err(|e| AuthError::Surface(e.to_string()))
    }
}
