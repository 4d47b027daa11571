use esnextbin_auth::{
    AuthError, AuthorizationPort, BrowserSurface, CredentialStore, FileCookieStorage, Gatekeeper,
    OAuthBroker, Settings,
};
use gist_api::{Client, GistApiError, ReqwestTransport, Request};
use std::sync::Arc;

// Reuses the token left in the cookie jar by `esnextbin`; without one the
// browser opens and the call waits for a code until the timeout.
#[tokio::main]
pub async fn main() -> Result<(), GistApiError> {
    let settings = Settings::new().map_err(AuthError::from)?;

    let storage = FileCookieStorage::new(settings.cookie_path()?)?;
    let broker = OAuthBroker::from_settings(
        &settings,
        AuthorizationPort::new(),
        Arc::new(BrowserSurface),
        Arc::new(Gatekeeper::new(settings.gatekeeper_url()?)?),
        CredentialStore::new(Arc::new(storage)),
    )?;
    let client = Client::new(Arc::new(ReqwestTransport::new()?), Arc::new(broker));

    let req = Request::gists().get("aa5a315d61ae9438b18d");

    let gist = client.send(req).await?;
    println!("{:?}", gist.files.keys().collect::<Vec<_>>());
    Ok(())
}
