use esnextbin_auth::{
    AuthorizationPort, AuthorizationSurface, CredentialStore, FileCookieStorage, Gatekeeper,
    OAuthBroker, Settings,
};
use gist_api::{Client, ReqwestTransport};
use std::sync::Arc;

use crate::error::SketchError;
use crate::gists::SketchGists;

/// Wire the production collaborators: cookie jar on disk, gatekeeper over
/// HTTP, reqwest transport. The caller supplies the authorization surface and
/// the port it reports to.
pub fn build(
    settings: &Settings,
    port: AuthorizationPort,
    surface: Arc<dyn AuthorizationSurface>,
) -> Result<SketchGists, SketchError> {
    let cookie_path = settings.cookie_path()?;
    tracing::debug!("Using cookie jar at {}", cookie_path.display());
    let credentials = CredentialStore::new(Arc::new(FileCookieStorage::new(cookie_path)?));

    let gatekeeper = Gatekeeper::new(settings.gatekeeper_url()?)?;
    let broker = OAuthBroker::from_settings(
        settings,
        port,
        surface,
        Arc::new(gatekeeper),
        credentials,
    )?;

    let client = Client::new(Arc::new(ReqwestTransport::new()?), Arc::new(broker));
    Ok(SketchGists::new(client, settings.app_url.clone()))
}
