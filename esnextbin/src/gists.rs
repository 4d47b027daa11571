use gist_api::endpoints::gists::{Gist, GetGist};
use gist_api::endpoints::{GistId, GistIdentity};
use gist_api::{Client, Request};

use crate::error::SketchError;
use crate::format::{self, INDEX_JS};
use crate::sketch::{Sketch, Visibility};

/// Result of saving a sketch
#[derive(Debug, Clone, PartialEq)]
pub struct SavedGist {
    pub gist: Gist,
    /// Set when the save produced a new gist because the original was gone
    pub is_fork: bool,
}

/// Sketch persistence on top of the gist API
#[derive(Clone)]
pub struct SketchGists {
    client: Client,
    app_url: String,
}

impl SketchGists {
    pub fn new(client: Client, app_url: impl Into<String>) -> Self {
        Self {
            client,
            app_url: app_url.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn share_link(&self, id: &GistId) -> String {
        format::share_link(&self.app_url, Some(id))
    }

    pub async fn fetch(&self, identity: &GistIdentity) -> Result<Sketch, SketchError> {
        tracing::info!("Fetching gist {}", identity);
        let gist = self.client.send(GetGist::from(identity.clone())).await?;

        format::from_gist(&gist).ok_or_else(|| {
            SketchError::InvalidFormat(format!("No {} in the gist {}", INDEX_JS, identity))
        })
    }

    pub async fn create(
        &self,
        sketch: &Sketch,
        visibility: Visibility,
    ) -> Result<SavedGist, SketchError> {
        self.create_as(sketch, visibility, false).await
    }

    /// Update gist `id`; if it no longer exists the sketch is saved as a new
    /// gist and the result is marked as a fork
    pub async fn update(
        &self,
        id: &GistId,
        sketch: &Sketch,
        visibility: Visibility,
    ) -> Result<SavedGist, SketchError> {
        tracing::info!("Updating gist {}", id);
        let body = format::to_gist(sketch, visibility, Some(id), &self.app_url);

        match self.client.send(Request::gists().update(id.clone(), body)).await {
            Ok(gist) => Ok(SavedGist {
                gist,
                is_fork: false,
            }),
            Err(e) if e.is_not_found() => {
                tracing::info!("Gist {} is gone, saving as a new gist", id);
                self.create_as(sketch, visibility, true).await
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn revoke_credential(&self) {
        tracing::info!("Revoking stored credential");
        self.client.credentials().clear();
    }

    async fn create_as(
        &self,
        sketch: &Sketch,
        visibility: Visibility,
        is_fork: bool,
    ) -> Result<SavedGist, SketchError> {
        let body = format::to_gist(sketch, visibility, None, &self.app_url);
        let gist = self.client.send(Request::gists().create(body)).await?;

        tracing::info!(
            "Created {} gist {}",
            visibility,
            gist.id.as_ref().map(GistId::as_str).unwrap_or("<unknown>")
        );
        Ok(SavedGist { gist, is_fork })
    }
}
