use esnextbin_auth::AuthError;
use gist_api::GistApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SketchError {
    #[error(transparent)]
    Api(#[from] GistApiError),

    /// The gist was fetched but does not hold a sketch
    #[error("Invalid gist format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AuthError> for SketchError {
    fn from(err: AuthError) -> Self {
        SketchError::Api(GistApiError::Auth(err))
    }
}
