mod client;
pub mod endpoints;
mod error;
mod macros;
pub mod repositories;
pub mod testing;
mod transport;

pub use crate::client::{Client, MAX_AUTHORIZATION_ROUNDS};
pub use crate::error::{ErrorResponse, GistApiError};
pub use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use reqwest::{Method, StatusCode};
use repositories::*;

pub const BASE_URL: &str = "https://api.github.com/gists";
const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

pub struct Request;

impl Request {
    pub fn new() -> Self {
        Self {}
    }

    pub fn gists() -> GistRepository {
        GistRepository::new()
    }
}
