mod models;

pub use models::{Cookie, TokenResponse};
