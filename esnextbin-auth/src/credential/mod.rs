mod cookie_storage;
mod credential_store;

pub use cookie_storage::{CookieStorage, FileCookieStorage, MemoryCookieStorage};
pub use credential_store::{CredentialStore, CREDENTIAL_TTL, OAUTH_TOKEN_COOKIE};
