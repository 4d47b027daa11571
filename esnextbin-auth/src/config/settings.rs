use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::AuthError;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub client_id: String,

    #[serde(default = "default_scope")]
    pub scope: String,

    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_gatekeeper_url")]
    pub gatekeeper_url: String,

    /// Public address of the app; its origin is the only trusted notification sender
    #[serde(default = "default_app_url")]
    pub app_url: String,

    #[serde(default = "default_authorization_timeout")]
    pub authorization_timeout_secs: u64,

    #[serde(default)]
    pub cookie_path: Option<PathBuf>,
}

fn default_scope() -> String {
    "gist".to_string()
}

fn default_authorize_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_gatekeeper_url() -> String {
    "http://localhost:9999/authenticate".to_string()
}

fn default_app_url() -> String {
    "http://esnextb.in".to_string()
}

fn default_authorization_timeout() -> u64 {
    300
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("ESNEXTBIN_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&config_path).required(false))
            .add_source(config::Environment::with_prefix("ESNEXTBIN").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.is_empty() {
            return Err("client_id is required".to_string());
        }
        if self.scope.is_empty() {
            return Err("scope must not be empty".to_string());
        }
        for (name, value) in [
            ("authorize_url", &self.authorize_url),
            ("gatekeeper_url", &self.gatekeeper_url),
            ("app_url", &self.app_url),
        ] {
            if !value.starts_with("http") || Url::parse(value).is_err() {
                return Err(format!("{} must be a valid HTTP(S) URL", name));
            }
        }
        if self.authorization_timeout_secs == 0 {
            return Err("authorization_timeout_secs must be positive".to_string());
        }
        Ok(())
    }

    /// Authorization page address carrying the client id and requested scope
    pub fn authorization_url(&self) -> Result<Url, AuthError> {
        let url = Url::parse_with_params(
            &self.authorize_url,
            &[("client_id", &self.client_id), ("scope", &self.scope)],
        )?;
        Ok(url)
    }

    pub fn gatekeeper_url(&self) -> Result<Url, AuthError> {
        Ok(Url::parse(&self.gatekeeper_url)?)
    }

    /// Serialized origin of `app_url`, e.g. `http://esnextb.in`
    pub fn app_origin(&self) -> Result<String, AuthError> {
        Ok(Url::parse(&self.app_url)?.origin().ascii_serialization())
    }

    pub fn authorization_timeout(&self) -> Duration {
        Duration::from_secs(self.authorization_timeout_secs)
    }

    pub fn cookie_path(&self) -> Result<PathBuf, AuthError> {
        if let Some(path) = &self.cookie_path {
            return Ok(path.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| AuthError::Configuration("Could not find cache directory".to_string()))?
            .join("esnextbin");
        Ok(cache_dir.join("cookies.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_fill_everything_but_client_id() {
        let settings = from_toml("");
        assert_eq!(settings.scope, "gist");
        assert_eq!(settings.authorize_url, "https://github.com/login/oauth/authorize");
        assert_eq!(settings.authorization_timeout(), Duration::from_secs(300));
        assert_eq!(
            settings.validate(),
            Err("client_id is required".to_string())
        );
    }

    #[test]
    fn authorization_url_carries_client_id_and_scope() {
        let settings = from_toml("client_id = \"abc123\"");
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.authorization_url().unwrap().as_str(),
            "https://github.com/login/oauth/authorize?client_id=abc123&scope=gist"
        );
    }

    #[test]
    fn app_origin_drops_path_and_query() {
        let settings = from_toml(
            "client_id = \"abc\"\napp_url = \"https://sketch.example.com:8443/editor?x=1\"",
        );
        assert_eq!(
            settings.app_origin().unwrap(),
            "https://sketch.example.com:8443"
        );
    }

    #[test]
    fn validate_rejects_non_http_urls() {
        let settings = from_toml("client_id = \"abc\"\ngatekeeper_url = \"ftp://gate\"");
        assert_eq!(
            settings.validate(),
            Err("gatekeeper_url must be a valid HTTP(S) URL".to_string())
        );
    }

    #[test]
    fn explicit_cookie_path_wins() {
        let settings = from_toml("client_id = \"abc\"\ncookie_path = \"/tmp/jar.json\"");
        assert_eq!(
            settings.cookie_path().unwrap(),
            PathBuf::from("/tmp/jar.json")
        );
    }
}
