use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::common::Cookie;
use crate::error::AuthError;

/// Durable name/value storage with per-entry expiry.
///
/// Implementations enforce expiry the way a browser does: an expired cookie is
/// never returned by `get`.
pub trait CookieStorage: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<Cookie>, AuthError>;
    fn set(&self, cookie: Cookie) -> Result<(), AuthError>;
    fn remove(&self, name: &str) -> Result<(), AuthError>;
}

/// Cookie jar kept as a JSON file, readable by the owner only
pub struct FileCookieStorage {
    jar_path: PathBuf,
}

impl FileCookieStorage {
    pub fn new(jar_path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let jar_path = jar_path.into();

        if let Some(parent) = jar_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AuthError::Storage(format!("Failed to create cookie directory: {}", e))
                })?;
            }
        }

        Ok(Self { jar_path })
    }

    pub fn path(&self) -> &Path {
        &self.jar_path
    }

    fn read_jar(&self) -> Result<BTreeMap<String, Cookie>, AuthError> {
        if !self.jar_path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = fs::read_to_string(&self.jar_path)
            .map_err(|e| AuthError::Storage(format!("Failed to read cookies: {}", e)))?;

        serde_json::from_str(&json)
            .map_err(|e| AuthError::Storage(format!("Corrupt cookie jar: {}", e)))
    }

    fn write_jar(&self, jar: &BTreeMap<String, Cookie>) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(jar)
            .map_err(|e| AuthError::Storage(format!("Failed to encode cookies: {}", e)))?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Owner-only from the moment the file exists (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.jar_path)
            .map_err(|e| AuthError::Storage(format!("Failed to save cookies: {}", e)))?;

        // A jar created elsewhere keeps its old mode on open; tighten it before writing
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| {
                    AuthError::Storage(format!("Failed to set file permissions: {}", e))
                })?;
        }

        file.write_all(json.as_bytes())
            .map_err(|e| AuthError::Storage(format!("Failed to save cookies: {}", e)))?;

        Ok(())
    }
}

impl CookieStorage for FileCookieStorage {
    fn get(&self, name: &str) -> Result<Option<Cookie>, AuthError> {
        let now = Utc::now();
        Ok(self
            .read_jar()?
            .remove(name)
            .filter(|cookie| !cookie.is_expired_at(now)))
    }

    fn set(&self, cookie: Cookie) -> Result<(), AuthError> {
        let mut jar = self.read_jar()?;
        jar.insert(cookie.name.clone(), cookie);
        self.write_jar(&jar)
    }

    fn remove(&self, name: &str) -> Result<(), AuthError> {
        let mut jar = self.read_jar()?;
        if jar.remove(name).is_some() {
            self.write_jar(&jar)?;
        }
        Ok(())
    }
}

/// Process-local cookie jar
#[derive(Default)]
pub struct MemoryCookieStorage {
    cookies: Mutex<BTreeMap<String, Cookie>>,
}

impl MemoryCookieStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStorage for MemoryCookieStorage {
    fn get(&self, name: &str) -> Result<Option<Cookie>, AuthError> {
        let now = Utc::now();
        let cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        Ok(cookies
            .get(name)
            .filter(|cookie| !cookie.is_expired_at(now))
            .cloned())
    }

    fn set(&self, cookie: Cookie) -> Result<(), AuthError> {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.insert(cookie.name.clone(), cookie);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), AuthError> {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn cookie(name: &str, value: &str, ttl: Duration) -> Cookie {
        Cookie {
            name: name.to_string(),
            value: value.to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    #[test]
    fn file_jar_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cookies.json");

        let storage = FileCookieStorage::new(&path).unwrap();
        storage
            .set(cookie("oauth_token", "abc", Duration::hours(1)))
            .unwrap();

        let reopened = FileCookieStorage::new(&path).unwrap();
        let loaded = reopened.get("oauth_token").unwrap().unwrap();
        assert_eq!(loaded.value, "abc");
    }

    #[test]
    fn file_jar_hides_expired_cookies() {
        let dir = TempDir::new().unwrap();
        let storage = FileCookieStorage::new(dir.path().join("cookies.json")).unwrap();

        storage
            .set(cookie("oauth_token", "stale", Duration::seconds(-5)))
            .unwrap();

        assert!(storage.get("oauth_token").unwrap().is_none());
    }

    #[test]
    fn file_jar_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = FileCookieStorage::new(dir.path().join("cookies.json")).unwrap();

        storage.remove("oauth_token").unwrap();
        storage
            .set(cookie("oauth_token", "abc", Duration::hours(1)))
            .unwrap();
        storage.remove("oauth_token").unwrap();
        storage.remove("oauth_token").unwrap();

        assert!(storage.get("oauth_token").unwrap().is_none());
    }

    #[test]
    fn file_jar_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileCookieStorage::new(&path).unwrap();
        assert!(matches!(
            storage.get("oauth_token"),
            Err(AuthError::Storage(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn file_jar_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let storage = FileCookieStorage::new(dir.path().join("cookies.json")).unwrap();
        storage
            .set(cookie("oauth_token", "abc", Duration::hours(1)))
            .unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_world_readable_jar_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileCookieStorage::new(&path).unwrap();
        storage
            .set(cookie("oauth_token", "abc", Duration::hours(1)))
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(storage.get("oauth_token").unwrap().unwrap().value, "abc");
    }

    #[test]
    fn memory_jar_overwrites_by_name() {
        let storage = MemoryCookieStorage::new();
        storage
            .set(cookie("oauth_token", "first", Duration::hours(1)))
            .unwrap();
        storage
            .set(cookie("oauth_token", "second", Duration::hours(1)))
            .unwrap();

        assert_eq!(storage.get("oauth_token").unwrap().unwrap().value, "second");
    }
}
