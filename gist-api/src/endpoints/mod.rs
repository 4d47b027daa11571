pub mod gists;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GistId(String);

impl GistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for GistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GistId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GistId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for GistId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GistId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Address of a gist, optionally pinned to one revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistIdentity {
    pub id: GistId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl GistIdentity {
    pub fn new(id: impl Into<GistId>) -> Self {
        Self {
            id: id.into(),
            sha: None,
        }
    }

    pub fn at_revision(id: impl Into<GistId>, sha: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sha: Some(sha.into()),
        }
    }
}

impl From<GistId> for GistIdentity {
    fn from(id: GistId) -> Self {
        Self::new(id)
    }
}

impl Display for GistIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sha {
            Some(sha) => write!(f, "{}@{}", self.id, sha),
            None => self.id.fmt(f),
        }
    }
}

/// A typed call against the gist collection
pub trait Endpoint {
    type Response: DeserializeOwned;
    const METHOD: Method = Method::GET;

    fn identity(&self) -> Option<&GistIdentity> {
        None
    }

    fn body(&self) -> Result<Option<Value>, serde_json::Error> {
        Ok(None)
    }
}
