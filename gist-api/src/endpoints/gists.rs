use super::{Endpoint, GistId, GistIdentity};
use crate::macros::setter;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// Common

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl GistFile {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            filename: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistRevision {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<String>,
}

/// A gist as returned by the API. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    #[serde(default)]
    pub id: Option<GistId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub history: Vec<GistRevision>,
}

impl Gist {
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(|file| file.content.as_str())
    }

    /// Newest revision; the API lists history newest first
    pub fn latest_revision(&self) -> Option<&str> {
        self.history.first().map(|rev| rev.version.as_str())
    }
}

/// Body of a create or update call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGist {
    pub description: String,
    pub public: bool,
    pub files: BTreeMap<String, GistFile>,
}

impl NewGist {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(description: String);
    setter!(public: bool);

    pub fn file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(name.into(), GistFile::new(content));
        self
    }
}

// Requests

#[derive(Debug, Clone)]
pub struct GetGist {
    identity: GistIdentity,
}

impl GetGist {
    pub fn new(id: impl Into<GistId>) -> Self {
        Self {
            identity: GistIdentity::new(id),
        }
    }

    setter!(opt identity.sha: String);
}

impl From<GistIdentity> for GetGist {
    fn from(identity: GistIdentity) -> Self {
        Self { identity }
    }
}

impl Endpoint for GetGist {
    type Response = Gist;

    fn identity(&self) -> Option<&GistIdentity> {
        Some(&self.identity)
    }
}

#[derive(Debug, Clone)]
pub struct CreateGist {
    gist: NewGist,
}

impl CreateGist {
    pub fn new(gist: NewGist) -> Self {
        Self { gist }
    }
}

impl Endpoint for CreateGist {
    type Response = Gist;
    const METHOD: Method = Method::POST;

    fn body(&self) -> Result<Option<Value>, serde_json::Error> {
        serde_json::to_value(&self.gist).map(Some)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateGist {
    identity: GistIdentity,
    gist: NewGist,
}

impl UpdateGist {
    pub fn new(id: impl Into<GistId>, gist: NewGist) -> Self {
        Self {
            identity: GistIdentity::new(id),
            gist,
        }
    }
}

impl Endpoint for UpdateGist {
    type Response = Gist;
    const METHOD: Method = Method::PATCH;

    fn identity(&self) -> Option<&GistIdentity> {
        Some(&self.identity)
    }

    fn body(&self) -> Result<Option<Value>, serde_json::Error> {
        serde_json::to_value(&self.gist).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_gist_serializes_as_api_body() {
        let gist = NewGist::new()
            .description("demo")
            .public(true)
            .file("index.js", "let x=1");

        assert_eq!(
            serde_json::to_value(&gist).unwrap(),
            json!({
                "description": "demo",
                "public": true,
                "files": { "index.js": { "content": "let x=1" } }
            })
        );
    }

    #[test]
    fn gist_tolerates_sparse_and_extra_fields() {
        let gist: Gist = serde_json::from_value(json!({
            "id": "aa5a315d61ae9438b18d",
            "files": {
                "index.js": {
                    "filename": "index.js",
                    "type": "application/javascript",
                    "content": "let x=1",
                    "truncated": false
                }
            },
            "history": [{ "version": "57a7f021a713b1c5a6a199b54cc514735d2d462f" }],
            "owner": { "login": "octocat" }
        }))
        .unwrap();

        assert_eq!(gist.id.as_ref().unwrap(), &"aa5a315d61ae9438b18d");
        assert_eq!(gist.file("index.js"), Some("let x=1"));
        assert_eq!(
            gist.latest_revision(),
            Some("57a7f021a713b1c5a6a199b54cc514735d2d462f")
        );
        assert!(!gist.public);

        let empty: Gist = serde_json::from_value(json!({})).unwrap();
        assert!(empty.files.is_empty());
    }

    #[test]
    fn requests_use_expected_methods_and_identities() {
        let get = GetGist::new("abc").sha("def");
        assert_eq!(
            get.identity(),
            Some(&GistIdentity::at_revision("abc", "def"))
        );
        assert!(get.body().unwrap().is_none());

        assert_eq!(CreateGist::METHOD, Method::POST);
        assert!(CreateGist::new(NewGist::new()).identity().is_none());

        let update = UpdateGist::new("abc", NewGist::new());
        assert_eq!(UpdateGist::METHOD, Method::PATCH);
        assert_eq!(update.identity(), Some(&GistIdentity::new("abc")));
        assert!(update.body().unwrap().is_some());
    }
}
