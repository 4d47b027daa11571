use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;

use crate::error::SketchError;
use crate::format::{INDEX_HTML, INDEX_JS, PACKAGE_JSON, TRANSPILED_JS};

/// Editor state of one sketch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sketch {
    pub code: String,
    pub transpiled_code: String,
    pub html: String,
    pub json: String,
}

impl Sketch {
    /// Read a sketch laid out as gist files; missing files read as empty
    pub async fn load(dir: &Path) -> Result<Self, SketchError> {
        Ok(Self {
            code: read_optional(&dir.join(INDEX_JS)).await?,
            transpiled_code: read_optional(&dir.join(TRANSPILED_JS)).await?,
            html: read_optional(&dir.join(INDEX_HTML)).await?,
            json: read_optional(&dir.join(PACKAGE_JSON)).await?,
        })
    }

    pub async fn save(&self, dir: &Path) -> Result<(), SketchError> {
        fs::create_dir_all(dir).await?;
        fs::write(dir.join(INDEX_JS), &self.code).await?;
        fs::write(dir.join(TRANSPILED_JS), &self.transpiled_code).await?;
        fs::write(dir.join(INDEX_HTML), &self.html).await?;
        fs::write(dir.join(PACKAGE_JSON), &self.json).await?;
        Ok(())
    }
}

async fn read_optional(path: &Path) -> Result<String, SketchError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        *self == Visibility::Public
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" | "secret" => Ok(Self::Private),
            other => Err(format!("unknown visibility '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_then_load_preserves_fields() {
        let dir = TempDir::new().unwrap();
        let sketch = Sketch {
            code: "let x=1".to_string(),
            transpiled_code: "var x=1".to_string(),
            html: "<p></p>".to_string(),
            json: "{}".to_string(),
        };

        sketch.save(&dir.path().join("demo")).await.unwrap();
        let loaded = Sketch::load(&dir.path().join("demo")).await.unwrap();

        assert_eq!(loaded, sketch);
    }

    #[tokio::test]
    async fn missing_files_load_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(INDEX_JS), "let x=1").unwrap();

        let loaded = Sketch::load(dir.path()).await.unwrap();

        assert_eq!(loaded.code, "let x=1");
        assert!(loaded.transpiled_code.is_empty());
        assert!(loaded.html.is_empty());
        assert!(loaded.json.is_empty());
    }

    #[test]
    fn sketch_uses_editor_field_names() {
        let sketch: Sketch = serde_json::from_str(
            r#"{"code":"let x=1","transpiledCode":"var x=1","html":"","json":"{}"}"#,
        )
        .unwrap();
        assert_eq!(sketch.transpiled_code, "var x=1");
    }

    #[test]
    fn visibility_parses_and_displays() {
        assert_eq!("public".parse::<Visibility>(), Ok(Visibility::Public));
        assert_eq!("private".parse::<Visibility>(), Ok(Visibility::Private));
        assert!("hidden".parse::<Visibility>().is_err());
        assert_eq!(Visibility::Private.to_string(), "private");
        assert!(!Visibility::Private.is_public());
    }
}
