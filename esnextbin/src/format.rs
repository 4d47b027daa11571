//! Mapping between a [`Sketch`] and the multi-file gist that stores it.

use gist_api::endpoints::gists::{Gist, NewGist};
use gist_api::endpoints::GistId;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::defaults;
use crate::sketch::{Sketch, Visibility};

pub const INDEX_JS: &str = "index.js";
pub const TRANSPILED_JS: &str = "transpiled.js";
pub const INDEX_HTML: &str = "index.html";
pub const PACKAGE_JSON: &str = "package.json";
pub const FOOTER_MD: &str = "esnextbin.md";

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    description: Option<String>,
}

/// Parse `raw` as JSON into `T`, falling back to `T::default()` on any
/// syntax error or shape mismatch
pub fn parse_or_default<T>(raw: &str) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_str(raw).unwrap_or_default()
}

/// Description declared by the sketch's package.json, or the stock one
pub fn manifest_description(json: &str) -> String {
    parse_or_default::<Manifest>(json)
        .description
        .filter(|description| !description.is_empty())
        .unwrap_or_else(|| defaults::DESCRIPTION.to_string())
}

pub fn share_link(app_url: &str, id: Option<&GistId>) -> String {
    let app_url = app_url.trim_end_matches('/');
    match id {
        Some(id) => format!("{}/?gist={}", app_url, id),
        None => app_url.to_string(),
    }
}

fn or_default(content: &str, default: &str) -> String {
    match content.trim() {
        "" => default.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Build the gist body for `sketch`. `id` is the gist being updated, if any,
/// and only affects the link in the footer file.
pub fn to_gist(
    sketch: &Sketch,
    visibility: Visibility,
    id: Option<&GistId>,
    app_url: &str,
) -> NewGist {
    let footer = format!("made with [esnextbin]({})", share_link(app_url, id));

    NewGist::new()
        .description(manifest_description(&sketch.json))
        .public(visibility.is_public())
        .file(INDEX_JS, or_default(&sketch.code, defaults::CODE))
        .file(
            TRANSPILED_JS,
            or_default(&sketch.transpiled_code, defaults::CODE),
        )
        .file(INDEX_HTML, or_default(&sketch.html, defaults::HTML))
        .file(PACKAGE_JSON, or_default(&sketch.json, defaults::PACKAGE_JSON))
        .file(FOOTER_MD, footer)
}

/// Rebuild a sketch from a fetched gist; `None` without the primary file
pub fn from_gist(gist: &Gist) -> Option<Sketch> {
    let code = gist.file(INDEX_JS)?;

    Some(Sketch {
        code: code.to_string(),
        transpiled_code: gist.file(TRANSPILED_JS).unwrap_or_default().to_string(),
        html: gist
            .file(INDEX_HTML)
            .filter(|html| !html.is_empty())
            .unwrap_or(defaults::HTML)
            .to_string(),
        json: gist
            .file(PACKAGE_JSON)
            .filter(|json| !json.is_empty())
            .unwrap_or(defaults::PACKAGE_JSON)
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gist_api::endpoints::gists::GistFile;

    const APP_URL: &str = "http://esnextb.in";

    fn sketch(code: &str, transpiled: &str, html: &str, json: &str) -> Sketch {
        Sketch {
            code: code.to_string(),
            transpiled_code: transpiled.to_string(),
            html: html.to_string(),
            json: json.to_string(),
        }
    }

    #[test]
    fn manifest_description_is_adopted() {
        let gist = to_gist(
            &sketch("let x=1", "var x=1", "", r#"{"description":"demo"}"#),
            Visibility::Public,
            None,
            APP_URL,
        );

        assert_eq!(gist.description, "demo");
        assert!(gist.public);
        assert_eq!(gist.files[INDEX_JS].content, "let x=1");
        assert_eq!(gist.files[TRANSPILED_JS].content, "var x=1");
        assert_eq!(gist.files[INDEX_HTML].content, defaults::HTML);
    }

    #[test]
    fn malformed_manifest_falls_back_to_default_description() {
        let gist = to_gist(
            &sketch("let x=1", "var x=1", "", "{not valid}"),
            Visibility::Private,
            None,
            APP_URL,
        );

        assert_eq!(gist.description, defaults::DESCRIPTION);
        assert!(!gist.public);
        // Malformed content is still stored verbatim
        assert_eq!(gist.files[PACKAGE_JSON].content, "{not valid}");
    }

    #[test]
    fn description_of_wrong_shape_falls_back() {
        assert_eq!(
            manifest_description(r#"{"description": 42}"#),
            defaults::DESCRIPTION
        );
        assert_eq!(
            manifest_description(r#"{"description": ""}"#),
            defaults::DESCRIPTION
        );
        assert_eq!(manifest_description("[1, 2]"), defaults::DESCRIPTION);
        assert_eq!(manifest_description(""), defaults::DESCRIPTION);
        assert_eq!(
            manifest_description(r#"{"name":"a","description":"b"}"#),
            "b"
        );
    }

    #[test]
    fn empty_fields_are_trimmed_and_defaulted() {
        let gist = to_gist(
            &sketch("  let x=1\n\n", "   ", "\n", ""),
            Visibility::Public,
            None,
            APP_URL,
        );

        assert_eq!(gist.files[INDEX_JS].content, "let x=1");
        assert_eq!(gist.files[TRANSPILED_JS].content, defaults::CODE);
        assert_eq!(gist.files[INDEX_HTML].content, defaults::HTML);
        assert_eq!(gist.files[PACKAGE_JSON].content, defaults::PACKAGE_JSON);
    }

    #[test]
    fn footer_links_back_to_the_gist_when_known() {
        let id = GistId::from("abc123");
        let with_id = to_gist(&Sketch::default(), Visibility::Public, Some(&id), APP_URL);
        let without_id = to_gist(&Sketch::default(), Visibility::Public, None, APP_URL);

        assert_eq!(
            with_id.files[FOOTER_MD].content,
            "made with [esnextbin](http://esnextb.in/?gist=abc123)"
        );
        assert_eq!(
            without_id.files[FOOTER_MD].content,
            "made with [esnextbin](http://esnextb.in)"
        );
        assert_eq!(
            share_link("http://esnextb.in/", Some(&id)),
            "http://esnextb.in/?gist=abc123"
        );
    }

    #[test]
    fn from_gist_requires_primary_file() {
        let mut gist = Gist::default();
        gist.files
            .insert(INDEX_HTML.to_string(), GistFile::new("<p></p>"));
        assert!(from_gist(&gist).is_none());

        gist.files
            .insert(INDEX_JS.to_string(), GistFile::new("let x=1"));
        let sketch = from_gist(&gist).unwrap();
        assert_eq!(sketch.code, "let x=1");
        assert_eq!(sketch.html, "<p></p>");
        assert_eq!(sketch.json, defaults::PACKAGE_JSON);
        assert!(sketch.transpiled_code.is_empty());
    }
}
