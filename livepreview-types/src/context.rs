//! Navigation context read from the current URL.
//!
//! Two query parameters drive the live preview session:
//! - `lang` selects the language variant; absence means the literal `"default"`
//! - `preview` enables preview mode, but only when it is exactly `"true"`
//!
//! `collection` optionally overrides the configured content collection.

use crate::{Codename, Error, LanguageCodename, Result};
use serde::{Deserialize, Serialize};

const LANG_PARAM: &str = "lang";
const PREVIEW_PARAM: &str = "preview";
const COLLECTION_PARAM: &str = "collection";

/// The parts of the current URL the preview core cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationContext {
    /// Path component of the URL (without query or fragment).
    pub path: String,
    pub language: LanguageCodename,
    pub preview: bool,
    pub collection: Option<Codename>,
}

impl NavigationContext {
    /// Parses a full URL, a path with a query, or a bare query string.
    pub fn parse(url: &str) -> Result<Self> {
        let without_fragment = url.split('#').next().unwrap_or_default();
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None if without_fragment.contains('=') => ("", without_fragment),
            None => (without_fragment, ""),
        };

        let mut ctx = Self {
            path: strip_origin(path).to_string(),
            ..Self::default()
        };

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key)?;
            let value = decode(value)?;
            match key.as_str() {
                LANG_PARAM if !value.is_empty() => ctx.language = LanguageCodename::new(value),
                PREVIEW_PARAM => ctx.preview = value == "true",
                COLLECTION_PARAM if !value.is_empty() => ctx.collection = Some(Codename::new(value)),
                _ => {}
            }
        }

        Ok(ctx)
    }

    /// Returns the key identifying the preview session this context belongs to.
    /// A change of key means the session must be torn down and re-detected.
    #[must_use]
    pub fn session_key(&self) -> (LanguageCodename, bool) {
        (self.language.clone(), self.preview)
    }

    /// Builds an internal link that keeps the preview session alive across
    /// navigation. External links and fragment-only links are returned as-is.
    #[must_use]
    pub fn preview_link(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") || link.starts_with('#') {
            return link.to_string();
        }

        let mut params = Vec::new();
        if !self.language.is_default() {
            params.push(format!(
                "{LANG_PARAM}={}",
                urlencoding::encode(self.language.as_str())
            ));
        }
        if self.preview {
            params.push(format!("{PREVIEW_PARAM}=true"));
        }
        if params.is_empty() {
            return link.to_string();
        }

        let separator = if link.contains('?') { '&' } else { '?' };
        format!("{link}{separator}{}", params.join("&"))
    }
}

fn strip_origin(path: &str) -> &str {
    match path.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |idx| &rest[idx..]),
        None => path,
    }
}

fn decode(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| Error::InvalidQuery(e.to_string()))
}
