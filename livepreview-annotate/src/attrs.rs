use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute names understood by the editing frame.
pub mod keys {
    pub const ITEM_ID: &str = "data-kontent-item-id";
    pub const ELEMENT_CODENAME: &str = "data-kontent-element-codename";
    pub const COMPONENT_ID: &str = "data-kontent-component-id";
    pub const LANGUAGE_CODENAME: &str = "data-kontent-language-codename";
    pub const PROJECT_ID: &str = "data-kontent-project-id";
    pub const ADD_BUTTON: &str = "data-kontent-add-button";
    pub const ADD_BUTTON_INSERT_POSITION: &str = "data-kontent-add-button-insert-position";
    pub const ADD_BUTTON_RENDER_POSITION: &str = "data-kontent-add-button-render-position";
    pub const DISABLE_FEATURES: &str = "data-kontent-disable-features";

    /// The only feature that can be disabled per node.
    pub const HIGHLIGHT: &str = "highlight";
}

/// An attribute value. The editor reads strings, except for the add button
/// flag which is boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            AttrValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// An ordered set of annotation attributes.
///
/// Serializes as a flat JSON object, which is what script-side consumers
/// spread onto elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<&'static str, AttrValue>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub(crate) fn insert(&mut self, key: &'static str, value: impl Into<AttrValue>) {
        self.0.insert(key, value.into());
    }

    /// Adds `value` under `key` only when it is present and non-empty.
    pub(crate) fn insert_opt(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.insert(key, value);
        }
    }

    /// Combines two sets, `other` winning on conflicting keys. Used to place
    /// element and item annotations on the same node.
    #[must_use]
    pub fn merge(mut self, other: AttributeSet) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Renders the set as HTML attribute text, e.g.
    /// `data-kontent-item-id="a" data-kontent-add-button="true"`.
    pub fn to_html(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{key}=\"{}\"", escape_html(&value.to_string())))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        AttrValue::Str(s) => serde_json::Value::String(s.clone()),
                        AttrValue::Bool(b) => serde_json::Value::Bool(*b),
                    };
                    (key.to_string(), value)
                })
                .collect(),
        )
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

/// Escapes text for use in HTML content and quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
