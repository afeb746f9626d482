//! Delivery API wire format.
//!
//! A response carries the requested `items` plus a `modular_content` map of
//! every linked item and rich text component, keyed by codename. Elements
//! reference other items by codename; the mapping here translates those to
//! item ids so the resolved tree can key everything by id.

use livepreview_model::{
    Asset, ChoiceOption, ContentEntity, ElementValue, FlowNode, RichText, TaxonomyTerm,
};
use livepreview_types::{Codename, ItemId, LanguageCodename};
use regex_lite::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, LazyLock};
use tracing::debug;

static OBJECT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<object\b[^>]*\btype="application/kenticocloud"[^>]*>\s*</object>"#)
        .expect("object tag pattern is valid")
});
static CODENAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bdata-codename="([^"]*)""#).expect("codename pattern is valid")
});
static REL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bdata-rel="([^"]*)""#).expect("rel pattern is valid")
});

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryResponse {
    #[serde(default)]
    pub items: Vec<WireItem>,
    #[serde(default)]
    pub modular_content: HashMap<String, WireItem>,
    #[serde(default)]
    pub pagination: Option<WirePagination>,
}

impl DeliveryResponse {
    /// Codenames of every item on the page, requested or linked.
    fn codenames(&self) -> HashSet<&str> {
        self.items
            .iter()
            .chain(self.modular_content.values())
            .map(|item| item.system.codename.as_str())
            .collect()
    }

    /// Codenames referenced by some item on the page but delivered nowhere
    /// in it. These are links beyond the depth the backend resolved.
    pub fn unresolved_codenames(&self) -> BTreeSet<String> {
        let known = self.codenames();
        self.items
            .iter()
            .chain(self.modular_content.values())
            .flat_map(|item| item.elements.values())
            .flat_map(referenced_codenames)
            .filter(|codename| !known.contains(codename))
            .map(str::to_string)
            .collect()
    }

    /// Adds the items of `other` as linked content, skipping codenames this
    /// page already has. Returns how many were added.
    pub fn absorb(&mut self, other: DeliveryResponse) -> usize {
        let mut known: HashSet<String> =
            self.codenames().into_iter().map(str::to_string).collect();
        let mut added = 0;
        for item in other.items.into_iter().chain(other.modular_content.into_values()) {
            if known.insert(item.system.codename.clone()) {
                self.modular_content.insert(item.system.codename.clone(), item);
                added += 1;
            }
        }
        added
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub next_page: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireItem {
    pub system: WireSystem,
    #[serde(default)]
    pub elements: BTreeMap<String, WireElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireSystem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub codename: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub collection: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireElement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub modular_content: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireAsset {
    name: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "type")]
    content_type: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireNamed {
    name: String,
    codename: String,
}

/// Entities mapped from one delivery response.
#[derive(Debug, Clone, Default)]
pub struct MappedItems {
    /// The requested items, in response order.
    pub items: Vec<Arc<ContentEntity>>,
    /// Linked items and components delivered alongside.
    pub linked: HashMap<ItemId, Arc<ContentEntity>>,
}

/// Maps a response into entities, translating codename references to ids.
pub fn map_response(response: &DeliveryResponse) -> MappedItems {
    let ids: HashMap<&str, &str> = response
        .items
        .iter()
        .chain(response.modular_content.values())
        .map(|item| (item.system.codename.as_str(), item.system.id.as_str()))
        .collect();

    let items = response
        .items
        .iter()
        .map(|item| Arc::new(map_item(item, &ids)))
        .collect();
    let linked = response
        .modular_content
        .values()
        .map(|item| {
            let entity = map_item(item, &ids);
            (entity.id.clone(), Arc::new(entity))
        })
        .collect();

    MappedItems { items, linked }
}

fn map_item(item: &WireItem, ids: &HashMap<&str, &str>) -> ContentEntity {
    let system = &item.system;
    let mut entity = ContentEntity::new(
        system.id.as_str(),
        system.codename.as_str(),
        system.content_type.as_str(),
    );
    entity.name.clone_from(&system.name);
    if let Some(language) = system.language.as_deref().filter(|l| !l.is_empty()) {
        entity.language = LanguageCodename::new(language);
    }
    entity.collection = system.collection.as_deref().map(Codename::new);

    for (codename, element) in &item.elements {
        if let Some(value) = map_element(element, ids, &system.codename) {
            entity.elements.insert(Codename::new(codename.as_str()), value);
        }
    }
    entity
}

fn map_element(element: &WireElement, ids: &HashMap<&str, &str>, owner: &str) -> Option<ElementValue> {
    let value = &element.value;
    let mapped = match element.kind.as_str() {
        "text" => ElementValue::Text(value.as_str().unwrap_or_default().to_string()),
        "number" => ElementValue::Number(value.as_f64()),
        "date_time" => ElementValue::DateTime(value.as_str().map(str::to_string)),
        "url_slug" => ElementValue::UrlSlug(value.as_str().unwrap_or_default().to_string()),
        "modular_content" => ElementValue::LinkedItems(
            value
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .filter_map(|codename| resolve(codename, ids, owner))
                .collect(),
        ),
        "rich_text" => ElementValue::RichText(parse_rich_text(
            value.as_str().unwrap_or_default(),
            ids,
            owner,
        )),
        "asset" => ElementValue::Assets(
            decode_list::<WireAsset>(value)
                .into_iter()
                .map(|a| Asset {
                    name: a.name,
                    url: a.url,
                    description: a.description,
                    content_type: a.content_type,
                    width: a.width,
                    height: a.height,
                })
                .collect(),
        ),
        "taxonomy" => ElementValue::Taxonomy(
            decode_list::<WireNamed>(value)
                .into_iter()
                .map(|t| TaxonomyTerm {
                    name: t.name,
                    codename: Codename::new(t.codename),
                })
                .collect(),
        ),
        "multiple_choice" => ElementValue::MultipleChoice(
            decode_list::<WireNamed>(value)
                .into_iter()
                .map(|o| ChoiceOption {
                    name: o.name,
                    codename: Codename::new(o.codename),
                })
                .collect(),
        ),
        "custom" => ElementValue::Custom(match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        other => {
            debug!("Skipping element of unsupported type {} on {}", other, owner);
            return None;
        }
    };
    Some(mapped)
}

fn decode_list<T: for<'de> Deserialize<'de>>(value: &Value) -> Vec<T> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}

/// Codenames an element links to, linked items and rich text objects alike.
fn referenced_codenames(element: &WireElement) -> Vec<&str> {
    match element.kind.as_str() {
        "modular_content" => element
            .value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .collect(),
        "rich_text" => {
            let html = element.value.as_str().unwrap_or_default();
            OBJECT_TAG
                .find_iter(html)
                .filter_map(|tag| CODENAME_ATTR.captures(tag.as_str()).and_then(|c| c.get(1)))
                .map(|codename| codename.as_str())
                .collect()
        }
        _ => Vec::new(),
    }
}

fn resolve(codename: &str, ids: &HashMap<&str, &str>, owner: &str) -> Option<ItemId> {
    match ids.get(codename) {
        Some(id) => Some(ItemId::new(*id)),
        None => {
            debug!("Dropping unresolved reference {} from {}", codename, owner);
            None
        }
    }
}

/// Splits rich text HTML into flow nodes. Embedded
/// `<object type="application/kenticocloud">` tags become component or
/// linked item references; everything else stays HTML.
pub fn parse_rich_text(html: &str, ids: &HashMap<&str, &str>, owner: &str) -> RichText {
    let mut nodes = Vec::new();
    let mut last = 0;

    for tag in OBJECT_TAG.find_iter(html) {
        if tag.start() > last {
            nodes.push(FlowNode::Html(html[last..tag.start()].to_string()));
        }
        last = tag.end();

        let tag_text = tag.as_str();
        let Some(codename) = CODENAME_ATTR.captures(tag_text).and_then(|c| c.get(1)) else {
            continue;
        };
        let Some(id) = resolve(codename.as_str(), ids, owner) else {
            continue;
        };
        let is_component = REL_ATTR
            .captures(tag_text)
            .and_then(|c| c.get(1))
            .is_some_and(|rel| rel.as_str() == "component");
        nodes.push(if is_component {
            FlowNode::Component(id)
        } else {
            FlowNode::LinkedItem(id)
        });
    }

    if last < html.len() {
        nodes.push(FlowNode::Html(html[last..].to_string()));
    }
    RichText { nodes }
}
