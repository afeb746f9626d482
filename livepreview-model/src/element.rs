use livepreview_types::{Codename, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The value of a single element within an entity.
///
/// Elements have no identity of their own beyond their codename within the
/// owning entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ElementValue {
    Text(String),
    Number(Option<f64>),
    DateTime(Option<String>),
    RichText(RichText),
    /// Ordered references to other items.
    LinkedItems(Vec<ItemId>),
    Assets(Vec<Asset>),
    Taxonomy(Vec<TaxonomyTerm>),
    MultipleChoice(Vec<ChoiceOption>),
    UrlSlug(String),
    /// Opaque payload of a custom element, exactly as delivered.
    Custom(String),
}

impl ElementValue {
    /// Item ids this value references, in document order.
    pub fn references(&self) -> Box<dyn Iterator<Item = &ItemId> + '_> {
        match self {
            ElementValue::LinkedItems(ids) => Box::new(ids.iter()),
            ElementValue::RichText(rich) => Box::new(rich.references()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Returns a copy with every reference in `dropped` removed, or `None`
    /// when nothing would change.
    pub(crate) fn without_references(&self, dropped: &HashSet<ItemId>) -> Option<Self> {
        if !self.references().any(|id| dropped.contains(id)) {
            return None;
        }
        match self {
            ElementValue::LinkedItems(ids) => Some(ElementValue::LinkedItems(
                ids.iter().filter(|id| !dropped.contains(*id)).cloned().collect(),
            )),
            ElementValue::RichText(rich) => Some(ElementValue::RichText(RichText {
                nodes: rich
                    .nodes
                    .iter()
                    .filter(|node| node.reference().is_none_or(|id| !dropped.contains(id)))
                    .cloned()
                    .collect(),
            })),
            _ => None,
        }
    }
}

/// Rich text split into HTML flow and inline item references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub nodes: Vec<FlowNode>,
}

impl RichText {
    /// Creates rich text holding a single HTML fragment.
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            nodes: vec![FlowNode::Html(html.into())],
        }
    }

    /// Ids of components and linked items embedded in the flow.
    pub fn references(&self) -> impl Iterator<Item = &ItemId> {
        self.nodes.iter().filter_map(FlowNode::reference)
    }

    /// Concatenated HTML of the flow, with inline references omitted.
    pub fn flow_html(&self) -> String {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                FlowNode::Html(html) => Some(html.as_str()),
                _ => None,
            })
            .collect()
    }

    /// True when the rich text carries no content at all. The backend delivers
    /// an empty rich text element as a single empty paragraph.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|node| match node {
            FlowNode::Html(html) => {
                let trimmed = html.trim();
                trimmed.is_empty() || trimmed == "<p><br></p>"
            }
            _ => false,
        })
    }
}

/// One piece of a rich text flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FlowNode {
    Html(String),
    /// A component whose content lives only inside this rich text.
    Component(ItemId),
    /// A standalone item embedded inline.
    LinkedItem(ItemId),
}

impl FlowNode {
    /// The item referenced by this node, if any.
    pub fn reference(&self) -> Option<&ItemId> {
        match self {
            FlowNode::Html(_) => None,
            FlowNode::Component(id) | FlowNode::LinkedItem(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub name: String,
    pub codename: Codename,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub name: String,
    pub codename: Codename,
}
