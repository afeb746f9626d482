//! Free annotation functions.
//!
//! Highlight suppression adds a single `data-kontent-disable-features`
//! attribute. It hides the hover outline only; the node stays clickable.

use crate::attrs::{AttributeSet, keys};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where new content is inserted relative to the annotated node.
///
/// `Start` and `End` are fixed positions inside a linked-items element;
/// `Before` and `After` are relative to an existing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertPosition {
    Start,
    End,
    Before,
    After,
}

impl InsertPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            InsertPosition::Start => "start",
            InsertPosition::End => "end",
            InsertPosition::Before => "before",
            InsertPosition::After => "after",
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the editor draws the add button around the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderPosition {
    BottomStart,
    Bottom,
    BottomEnd,
    LeftStart,
    Left,
    LeftEnd,
    TopStart,
    Top,
    TopEnd,
    RightStart,
    Right,
    RightEnd,
}

impl RenderPosition {
    pub const ALL: [RenderPosition; 12] = [
        RenderPosition::BottomStart,
        RenderPosition::Bottom,
        RenderPosition::BottomEnd,
        RenderPosition::LeftStart,
        RenderPosition::Left,
        RenderPosition::LeftEnd,
        RenderPosition::TopStart,
        RenderPosition::Top,
        RenderPosition::TopEnd,
        RenderPosition::RightStart,
        RenderPosition::Right,
        RenderPosition::RightEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RenderPosition::BottomStart => "bottom-start",
            RenderPosition::Bottom => "bottom",
            RenderPosition::BottomEnd => "bottom-end",
            RenderPosition::LeftStart => "left-start",
            RenderPosition::Left => "left",
            RenderPosition::LeftEnd => "left-end",
            RenderPosition::TopStart => "top-start",
            RenderPosition::Top => "top",
            RenderPosition::TopEnd => "top-end",
            RenderPosition::RightStart => "right-start",
            RenderPosition::Right => "right",
            RenderPosition::RightEnd => "right-end",
        }
    }
}

impl fmt::Display for RenderPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annotates a node rendered from a content item. Empty when `item_id` is
/// absent or empty.
pub fn entity_annotation(
    item_id: Option<&str>,
    disable_highlight: bool,
    language: Option<&str>,
    project_id: Option<&str>,
) -> AttributeSet {
    let Some(item_id) = item_id.filter(|id| !id.is_empty()) else {
        return AttributeSet::new();
    };
    let mut attrs = AttributeSet::new();
    attrs.insert(keys::ITEM_ID, item_id);
    attrs.insert_opt(keys::LANGUAGE_CODENAME, language);
    attrs.insert_opt(keys::PROJECT_ID, project_id);
    with_disable(attrs, disable_highlight)
}

/// Annotates a node rendered from a single element of the enclosing item.
pub fn element_annotation(
    element_codename: &str,
    disable_highlight: bool,
    language: Option<&str>,
    project_id: Option<&str>,
) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    attrs.insert(keys::ELEMENT_CODENAME, element_codename);
    attrs.insert_opt(keys::LANGUAGE_CODENAME, language);
    attrs.insert_opt(keys::PROJECT_ID, project_id);
    with_disable(attrs, disable_highlight)
}

/// Annotates a node rendered from a rich text component. Empty when
/// `component_id` is absent or empty.
pub fn component_annotation(component_id: Option<&str>, disable_highlight: bool) -> AttributeSet {
    let Some(component_id) = component_id.filter(|id| !id.is_empty()) else {
        return AttributeSet::new();
    };
    let mut attrs = AttributeSet::new();
    attrs.insert(keys::COMPONENT_ID, component_id);
    with_disable(attrs, disable_highlight)
}

/// Marks a node as an "add content" affordance.
pub fn insert_annotation(position: InsertPosition, render: Option<RenderPosition>) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    attrs.insert(keys::ADD_BUTTON, true);
    attrs.insert(keys::ADD_BUTTON_INSERT_POSITION, position.as_str());
    if let Some(render) = render {
        attrs.insert(keys::ADD_BUTTON_RENDER_POSITION, render.as_str());
    }
    attrs
}

fn with_disable(mut attrs: AttributeSet, disable: bool) -> AttributeSet {
    if disable {
        attrs.insert(keys::DISABLE_FEATURES, keys::HIGHLIGHT);
    }
    attrs
}
