//! Shared content fixtures for sync tests.

#![allow(dead_code)]

use livepreview_model::{ContentEntity, ElementValue, FlowNode, ResolvedTree, RichText};
use livepreview_types::ItemId;
use std::sync::Arc;

/// An entity with a title and an ordered list of linked children.
pub fn item(id: &str, title: &str, children: &[&str]) -> Arc<ContentEntity> {
    Arc::new(
        ContentEntity::new(id, id.replace('-', "_"), "page")
            .with_element("title", ElementValue::Text(title.to_string()))
            .with_element(
                "children",
                ElementValue::LinkedItems(children.iter().map(|c| ItemId::from(*c)).collect()),
            ),
    )
}

/// An entity whose rich text body embeds `component`.
pub fn with_component(id: &str, component: &str) -> Arc<ContentEntity> {
    Arc::new(
        ContentEntity::new(id, id, "landing_page").with_element(
            "body_copy",
            ElementValue::RichText(RichText {
                nodes: vec![
                    FlowNode::Html("<p>Body</p>".into()),
                    FlowNode::Component(component.into()),
                ],
            }),
        ),
    )
}

/// R links to A and B; A links to C.
pub fn sample_tree() -> ResolvedTree {
    ResolvedTree::new(
        item("r", "Root", &["a", "b"]),
        [
            item("a", "A", &["c"]),
            item("b", "B", &[]),
            item("c", "C", &[]),
        ],
    )
}

pub fn title(tree: &ResolvedTree, id: &str) -> Option<String> {
    tree.get(id)?.text("title").map(str::to_string)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
