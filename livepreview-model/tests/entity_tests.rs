use livepreview_model::{
    Asset, ChoiceOption, ContentEntity, ElementValue, FlowNode, RichText, TaxonomyTerm,
};
use livepreview_types::{Codename, ItemId};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn make_entity() -> ContentEntity {
    ContentEntity::new("course-1", "intro_course", "video_course")
        .with_element("course_title", ElementValue::Text("Intro".into()))
        .with_element("duration", ElementValue::Number(Some(42.0)))
        .with_element("url", ElementValue::UrlSlug("intro".into()))
        .with_element("author", ElementValue::LinkedItems(vec!["author-1".into()]))
        .with_element("video", ElementValue::Custom(r#"[{"url":"https://x"}]"#.into()))
        .with_element(
            "topics",
            ElementValue::Taxonomy(vec![TaxonomyTerm {
                name: "Health".into(),
                codename: "health".into(),
            }]),
        )
        .with_element(
            "course_level",
            ElementValue::MultipleChoice(vec![ChoiceOption {
                name: "Beginner".into(),
                codename: "beginner".into(),
            }]),
        )
        .with_element(
            "content",
            ElementValue::RichText(RichText {
                nodes: vec![
                    FlowNode::Html("<p>Hello</p>".into()),
                    FlowNode::Component("cmp-1".into()),
                    FlowNode::LinkedItem("author-1".into()),
                ],
            }),
        )
}

// ── Construction & accessors ─────────────────────────────────────

#[test]
fn new_entity_defaults() {
    let e = ContentEntity::new("a", "a_item", "page");
    assert_eq!(e.id, ItemId::from("a"));
    assert_eq!(e.codename, Codename::from("a_item"));
    assert!(e.is_type("page"));
    assert!(e.language.is_default());
    assert!(e.is_empty());
}

#[test]
fn typed_accessors() {
    let e = make_entity();
    assert_eq!(e.text("course_title"), Some("Intro"));
    assert_eq!(e.text("url"), Some("intro"));
    assert_eq!(e.number("duration"), Some(42.0));
    assert_eq!(e.linked_ids("author"), &[ItemId::from("author-1")]);
    assert_eq!(e.taxonomy("topics")[0].name, "Health");
    assert_eq!(e.choices("course_level")[0].codename.as_str(), "beginner");
    assert_eq!(e.custom("video"), Some(r#"[{"url":"https://x"}]"#));
    assert!(e.rich_text("content").is_some());
}

#[test]
fn accessors_tolerate_missing_and_mistyped_elements() {
    let e = make_entity();
    assert_eq!(e.text("nonexistent"), None);
    assert_eq!(e.text("author"), None);
    assert!(e.linked_ids("course_title").is_empty());
    assert!(e.assets("video").is_empty());
    assert_eq!(e.custom("course_title"), None);
}

// ── References ───────────────────────────────────────────────────

#[test]
fn references_are_deduplicated() {
    let e = make_entity();
    let refs: Vec<_> = e.references().into_iter().cloned().collect();
    assert_eq!(refs.len(), 2);
    assert!(refs.contains(&ItemId::from("author-1")));
    assert!(refs.contains(&ItemId::from("cmp-1")));
}

#[test]
fn without_references_prunes_links_and_inline_nodes() {
    let e = make_entity();
    let dropped = HashSet::from([ItemId::from("author-1")]);
    let pruned = e.without_references(&dropped).unwrap();

    assert!(pruned.linked_ids("author").is_empty());
    let nodes = &pruned.rich_text("content").unwrap().nodes;
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1], FlowNode::Component("cmp-1".into()));
    assert_eq!(pruned.text("course_title"), Some("Intro"));
}

#[test]
fn without_references_returns_none_when_unaffected() {
    let e = make_entity();
    let dropped = HashSet::from([ItemId::from("unrelated")]);
    assert!(e.without_references(&dropped).is_none());
}

// ── Rich text ────────────────────────────────────────────────────

#[test]
fn rich_text_flow_html_skips_references() {
    let e = make_entity();
    assert_eq!(e.rich_text("content").unwrap().flow_html(), "<p>Hello</p>");
}

#[test]
fn rich_text_empty_paragraph_is_empty() {
    assert!(RichText::html("<p><br></p>").is_empty());
    assert!(RichText::default().is_empty());
    assert!(!RichText::html("<p>x</p>").is_empty());
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn element_value_serde_is_tagged() {
    let value = ElementValue::LinkedItems(vec!["a".into()]);
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json, serde_json::json!({"type": "linked_items", "value": ["a"]}));
}

#[test]
fn entity_serde_roundtrip() {
    let e = make_entity().with_element(
        "image",
        ElementValue::Assets(vec![Asset {
            name: "hero.png".into(),
            url: "https://assets/hero.png".into(),
            description: None,
            content_type: Some("image/png".into()),
            width: Some(800),
            height: None,
        }]),
    );
    let json = serde_json::to_string(&e).unwrap();
    let back: ContentEntity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, e);
}
