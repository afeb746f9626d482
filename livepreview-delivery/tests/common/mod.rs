//! Delivery API response fixtures.

#![allow(dead_code)]

use serde_json::{Value, json};

pub fn system(id: &str, codename: &str, content_type: &str) -> Value {
    json!({
        "id": id,
        "name": codename,
        "codename": codename,
        "language": "default",
        "type": content_type,
        "collection": "patient_resources"
    })
}

pub fn text(value: &str) -> Value {
    json!({ "type": "text", "name": "", "value": value })
}

pub fn linked(codenames: &[&str]) -> Value {
    json!({ "type": "modular_content", "name": "", "value": codenames })
}

pub fn rich_text(html: &str, codenames: &[&str]) -> Value {
    json!({ "type": "rich_text", "name": "", "value": html, "modular_content": codenames })
}

pub fn custom(value: &str) -> Value {
    json!({ "type": "custom", "name": "", "value": value })
}

/// A landing page with a linked video and an inline component.
pub fn landing_page_response() -> Value {
    json!({
        "items": [{
            "system": system("lp-1", "home", "landing_page"),
            "elements": {
                "headline": text("Welcome"),
                "body_copy": rich_text(
                    "<p>Intro</p><object type=\"application/kenticocloud\" data-type=\"item\" data-rel=\"component\" data-codename=\"cmp_1\"></object><p>Outro</p>",
                    &["cmp_1"]
                ),
                "cloudinary_video": linked(&["intro_video"])
            }
        }],
        "modular_content": {
            "intro_video": {
                "system": system("vid-1", "intro_video", "cloudinary_asset"),
                "elements": {
                    "video_from_cloudinary": custom("[{\"public_id\":\"samples/intro\"}]")
                }
            },
            "cmp_1": {
                "system": system("cmp-1", "cmp_1", "callout"),
                "elements": { "message": text("Note") }
            }
        },
        "pagination": { "skip": 0, "limit": 1, "count": 1, "next_page": "" }
    })
}

/// A navigation item linking every supported menu entry kind.
pub fn navigation_response() -> Value {
    json!({
        "items": [{
            "system": system("nav-1", "header", "_navigation"),
            "elements": {
                "header_navigation": linked(&["about_link", "faq_page", "home", "quote_1", "missing"])
            }
        }],
        "modular_content": {
            "about_link": {
                "system": system("l-1", "about_link", "link"),
                "elements": { "display_text": text("About"), "link_url": text("/about") }
            },
            "faq_page": {
                "system": system("p-1", "faq_page", "page"),
                "elements": { "headline": text(""), "url": { "type": "url_slug", "value": "faq" } }
            },
            "home": {
                "system": system("lp-1", "home", "landing_page"),
                "elements": {}
            },
            "quote_1": {
                "system": system("q-1", "quote_1", "quote"),
                "elements": {}
            }
        }
    })
}

/// `a1` links `b1`, which links `c1`. Only one level of links is included,
/// so `c1` is referenced but not delivered.
pub fn depth_limited_response() -> Value {
    json!({
        "items": [{
            "system": system("id-a", "a1", "page"),
            "elements": { "title": text("A edited"), "children": linked(&["b1"]) }
        }],
        "modular_content": {
            "b1": {
                "system": system("id-b", "b1", "page"),
                "elements": { "title": text("B"), "children": linked(&["c1"]) }
            }
        }
    })
}

/// `c1` on its own.
pub fn leaf_response() -> Value {
    json!({
        "items": [{
            "system": system("id-c", "c1", "page"),
            "elements": { "title": text("C"), "children": linked(&[]) }
        }],
        "modular_content": {}
    })
}

pub fn empty_response() -> Value {
    json!({
        "items": [],
        "modular_content": {},
        "pagination": { "skip": 0, "limit": 0, "count": 0, "next_page": "" }
    })
}

pub fn not_found_body() -> Value {
    json!({
        "message": "The requested content item was not found.",
        "request_id": "abc",
        "error_code": 100,
        "specific_code": 0
    })
}
