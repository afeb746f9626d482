//! Delivery responses for the site's pages.

#![allow(dead_code)]

use livepreview_delivery::ItemsPage;
use livepreview_model::ResolvedTree;
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

pub fn landing_page_response() -> Value {
    json!({
        "items": [{
            "system": system("lp-1", "home", "landing_page"),
            "elements": {
                "body_copy": rich_text(
                    "<p>Intro</p><object type=\"application/kenticocloud\" data-type=\"item\" data-rel=\"component\" data-codename=\"cmp_1\"></object>",
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
                "elements": { "title": text("Take note") }
            }
        },
        "pagination": { "skip": 0, "limit": 1, "count": 1, "next_page": "" }
    })
}

pub fn course_response() -> Value {
    json!({
        "items": [{
            "system": system("vc-1", "intro_to_care", "video_course"),
            "elements": {
                "course_title": text("Intro to <Care>"),
                "author": linked(&["dr_lee"]),
                "video": linked(&["course_video"]),
                "course_level": {
                    "type": "multiple_choice",
                    "name": "",
                    "value": [{ "name": "Beginner", "codename": "beginner" }]
                },
                "topics": {
                    "type": "taxonomy",
                    "name": "",
                    "value": [
                        { "name": "Nutrition", "codename": "nutrition" },
                        { "name": "Sleep", "codename": "sleep" }
                    ]
                },
                "content": rich_text("<p>Lesson one</p>", &[])
            }
        }],
        "modular_content": {
            "dr_lee": {
                "system": system("au-1", "dr_lee", "author"),
                "elements": { "first_name": text("Ana"), "last_name": text("Lee") }
            },
            "course_video": {
                "system": system("vid-2", "course_video", "cloudinary_asset"),
                "elements": {
                    "video_from_cloudinary": custom(
                        "[{\"secure_url\":\"https://cdn.example/lesson.mp4\",\"title\":\"Lesson 1\",\"caption\":\"Week one\"}]"
                    )
                }
            }
        },
        "pagination": { "skip": 0, "limit": 0, "count": 1, "next_page": "" }
    })
}

pub fn navigation_response() -> Value {
    json!({
        "items": [{
            "system": system("nav-1", "header", "_navigation"),
            "elements": {
                "header_navigation": linked(&["about_link", "external_link", "home"])
            }
        }],
        "modular_content": {
            "about_link": {
                "system": system("l-1", "about_link", "link"),
                "elements": { "display_text": text("About & Us"), "link_url": text("/about") }
            },
            "external_link": {
                "system": system("l-2", "external_link", "link"),
                "elements": { "display_text": text("Partner"), "link_url": text("https://partner.example") }
            },
            "home": {
                "system": system("lp-1", "home", "landing_page"),
                "elements": {}
            }
        }
    })
}

pub fn empty_response() -> Value {
    json!({
        "items": [],
        "modular_content": {},
        "pagination": { "skip": 0, "limit": 0, "count": 0, "next_page": "" }
    })
}

pub fn tree(response: Value) -> ResolvedTree {
    ItemsPage::from_json(&response.to_string())
        .unwrap()
        .first_tree()
        .unwrap()
}
