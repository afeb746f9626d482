//! Annotated HTML rendering.
//!
//! Output mirrors the site's page structure closely enough for the editor
//! to find every annotated node. Rich text HTML from the backend is trusted
//! and emitted as-is; plain text values are escaped.

use crate::PageKind;
use livepreview_annotate::{Annotator, AttributeSet, escape_html};
use livepreview_delivery::{MenuLink, menu_links};
use livepreview_model::{CloudinaryVideo, ContentEntity, FlowNode, ResolvedTree, RichText};
use livepreview_types::NavigationContext;
use std::fmt::Write;

const EMPTY_PAGE: &str = r#"<div class="flex-grow"></div>"#;
const VIDEO_ELEMENT: &str = "video_from_cloudinary";

/// Renders loaded pages for one navigation context.
#[derive(Debug, Clone)]
pub struct Renderer {
    annotator: Annotator,
    ctx: NavigationContext,
    cloud_name: Option<String>,
}

impl Renderer {
    pub fn new(annotator: Annotator, ctx: NavigationContext, cloud_name: Option<String>) -> Self {
        Self {
            annotator,
            ctx,
            cloud_name,
        }
    }

    pub fn render(&self, kind: PageKind, tree: Option<&ResolvedTree>) -> String {
        match kind {
            PageKind::Landing => self.landing(tree),
            PageKind::Course => self.video_course(tree),
            PageKind::Navigation => self.navigation(&tree.map(menu_links).unwrap_or_default()),
        }
    }

    pub fn landing(&self, tree: Option<&ResolvedTree>) -> String {
        let Some(tree) = tree.filter(|t| !t.root().is_empty()) else {
            return EMPTY_PAGE.to_string();
        };
        let root = tree.root();

        let mut out = String::from(r#"<div class="flex-grow">"#);
        if let Some(asset) = tree
            .first_linked(root, "cloudinary_video")
            .filter(|asset| asset.custom(VIDEO_ELEMENT).is_some())
        {
            out.push_str(&self.video(asset, root, Some(true)));
        }

        let section = self.item_element(root, "body_copy");
        let _ = write!(out, r#"<section class="bg-white" {section}>"#);
        if let Some(body) = root.rich_text("body_copy") {
            out.push_str(&self.rich_text(tree, body));
        }
        out.push_str("</section></div>");
        out
    }

    pub fn video_course(&self, tree: Option<&ResolvedTree>) -> String {
        let Some(tree) = tree else {
            return EMPTY_PAGE.to_string();
        };
        let course = tree.root();

        let mut out = String::from(r#"<div class="flex flex-col">"#);
        if let Some(asset) = tree.first_linked(course, "video") {
            out.push_str(&self.video(asset, course, Some(false)));
        }

        let heading = self.item_element(course, "course_title");
        let _ = write!(
            out,
            "<h1 {heading}>{}</h1>",
            escape_html(course.text("course_title").unwrap_or_default())
        );

        if let Some(author) = tree.first_linked(course, "author") {
            let name = [author.text("first_name"), author.text("last_name")]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(out, "<p>{}</p>", escape_html(&name));
        }

        if let Some(level) = term_names(course, "course_level").into_iter().next() {
            out.push_str(&self.tags(course, "course_level", &[level]));
        }
        let topics = term_names(course, "topics");
        if !topics.is_empty() {
            out.push_str(&self.tags(course, "topics", &topics));
        }

        if let Some(content) = course.rich_text("content").filter(|c| !c.is_empty()) {
            let attrs = self.item_element(course, "content");
            let _ = write!(
                out,
                r#"<div class="rich-text-body" {attrs}>{}</div>"#,
                self.rich_text(tree, content)
            );
        }
        out.push_str("</div>");
        out
    }

    /// Header menu with internal links carrying the preview parameters.
    pub fn navigation(&self, links: &[MenuLink]) -> String {
        let mut out = String::from("<nav><ul>");
        for link in links {
            let _ = write!(
                out,
                r#"<li><a href="{}">{}</a></li>"#,
                escape_html(&self.ctx.preview_link(&link.link)),
                escape_html(&link.name)
            );
        }
        out.push_str("</ul></nav>");
        out
    }

    /// The video custom element of `asset`, annotated as part of `owner`.
    fn video(&self, asset: &ContentEntity, owner: &ContentEntity, autoplay: Option<bool>) -> String {
        let attrs = self.annotator.entity(Some(owner.id.as_str()), false);
        let Some(video) = asset.custom(VIDEO_ELEMENT).and_then(CloudinaryVideo::parse) else {
            return format!("<div {attrs}><p>No video URL provided</p></div>");
        };

        let playback = video.playback(autoplay);
        let Some(url) = video.source_url(playback, self.cloud_name.as_deref()) else {
            return format!("<div {attrs}><p>No video URL provided</p></div>");
        };

        let mut flags = String::from(" playsinline");
        for (on, flag) in [
            (playback.autoplay, " autoplay"),
            (playback.mute, " muted"),
            (playback.looped, " loop"),
        ] {
            if on {
                flags.push_str(flag);
            }
        }

        let mut out = format!(
            r#"<div {attrs}><figure><video title="{}" width="{}" height="{}"{flags}>"#,
            escape_html(&video.title),
            escape_html(&video.width),
            escape_html(&video.height)
        );
        for mime in ["video/mp4", "video/webm", "video/ogg"] {
            let _ = write!(out, r#"<source src="{}" type="{mime}">"#, escape_html(&url));
        }
        out.push_str("</video>");
        if let Some(caption) = &video.caption {
            let _ = write!(out, "<figcaption>{}</figcaption>", escape_html(caption));
        }
        out.push_str("</figure></div>");
        out
    }

    fn tags(&self, owner: &ContentEntity, element: &str, names: &[&str]) -> String {
        let attrs = self.item_element(owner, element);
        let mut out = format!("<ul {attrs}>");
        for name in names {
            let _ = write!(out, "<li>{}</li>", escape_html(name));
        }
        out.push_str("</ul>");
        out
    }

    /// Flow HTML with inline components and linked items wrapped in their
    /// own annotated nodes.
    fn rich_text(&self, tree: &ResolvedTree, rich: &RichText) -> String {
        let mut out = String::new();
        for node in &rich.nodes {
            match node {
                FlowNode::Html(html) => out.push_str(html),
                FlowNode::Component(id) => {
                    if let Some(component) = tree.get(id) {
                        out.push_str(&self.component(component));
                    }
                }
                FlowNode::LinkedItem(id) => {
                    if let Some(linked) = tree.get(id) {
                        let attrs = self.annotator.entity(Some(id.as_str()), false);
                        let _ = write!(out, "<div {attrs}>{}</div>", escape_html(display_name(linked)));
                    }
                }
            }
        }
        out
    }

    /// Disclaimers expose their headline and subheadline to the editor;
    /// other components render as their display name.
    fn component(&self, component: &ContentEntity) -> String {
        let id = component.id.as_str();
        let Some(theme) = disclaimer_theme(component) else {
            let attrs = self.annotator.component(Some(id), false);
            return format!("<div {attrs}>{}</div>", escape_html(display_name(component)));
        };

        let attrs = self.annotator.entity(Some(id), false);
        let headline = self.annotator.element("headline", false);
        let subheadline = self.annotator.element("subheadline", false);
        format!(
            concat!(
                r#"<div class="{}bg-background-color pt-16 pb-20 rounded-lg py-16" {}>"#,
                r#"<h1 class="text-6xl text-heading-2-color font-serif text-center mb-6" {}>{}</h1>"#,
                r#"<p class="text-center text-body-color text-lg max-w-4xl mx-auto" {}>{}</p>"#,
                "</div>"
            ),
            theme,
            attrs,
            headline,
            escape_html(component.text("headline").unwrap_or_default()),
            subheadline,
            escape_html(component.text("subheadline").unwrap_or_default()),
        )
    }

    fn item_element(&self, entity: &ContentEntity, element: &str) -> AttributeSet {
        self.annotator
            .entity(Some(entity.id.as_str()), false)
            .merge(self.annotator.element(element, false))
    }
}

fn display_name(entity: &ContentEntity) -> &str {
    entity
        .text("title")
        .filter(|t| !t.is_empty())
        .or(Some(entity.name.as_str()).filter(|n| !n.is_empty()))
        .unwrap_or(entity.codename.as_str())
}

/// Class prefix for a disclaimer component, `None` for anything else.
/// Promotional disclaimers use the burgundy theme.
fn disclaimer_theme(entity: &ContentEntity) -> Option<&'static str> {
    let promotional = entity.is_type("promotional_disclaimer")
        || (entity.is_type("disclaimer")
            && entity
                .choices("type")
                .iter()
                .any(|c| c.codename.as_str() == "promotional"));
    if promotional {
        Some("burgundy-theme ")
    } else if entity.is_type("informational_disclaimer") || entity.is_type("disclaimer") {
        Some("")
    } else {
        None
    }
}

/// Names of the selected options or taxonomy terms of an element.
fn term_names<'a>(entity: &'a ContentEntity, element: &str) -> Vec<&'a str> {
    let choices = entity.choices(element).iter().map(|c| c.name.as_str());
    let terms = entity.taxonomy(element).iter().map(|t| t.name.as_str());
    choices.chain(terms).collect()
}
