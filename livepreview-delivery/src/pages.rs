//! Page loaders.
//!
//! Each loader issues one delivery query and turns a missing-content error
//! into "no content". Transport faults still propagate to the caller.

use crate::client::DeliveryClient;
use crate::config::DeliveryConfig;
use crate::error::DeliveryResult;
use crate::query::ContentQuery;
use livepreview_model::{ContentEntity, ResolvedTree};
use livepreview_types::{Codename, NavigationContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const LANDING_PAGE_TYPE: &str = "landing_page";
pub const VIDEO_COURSE_TYPE: &str = "video_course";
pub const NAVIGATION_TYPE: &str = "_navigation";
pub const LINK_TYPE: &str = "link";
pub const PAGE_TYPE: &str = "page";

/// Linked item depth requested for page trees.
pub const PAGE_DEPTH: u32 = 3;

/// One entry of the header menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLink {
    pub name: String,
    pub link: String,
}

impl MenuLink {
    /// Maps a navigation entry by content type.
    pub fn from_entity(entity: &ContentEntity) -> Self {
        let (name, link) = match entity.content_type.as_str() {
            LINK_TYPE => (entity.text("display_text"), entity.text("link_url")),
            PAGE_TYPE => (entity.text("headline"), entity.text("url")),
            LANDING_PAGE_TYPE => (Some("Landing Page"), Some("/")),
            _ => (None, None),
        };
        Self {
            name: name.filter(|n| !n.is_empty()).unwrap_or("Untitled").to_string(),
            link: link.filter(|l| !l.is_empty()).unwrap_or("#").to_string(),
        }
    }
}

/// Loads the pages of the site through a [`DeliveryClient`].
pub struct PageLoader<C> {
    client: C,
    default_collection: Codename,
}

impl<C: DeliveryClient> PageLoader<C> {
    pub fn new(client: C, config: &DeliveryConfig) -> Self {
        Self {
            client,
            default_collection: config.collection.clone(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// The collection for this navigation: the URL override, else the
    /// configured default.
    pub fn collection<'a>(&'a self, ctx: &'a NavigationContext) -> &'a Codename {
        ctx.collection.as_ref().unwrap_or(&self.default_collection)
    }

    pub fn landing_page_query(&self, ctx: &NavigationContext) -> ContentQuery {
        ContentQuery::new()
            .of_type(LANDING_PAGE_TYPE)
            .limit(1)
            .depth(PAGE_DEPTH)
            .collection(self.collection(ctx).clone())
            .language(ctx.language.clone())
    }

    pub fn video_course_query(&self, slug: &str, ctx: &NavigationContext) -> ContentQuery {
        ContentQuery::new()
            .of_type(VIDEO_COURSE_TYPE)
            .equals("system.codename", slug)
            .language(ctx.language.clone())
            .depth(PAGE_DEPTH)
    }

    pub fn navigation_query(&self, ctx: &NavigationContext) -> ContentQuery {
        ContentQuery::new()
            .of_type(NAVIGATION_TYPE)
            .limit(1)
            .language(ctx.language.clone())
            .collections([self.collection(ctx).clone()])
    }

    /// The landing page of the current collection.
    pub async fn landing_page(&self, ctx: &NavigationContext) -> DeliveryResult<Option<ResolvedTree>> {
        let query = self.landing_page_query(ctx);
        let page = missing_as(self.client.query(&query).await.map(Some), None)?;
        let tree = page.and_then(|p| p.first_tree());
        if tree.is_none() {
            info!("No landing page in collection {}", self.collection(ctx));
        }
        Ok(tree)
    }

    /// The video course whose codename is `slug`.
    pub async fn video_course(
        &self,
        slug: &str,
        ctx: &NavigationContext,
    ) -> DeliveryResult<Option<ResolvedTree>> {
        if slug.is_empty() {
            return Ok(None);
        }
        let query = self.video_course_query(slug, ctx);
        let Some(page) = missing_as(self.client.query(&query).await.map(Some), None)? else {
            return Ok(None);
        };
        if page.is_empty() {
            self.log_available_courses(slug, ctx).await?;
        }
        Ok(page.first_tree())
    }

    async fn log_available_courses(&self, slug: &str, ctx: &NavigationContext) -> DeliveryResult<()> {
        let query = ContentQuery::new()
            .of_type(VIDEO_COURSE_TYPE)
            .language(ctx.language.clone());
        let available = missing_as(self.client.query(&query).await.map(Some), None)?;
        let codenames: Vec<String> = available
            .iter()
            .flat_map(|page| page.items.iter())
            .map(|course| match course.text("course_title") {
                Some(title) => format!("{} ({})", course.codename, title),
                None => course.codename.to_string(),
            })
            .collect();
        debug!(
            "No video course with codename {}; available courses: {:?}",
            slug, codenames
        );
        Ok(())
    }

    /// The navigation item with its linked menu entries.
    pub async fn navigation_tree(&self, ctx: &NavigationContext) -> DeliveryResult<Option<ResolvedTree>> {
        let query = self.navigation_query(ctx);
        missing_as(self.client.query(&query).await.map(|p| p.first_tree()), None)
    }

    /// Header menu entries.
    pub async fn navigation(&self, ctx: &NavigationContext) -> DeliveryResult<Vec<MenuLink>> {
        Ok(self
            .navigation_tree(ctx)
            .await?
            .map(|tree| menu_links(&tree))
            .unwrap_or_default())
    }
}

/// Maps the `header_navigation` entries of a navigation tree.
pub fn menu_links(tree: &ResolvedTree) -> Vec<MenuLink> {
    tree.linked(tree.root(), "header_navigation")
        .into_iter()
        .map(|entry| MenuLink::from_entity(entry))
        .collect()
}

/// Replaces a missing-content error with `fallback`.
fn missing_as<T>(result: DeliveryResult<T>, fallback: T) -> DeliveryResult<T> {
    match result {
        Err(e) if e.is_content_missing() => {
            debug!("Treating delivery error as no content: {}", e);
            Ok(fallback)
        }
        other => other,
    }
}
