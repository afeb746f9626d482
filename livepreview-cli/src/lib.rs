//! Command-line front end for live preview.
//!
//! Loads a page through the delivery API, renders it as annotated HTML and,
//! in watch mode, keeps it current by reading editor events from stdin.

pub mod connector;
pub mod render;

use async_trait::async_trait;
use livepreview_delivery::{DeliveryClient, DeliveryResult, PageLoader};
use livepreview_model::ResolvedTree;
use livepreview_sync::TreeLoader;
use livepreview_types::NavigationContext;

pub use connector::LineConnector;
pub use render::Renderer;

/// The pages the site serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PageKind {
    Landing,
    Course,
    Navigation,
}

impl PageKind {
    /// Route the page is served under.
    pub fn path(self, slug: &str) -> String {
        match self {
            PageKind::Course => format!("/courses/{slug}"),
            PageKind::Landing | PageKind::Navigation => "/".to_string(),
        }
    }
}

/// One page of the site, loadable as a tree.
pub struct PageSource<C> {
    loader: PageLoader<C>,
    kind: PageKind,
    slug: String,
    ctx: NavigationContext,
}

impl<C: DeliveryClient> PageSource<C> {
    pub fn new(
        loader: PageLoader<C>,
        kind: PageKind,
        slug: impl Into<String>,
        ctx: NavigationContext,
    ) -> Self {
        Self {
            loader,
            kind,
            slug: slug.into(),
            ctx,
        }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn context(&self) -> &NavigationContext {
        &self.ctx
    }

    pub async fn fetch(&self) -> DeliveryResult<Option<ResolvedTree>> {
        match self.kind {
            PageKind::Landing => self.loader.landing_page(&self.ctx).await,
            PageKind::Course => self.loader.video_course(&self.slug, &self.ctx).await,
            PageKind::Navigation => self.loader.navigation_tree(&self.ctx).await,
        }
    }
}

#[async_trait]
impl<C: DeliveryClient> TreeLoader for PageSource<C> {
    async fn load(&self) -> DeliveryResult<Option<ResolvedTree>> {
        self.fetch().await
    }
}
