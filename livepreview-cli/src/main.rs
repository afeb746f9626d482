//! Live preview page renderer
//!
//! Fetches a page from the delivery API and prints it as HTML annotated for
//! the editor. With `--watch`, editor events are read from stdin as JSON
//! lines and the page is re-rendered after each applied change.
//!
//! Usage:
//!   livepreview landing --lang es --preview
//!   livepreview course intro_to_care --preview --watch < events.jsonl
//!
//! Configuration comes from `KONTENT_ENVIRONMENT_ID`,
//! `KONTENT_PREVIEW_API_KEY`, `KONTENT_COLLECTION` and
//! `CLOUDINARY_CLOUD_NAME`.

use anyhow::{Context, Result};
use clap::Parser;
use livepreview_annotate::Annotator;
use livepreview_cli::{LineConnector, PageKind, PageSource, Renderer};
use livepreview_delivery::{DeliveryConfig, HttpDeliveryClient, PageLoader};
use livepreview_sync::{
    ContentCache, DeliveryFetcher, LivePage, PreviewConfig, PreviewSession, RefreshPolicy,
    SessionState, TreePatcher,
};
use livepreview_types::{Codename, LanguageCodename, NavigationContext};
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "livepreview")]
#[command(about = "Render live preview pages with editor annotations")]
struct Args {
    /// Page to render
    #[arg(value_enum)]
    page: PageKind,

    /// Video course codename, for the course page
    #[arg(default_value = "")]
    slug: String,

    /// Language codename
    #[arg(short, long)]
    lang: Option<String>,

    /// Query unpublished content and connect to the editor
    #[arg(short, long)]
    preview: bool,

    /// Collection overriding the configured one
    #[arg(short, long)]
    collection: Option<String>,

    /// Keep running and apply editor events read from stdin
    #[arg(short, long)]
    watch: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn context(&self) -> NavigationContext {
        NavigationContext {
            path: self.page.path(&self.slug),
            language: self
                .lang
                .clone()
                .filter(|l| !l.is_empty())
                .map(LanguageCodename::new)
                .unwrap_or_default(),
            preview: self.preview,
            collection: self.collection.clone().map(Codename::new),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(log_level).into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let ctx = args.context();
    let config = DeliveryConfig::from_env()
        .context("failed to load delivery configuration")?
        .with_preview(ctx.preview);
    let client = Arc::new(
        HttpDeliveryClient::new(config.clone()).context("failed to create delivery client")?,
    );
    let source = Arc::new(PageSource::new(
        PageLoader::new(client.clone(), &config),
        args.page,
        args.slug.clone(),
        ctx.clone(),
    ));

    let tree = source.fetch().await.context("failed to load page")?;
    let renderer = Renderer::new(
        Annotator::from_context(&ctx, Some(config.environment_id.clone())),
        ctx.clone(),
        config.cloudinary_cloud_name.clone(),
    );
    println!("{}", renderer.render(args.page, tree.as_ref()));

    if !args.watch {
        return Ok(());
    }

    let connector = Arc::new(LineConnector::stdin());
    let session = PreviewSession::new(
        PreviewConfig::for_project(config.environment_id.clone()),
        connector.clone(),
    );
    let state = session.navigate(&ctx).await;
    if state != SessionState::Active {
        warn!("Live preview is {:?}; run with --preview to follow editor changes", state);
        return Ok(());
    }

    let cache = Arc::new(ContentCache::new());
    cache.bind(&ctx);
    let page = LivePage::builder(
        TreePatcher::new(cache),
        Arc::new(DeliveryFetcher::new(client, ctx.language.clone())),
    )
    .initial(tree)
    .refresh_policy(RefreshPolicy::Refetch(source.clone()))
    .spawn(&session);

    let mut updates = page.watch();
    updates.borrow_and_update();
    connector.listen();
    info!("Following editor events from stdin");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let tree = updates.borrow_and_update().clone();
                println!("{}", renderer.render(args.page, tree.as_ref()));
            }
            _ = connector.refresh_requested() => {
                info!("Editor requested a full refresh");
                page.reload(source.clone());
            }
            _ = connector.closed() => {
                page.settled().await;
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    if updates.has_changed().unwrap_or(false) {
        let tree = updates.borrow_and_update().clone();
        println!("{}", renderer.render(args.page, tree.as_ref()));
    }
    session.destroy();
    Ok(())
}
