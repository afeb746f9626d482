//! Live preview synchronization core.
//!
//! Keeps a rendered page in step with edits made in the authoring tool's
//! preview frame, without reloading the page.
//!
//! # Architecture
//!
//! - **Session**: owns the editing-frame connection for one navigation
//!   context and hands out update and refresh subscriptions
//! - **Patcher**: turns an update event plus the current tree into a new
//!   tree, refetching only the entities the event made stale
//! - **Cache**: last resolved entity per id for the current page view
//! - **Live page**: runs patches serially and publishes the current tree
//!
//! ## Update flow
//!
//! 1. The editor emits an update naming changed items and elements
//! 2. The session dispatches it to the live page's listener
//! 3. The worker patches the tree, fetching stale items in batches
//! 4. If the session is still the same generation, the new tree is published
//!
//! # Example
//!
//! ```
//! use livepreview_sync::connection::mock::MockConnector;
//! use livepreview_sync::{PreviewConfig, PreviewSession, SessionState};
//! use livepreview_types::NavigationContext;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let connector = Arc::new(MockConnector::new());
//! let session = PreviewSession::new(PreviewConfig::for_project("env-1"), connector);
//!
//! let ctx = NavigationContext::parse("/?preview=true").unwrap();
//! assert_eq!(session.start(&ctx).await, SessionState::Active);
//!
//! session.destroy();
//! session.destroy();
//! assert_eq!(session.listener_count(), 0);
//! # });
//! ```

mod cache;
pub mod connection;
mod error;
mod live;
pub mod patcher;
mod session;

pub use cache::ContentCache;
pub use connection::{ConnectParams, FrameConnection, FrameConnector};
pub use error::{PatchError, PatchResult, PreviewError, PreviewResult};
pub use live::{LivePage, LivePageBuilder, RefreshPolicy, TreeLoader};
pub use patcher::{DeliveryFetcher, ItemFetcher, PatcherConfig, TreePatcher};
pub use session::{
    EventSink, PreviewConfig, PreviewSession, RefreshHandle, SessionState, SessionToken,
    Subscription,
};
