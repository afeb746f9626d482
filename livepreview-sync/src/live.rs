//! Live page controller.
//!
//! Binds a loaded tree to a preview session. Update events are queued in
//! arrival order and patched one at a time on a worker task, so the last
//! event to arrive is the last one applied regardless of how long each
//! fetch takes. Readers observe the current tree through a watch channel.

use crate::patcher::{ItemFetcher, TreePatcher};
use crate::session::{PreviewSession, RefreshHandle, SessionToken, Subscription};
use async_trait::async_trait;
use livepreview_delivery::DeliveryResult;
use livepreview_model::ResolvedTree;
use livepreview_types::{RefreshEvent, RefreshMetadata, UpdateEvent};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reloads a page's tree from scratch.
#[async_trait]
pub trait TreeLoader: Send + Sync {
    async fn load(&self) -> DeliveryResult<Option<ResolvedTree>>;
}

/// What to do on an automatic refresh. A manual refresh always runs the
/// editor's default refresh.
#[derive(Clone, Default)]
pub enum RefreshPolicy {
    /// Updates already keep the tree current.
    #[default]
    Ignore,
    /// Reload the whole tree.
    Refetch(Arc<dyn TreeLoader>),
}

impl fmt::Debug for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshPolicy::Ignore => f.write_str("Ignore"),
            RefreshPolicy::Refetch(_) => f.write_str("Refetch"),
        }
    }
}

enum Command {
    Update(UpdateEvent),
    Reload(Arc<dyn TreeLoader>),
    Barrier(oneshot::Sender<()>),
}

/// Builder for [`LivePage`].
pub struct LivePageBuilder {
    patcher: TreePatcher,
    fetcher: Arc<dyn ItemFetcher>,
    initial: Option<ResolvedTree>,
    policy: RefreshPolicy,
}

impl LivePageBuilder {
    #[must_use]
    pub fn initial(mut self, tree: Option<ResolvedTree>) -> Self {
        self.initial = tree;
        self
    }

    #[must_use]
    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Subscribes to `session` and starts the worker. Must be called within
    /// a Tokio runtime. When the session is not active the page stays static.
    pub fn spawn(self, session: &PreviewSession) -> LivePage {
        let (tree_tx, tree_rx) = watch::channel(self.initial);
        if let Some(tree) = tree_rx.borrow().as_ref() {
            self.patcher.cache().seed(tree);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let token = session.token();

        let update_tx = tx.clone();
        let on_update = session.on_update(move |event: &UpdateEvent| {
            if update_tx.send(Command::Update(event.clone())).is_err() {
                debug!("Live page stopped, dropping update");
            }
        });

        let refresh_tx = tx.clone();
        let policy = self.policy;
        let on_refresh = session.on_refresh(
            move |_: &RefreshEvent, metadata: RefreshMetadata, handle: &RefreshHandle| {
                if metadata.manual_refresh {
                    handle.invoke();
                    return;
                }
                match &policy {
                    RefreshPolicy::Ignore => debug!("Ignoring automatic refresh"),
                    RefreshPolicy::Refetch(loader) => {
                        let _ = refresh_tx.send(Command::Reload(loader.clone()));
                    }
                }
            },
        );

        let worker = Worker {
            patcher: self.patcher,
            fetcher: self.fetcher,
            token,
            tree_tx,
        };
        let handle = tokio::spawn(worker.run(rx));

        LivePage {
            tree_rx,
            tx,
            subscriptions: vec![on_update, on_refresh],
            worker: handle,
        }
    }
}

/// A page whose content tree follows editor updates.
pub struct LivePage {
    tree_rx: watch::Receiver<Option<ResolvedTree>>,
    tx: mpsc::UnboundedSender<Command>,
    subscriptions: Vec<Subscription>,
    worker: JoinHandle<()>,
}

impl LivePage {
    pub fn builder(patcher: TreePatcher, fetcher: Arc<dyn ItemFetcher>) -> LivePageBuilder {
        LivePageBuilder {
            patcher,
            fetcher,
            initial: None,
            policy: RefreshPolicy::default(),
        }
    }

    /// The current tree.
    pub fn tree(&self) -> Option<ResolvedTree> {
        self.tree_rx.borrow().clone()
    }

    /// A receiver notified whenever the tree is replaced.
    pub fn watch(&self) -> watch::Receiver<Option<ResolvedTree>> {
        self.tree_rx.clone()
    }

    /// Whether editor events reach this page.
    pub fn is_live(&self) -> bool {
        self.subscriptions.iter().all(Subscription::is_active)
    }

    /// Queues an update as if the editor had sent it.
    pub fn push_update(&self, event: UpdateEvent) {
        let _ = self.tx.send(Command::Update(event));
    }

    /// Queues a full reload through `loader`, behind any pending updates.
    pub fn reload(&self, loader: Arc<dyn TreeLoader>) {
        let _ = self.tx.send(Command::Reload(loader));
    }

    /// Waits until every event queued so far has been processed.
    pub async fn settled(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Command::Barrier(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

impl Drop for LivePage {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

impl fmt::Debug for LivePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivePage")
            .field("live", &self.is_live())
            .field("items", &self.tree_rx.borrow().as_ref().map(ResolvedTree::len))
            .finish()
    }
}

struct Worker {
    patcher: TreePatcher,
    fetcher: Arc<dyn ItemFetcher>,
    token: SessionToken,
    tree_tx: watch::Sender<Option<ResolvedTree>>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Update(event) => self.apply(event).await,
                Command::Reload(loader) => self.reload(loader.as_ref()).await,
                Command::Barrier(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!("Live page worker stopped");
    }

    async fn apply(&self, event: UpdateEvent) {
        let current = self.tree_tx.borrow().clone();
        match self
            .patcher
            .apply_update(current.as_ref(), &event, self.fetcher.as_ref())
            .await
        {
            Ok(Some(tree)) => self.publish(tree),
            Ok(None) => {}
            Err(e) => warn!("Failed to apply update, keeping current tree: {}", e),
        }
    }

    async fn reload(&self, loader: &dyn TreeLoader) {
        match loader.load().await {
            Ok(tree) => {
                if !self.token.is_current() {
                    debug!("Session ended during reload, discarding result");
                    return;
                }
                info!("Reloaded page tree");
                self.patcher.cache().clear();
                if let Some(tree) = &tree {
                    self.patcher.cache().seed(tree);
                }
                self.tree_tx.send_replace(tree);
            }
            Err(e) => warn!("Failed to reload page, keeping current tree: {}", e),
        }
    }

    fn publish(&self, tree: ResolvedTree) {
        if !self.token.is_current() {
            debug!("Session ended during patch, discarding result");
            return;
        }
        let changed = self.tree_tx.borrow().as_ref() != Some(&tree);
        if changed {
            self.tree_tx.send_replace(Some(tree));
        } else {
            debug!("Patch produced an identical tree");
        }
    }
}
