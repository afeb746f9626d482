//! Preview session manager.
//!
//! A session owns the connection to the editing frame for one navigation
//! context and is the only way to observe editor events. Its states:
//!
//! ```text
//! Uninitialized -> Detecting -> Disabled
//!                            -> Initializing -> Active
//!                                            -> Disabled
//! (any) -> Destroyed
//! ```
//!
//! Every (re)initialization bumps a generation counter. Work that started
//! under an older generation, such as a slow connect or an event from a
//! replaced connection, is discarded when it completes.

use crate::connection::{ConnectParams, FrameConnection, FrameConnector};
use crate::error::PreviewError;
use livepreview_types::{
    FrameEvent, NavigationContext, ProjectId, RefreshEvent, RefreshMetadata, UpdateEvent,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a [`PreviewSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    Detecting,
    Disabled,
    Initializing,
    Active,
    Destroyed,
}

/// Configuration for the preview session.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Project the editor connection is keyed by. Detection does not start
    /// without one.
    pub project_id: Option<ProjectId>,
    /// Delay before re-checking a missing anchor node.
    pub anchor_retry_delay: Duration,
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            anchor_retry_delay: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl PreviewConfig {
    pub fn for_project(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }
}

type UpdateListener = Arc<dyn Fn(&UpdateEvent) + Send + Sync>;
type RefreshListener = Arc<dyn Fn(&RefreshEvent, RefreshMetadata, &RefreshHandle) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    update: Vec<(u64, UpdateListener)>,
    refresh: Vec<(u64, RefreshListener)>,
}

impl Listeners {
    fn clear(&mut self) -> usize {
        let count = self.update.len() + self.refresh.len();
        self.update.clear();
        self.refresh.clear();
        count
    }
}

struct Inner {
    state: SessionState,
    generation: u64,
    context: Option<NavigationContext>,
    connection: Option<Arc<dyn FrameConnection>>,
}

struct Shared {
    inner: Mutex<Inner>,
    listeners: RwLock<Listeners>,
}

impl Shared {
    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        let inner = self.inner();
        inner.generation == generation && inner.state == SessionState::Active
    }

    fn clear_listeners(&self) -> usize {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear()
    }

    fn remove_listener(&self, id: u64) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.update.retain(|(lid, _)| *lid != id);
        listeners.refresh.retain(|(lid, _)| *lid != id);
    }
}

/// Identifies one generation of an active session.
///
/// Held by anything that must stop acting once the session it was created
/// for is torn down or replaced.
#[derive(Clone)]
pub struct SessionToken {
    shared: Weak<Shared>,
    generation: u64,
}

impl SessionToken {
    /// True while the session is active in the same generation.
    pub fn is_current(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.is_current(self.generation))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("generation", &self.generation)
            .finish()
    }
}

/// Where a connection delivers editor events.
#[derive(Clone, Debug)]
pub struct EventSink {
    token: SessionToken,
}

impl EventSink {
    /// Dispatches `event` to the session's listeners. Events for a session
    /// that is gone, inactive or replaced are dropped. Returns whether the
    /// event was handled: an update needs at least one listener, a refresh
    /// a listener or the default refresh.
    pub fn emit(&self, event: FrameEvent) -> bool {
        let Some(shared) = self.token.shared.upgrade() else {
            return false;
        };
        if !shared.is_current(self.token.generation) {
            debug!("Dropping editor event for stale session");
            return false;
        }

        match event {
            FrameEvent::Update(update) => {
                let listeners: Vec<UpdateListener> = {
                    let guard = shared.listeners.read().unwrap_or_else(PoisonError::into_inner);
                    guard.update.iter().map(|(_, l)| l.clone()).collect()
                };
                debug!(
                    "Dispatching update for {} item(s) to {} listener(s)",
                    update.changes.len(),
                    listeners.len()
                );
                if listeners.is_empty() {
                    return false;
                }
                for listener in listeners {
                    listener(&update);
                }
            }
            FrameEvent::Refresh { event, metadata } => {
                let listeners: Vec<RefreshListener> = {
                    let guard = shared.listeners.read().unwrap_or_else(PoisonError::into_inner);
                    guard.refresh.iter().map(|(_, l)| l.clone()).collect()
                };
                let handle = RefreshHandle {
                    token: self.token.clone(),
                };
                if listeners.is_empty() {
                    return metadata.manual_refresh && handle.invoke();
                }
                for listener in listeners {
                    listener(&event, metadata, &handle);
                }
            }
        }
        true
    }
}

/// Invokes the editor's default refresh for the session it came from.
#[derive(Clone, Debug)]
pub struct RefreshHandle {
    token: SessionToken,
}

impl RefreshHandle {
    /// Returns whether the refresh reached a live connection.
    pub fn invoke(&self) -> bool {
        let Some(shared) = self.token.shared.upgrade() else {
            return false;
        };
        let connection = {
            let inner = shared.inner();
            if inner.generation != self.token.generation || inner.state != SessionState::Active {
                return false;
            }
            inner.connection.clone()
        };
        match connection {
            Some(connection) => {
                info!("Running default refresh");
                connection.default_refresh();
                true
            }
            None => false,
        }
    }
}

/// Disposer for a listener. Dropping it unregisters the listener.
#[must_use = "dropping a subscription unregisters its listener"]
pub struct Subscription {
    shared: Weak<Shared>,
    id: Option<u64>,
}

impl Subscription {
    fn inert() -> Self {
        Self {
            shared: Weak::new(),
            id: None,
        }
    }

    /// Whether a listener was actually registered.
    pub fn is_active(&self) -> bool {
        self.id.is_some() && self.shared.strong_count() > 0
    }

    /// Unregisters the listener now. Same as dropping.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let (Some(id), Some(shared)) = (self.id.take(), self.shared.upgrade()) {
            shared.remove_listener(id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// The connection lifecycle for one page.
pub struct PreviewSession {
    shared: Arc<Shared>,
    connector: Arc<dyn FrameConnector>,
    config: PreviewConfig,
}

impl PreviewSession {
    pub fn new(config: PreviewConfig, connector: Arc<dyn FrameConnector>) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: SessionState::Uninitialized,
                    generation: 0,
                    context: None,
                    connection: None,
                }),
                listeners: RwLock::new(Listeners::default()),
            }),
            connector,
            config,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.shared.inner().state
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    pub fn generation(&self) -> u64 {
        self.shared.inner().generation
    }

    pub fn context(&self) -> Option<NavigationContext> {
        self.shared.inner().context.clone()
    }

    /// Token for the current generation.
    pub fn token(&self) -> SessionToken {
        SessionToken {
            shared: Arc::downgrade(&self.shared),
            generation: self.generation(),
        }
    }

    pub fn listener_count(&self) -> usize {
        let listeners = self.shared.listeners.read().unwrap_or_else(PoisonError::into_inner);
        listeners.update.len() + listeners.refresh.len()
    }

    /// Brings the session in line with `ctx`. Restarts only when the
    /// language or preview flag changed, or the session never started.
    pub async fn navigate(&self, ctx: &NavigationContext) -> SessionState {
        {
            let inner = self.shared.inner();
            if inner.state == SessionState::Destroyed {
                return inner.state;
            }
            let same_key = inner
                .context
                .as_ref()
                .is_some_and(|current| current.session_key() == ctx.session_key());
            if same_key && inner.state != SessionState::Uninitialized {
                debug!("Session context unchanged, keeping session");
                return inner.state;
            }
        }
        self.start(ctx).await
    }

    /// Tears down any current connection and initializes for `ctx`.
    ///
    /// Never fails: faults while connecting are logged and leave the
    /// session `Disabled`.
    pub async fn start(&self, ctx: &NavigationContext) -> SessionState {
        let (generation, old) = {
            let mut inner = self.shared.inner();
            if inner.state == SessionState::Destroyed {
                return inner.state;
            }
            inner.generation += 1;
            inner.context = Some(ctx.clone());
            inner.state = SessionState::Uninitialized;
            (inner.generation, inner.connection.take())
        };
        self.teardown(old);

        let Some(project_id) = self.config.project_id.clone() else {
            warn!("No project id configured, live preview unavailable");
            return SessionState::Uninitialized;
        };

        self.transition(generation, SessionState::Detecting);
        if !ctx.preview {
            info!("Not in preview mode, skipping editor connection");
            return self.transition(generation, SessionState::Disabled);
        }

        self.transition(generation, SessionState::Initializing);
        let params = ConnectParams {
            project_id,
            language: ctx.language.clone(),
        };
        match self.connect(generation, params).await {
            Ok(connection) => {
                let mut inner = self.shared.inner();
                if inner.generation != generation {
                    drop(inner);
                    debug!("Session changed while connecting, discarding connection");
                    release(Some(connection.into()));
                    return self.state();
                }
                inner.connection = Some(connection.into());
                inner.state = SessionState::Active;
                info!("Live preview active for language {}", ctx.language);
                SessionState::Active
            }
            Err(e) => {
                if self.generation() != generation {
                    return self.state();
                }
                error!("Failed to initialize live preview: {}", e);
                self.transition(generation, SessionState::Disabled)
            }
        }
    }

    async fn connect(
        &self,
        generation: u64,
        params: ConnectParams,
    ) -> Result<Box<dyn FrameConnection>, PreviewError> {
        if !self.connector.anchor_ready() {
            debug!("Anchor not ready, retrying in {:?}", self.config.anchor_retry_delay);
            tokio::time::sleep(self.config.anchor_retry_delay).await;
            if self.generation() != generation {
                return Err(PreviewError::Connection("superseded".into()));
            }
            if !self.connector.anchor_ready() {
                warn!("Anchor element not found, skipping live preview");
                return Err(PreviewError::AnchorMissing);
            }
        }

        let sink = EventSink {
            token: SessionToken {
                shared: Arc::downgrade(&self.shared),
                generation,
            },
        };
        tokio::time::timeout(
            self.config.connect_timeout,
            self.connector.connect(params, sink),
        )
        .await
        .map_err(|_| PreviewError::Timeout)?
    }

    /// Sets `state` if `generation` is still current; returns the state the
    /// session ends up in.
    fn transition(&self, generation: u64, state: SessionState) -> SessionState {
        let mut inner = self.shared.inner();
        if inner.generation == generation {
            debug!("Session {:?} -> {:?}", inner.state, state);
            inner.state = state;
        }
        inner.state
    }

    /// Drops every listener and destroys `connection`, if any.
    fn teardown(&self, connection: Option<Arc<dyn FrameConnection>>) {
        let dropped = self.shared.clear_listeners();
        if dropped > 0 {
            debug!("Dropped {} listener(s)", dropped);
        }
        release(connection);
    }

    /// Registers an update listener. A no-op unless the session is active.
    pub fn on_update<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&UpdateEvent) + Send + Sync + 'static,
    {
        self.subscribe(|listeners, id| listeners.update.push((id, Arc::new(listener))))
    }

    /// Registers a refresh listener. A no-op unless the session is active.
    ///
    /// The listener receives the refresh metadata and a handle that runs the
    /// editor's default refresh. With no refresh listener registered, a
    /// manual refresh runs the default refresh directly.
    pub fn on_refresh<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&RefreshEvent, RefreshMetadata, &RefreshHandle) + Send + Sync + 'static,
    {
        self.subscribe(|listeners, id| listeners.refresh.push((id, Arc::new(listener))))
    }

    fn subscribe(&self, register: impl FnOnce(&mut Listeners, u64)) -> Subscription {
        let inner = self.shared.inner();
        if inner.state != SessionState::Active {
            debug!("Session is {:?}, subscription ignored", inner.state);
            return Subscription::inert();
        }
        let mut listeners = self.shared.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.next_id += 1;
        let id = listeners.next_id;
        register(&mut *listeners, id);
        Subscription {
            shared: Arc::downgrade(&self.shared),
            id: Some(id),
        }
    }

    /// Ends the session, releasing the connection and every listener.
    /// Calling it again is a no-op.
    pub fn destroy(&self) {
        let connection = {
            let mut inner = self.shared.inner();
            if inner.state == SessionState::Destroyed {
                return;
            }
            inner.generation += 1;
            inner.state = SessionState::Destroyed;
            inner.connection.take()
        };
        self.teardown(connection);
        info!("Preview session destroyed");
    }
}

fn release(connection: Option<Arc<dyn FrameConnection>>) {
    if let Some(connection) = connection {
        info!("Releasing editor connection");
        connection.destroy();
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for PreviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSession")
            .field("state", &self.state())
            .field("generation", &self.generation())
            .finish()
    }
}
