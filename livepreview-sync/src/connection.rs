//! Editing-frame connection abstraction.
//!
//! The editor talks to the rendered page through a connection created for
//! one project and language. A [`FrameConnector`] establishes it; events
//! flow back through the [`EventSink`] handed over at connect time.

use crate::error::PreviewResult;
use crate::session::EventSink;
use async_trait::async_trait;
use livepreview_types::{LanguageCodename, ProjectId};

/// Parameters a connection is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub project_id: ProjectId,
    pub language: LanguageCodename,
}

/// Establishes connections to the editing frame.
#[async_trait]
pub trait FrameConnector: Send + Sync {
    /// Whether the node the editor attaches to exists yet.
    fn anchor_ready(&self) -> bool;

    /// Opens a connection. Events must be delivered through `sink`.
    async fn connect(
        &self,
        params: ConnectParams,
        sink: EventSink,
    ) -> PreviewResult<Box<dyn FrameConnection>>;
}

/// An open connection to the editing frame.
pub trait FrameConnection: Send + Sync {
    /// Asks the host page to reload, the editor's built-in refresh. Called
    /// without any session lock held.
    fn default_refresh(&self);

    /// Releases the connection. Called at most once by the session.
    fn destroy(&self);
}

/// A scriptable connector for tests.
pub mod mock {
    use super::*;
    use crate::error::PreviewError;
    use livepreview_types::{FrameEvent, RefreshEvent, RefreshMetadata, UpdateEvent};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
    use std::time::Duration;

    #[derive(Default)]
    struct MockState {
        anchor_missing_checks: usize,
        failures: VecDeque<String>,
        connect_delay: Option<Duration>,
        sinks: Vec<EventSink>,
        params: Vec<ConnectParams>,
        anchor_checks: usize,
        connects: usize,
        destroys: usize,
        refreshes: usize,
    }

    /// Records connector activity and lets tests emit editor events.
    /// Clones share state.
    #[derive(Clone, Default)]
    pub struct MockConnector {
        state: Arc<Mutex<MockState>>,
    }

    impl MockConnector {
        pub fn new() -> Self {
            Self::default()
        }

        fn state(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// The anchor reports missing for the next `checks` checks.
        pub fn anchor_missing_for(&self, checks: usize) {
            self.state().anchor_missing_checks = checks;
        }

        /// Makes the next connect attempt fail.
        pub fn fail_next(&self, message: impl Into<String>) {
            self.state().failures.push_back(message.into());
        }

        /// Delays every connect attempt.
        pub fn set_connect_delay(&self, delay: Duration) {
            self.state().connect_delay = Some(delay);
        }

        /// Delivers `event` through the most recent connection's sink.
        /// Returns whether the session accepted it.
        pub fn emit(&self, event: FrameEvent) -> bool {
            let sink = self.state().sinks.last().cloned();
            sink.is_some_and(|sink| sink.emit(event))
        }

        pub fn emit_update(&self, event: UpdateEvent) -> bool {
            self.emit(FrameEvent::Update(event))
        }

        pub fn emit_refresh(&self, event: RefreshEvent, metadata: RefreshMetadata) -> bool {
            self.emit(FrameEvent::Refresh { event, metadata })
        }

        pub fn anchor_checks(&self) -> usize {
            self.state().anchor_checks
        }

        pub fn connect_count(&self) -> usize {
            self.state().connects
        }

        pub fn destroy_count(&self) -> usize {
            self.state().destroys
        }

        pub fn default_refresh_count(&self) -> usize {
            self.state().refreshes
        }

        pub fn last_params(&self) -> Option<ConnectParams> {
            self.state().params.last().cloned()
        }
    }

    #[async_trait]
    impl FrameConnector for MockConnector {
        fn anchor_ready(&self) -> bool {
            let mut state = self.state();
            state.anchor_checks += 1;
            if state.anchor_missing_checks > 0 {
                state.anchor_missing_checks -= 1;
                return false;
            }
            true
        }

        async fn connect(
            &self,
            params: ConnectParams,
            sink: EventSink,
        ) -> PreviewResult<Box<dyn FrameConnection>> {
            let delay = self.state().connect_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut state = self.state();
            state.params.push(params);
            if let Some(message) = state.failures.pop_front() {
                return Err(PreviewError::Connection(message));
            }
            state.connects += 1;
            state.sinks.push(sink);
            Ok(Box::new(MockConnection {
                state: self.state.clone(),
                destroyed: AtomicBool::new(false),
            }))
        }
    }

    struct MockConnection {
        state: Arc<Mutex<MockState>>,
        destroyed: AtomicBool,
    }

    impl FrameConnection for MockConnection {
        fn default_refresh(&self) {
            if !self.destroyed.load(Ordering::SeqCst) {
                self.state.lock().unwrap_or_else(PoisonError::into_inner).refreshes += 1;
            }
        }

        fn destroy(&self) {
            if !self.destroyed.swap(true, Ordering::SeqCst) {
                self.state.lock().unwrap_or_else(PoisonError::into_inner).destroys += 1;
            }
        }
    }
}
