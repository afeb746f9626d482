//! Editor connection over newline-delimited JSON.
//!
//! Each input line is one [`FrameEvent`] in its wire form. Blank lines are
//! skipped and malformed lines are logged and dropped. Nothing is read until
//! [`LineConnector::listen`] is called, so listeners registered after the
//! session connects still see every line. The editor's default
//! refresh has no page to reload here, so it is surfaced through
//! [`LineConnector::refresh_requested`] for the caller to act on.

use async_trait::async_trait;
use livepreview_sync::{
    ConnectParams, EventSink, FrameConnection, FrameConnector, PreviewError, PreviewResult,
};
use livepreview_types::FrameEvent;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

type Input = Box<dyn AsyncBufRead + Send + Unpin>;

/// Connects once, reading editor events from an async line source.
pub struct LineConnector {
    input: Mutex<Option<Input>>,
    listening: Arc<Notify>,
    refresh: Arc<Notify>,
    closed: Arc<Notify>,
}

impl LineConnector {
    pub fn new(input: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        Self {
            input: Mutex::new(Some(Box::new(input))),
            listening: Arc::new(Notify::new()),
            refresh: Arc::new(Notify::new()),
            closed: Arc::new(Notify::new()),
        }
    }

    /// Reads events from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }

    /// Starts reading input once a connection exists. Call after every
    /// listener is registered.
    pub fn listen(&self) {
        self.listening.notify_one();
    }

    /// Resolves when the editor asked for its default refresh.
    pub async fn refresh_requested(&self) {
        self.refresh.notified().await;
    }

    /// Resolves once the input is exhausted.
    pub async fn closed(&self) {
        self.closed.notified().await;
    }
}

#[async_trait]
impl FrameConnector for LineConnector {
    /// The input can back exactly one connection.
    fn anchor_ready(&self) -> bool {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn connect(
        &self,
        params: ConnectParams,
        sink: EventSink,
    ) -> PreviewResult<Box<dyn FrameConnection>> {
        let input = self
            .input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| PreviewError::Connection("input already consumed".into()))?;

        info!(
            "Reading editor events for project {} ({})",
            params.project_id, params.language
        );
        let listening = self.listening.clone();
        let closed = self.closed.clone();
        let task = tokio::spawn(async move {
            listening.notified().await;
            pump(input, sink).await;
            closed.notify_one();
        });

        Ok(Box::new(LineConnection {
            task,
            refresh: self.refresh.clone(),
        }))
    }
}

async fn pump(input: Input, sink: EventSink) {
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read editor input: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match FrameEvent::from_json(line) {
            Ok(event) => {
                if !sink.emit(event) {
                    warn!("Editor event reached no listener");
                }
            }
            Err(e) => warn!("Ignoring malformed editor message: {}", e),
        }
    }
    info!("Editor input closed");
}

struct LineConnection {
    task: JoinHandle<()>,
    refresh: Arc<Notify>,
}

impl FrameConnection for LineConnection {
    fn default_refresh(&self) {
        self.refresh.notify_one();
    }

    fn destroy(&self) {
        self.task.abort();
    }
}
