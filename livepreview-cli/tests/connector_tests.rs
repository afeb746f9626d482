use livepreview_cli::LineConnector;
use livepreview_sync::{PreviewConfig, PreviewSession, SessionState};
use livepreview_types::{ItemId, NavigationContext, RefreshEvent, RefreshMetadata};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn connector(lines: &[&str]) -> Arc<LineConnector> {
    Arc::new(LineConnector::new(Cursor::new(lines.join("\n").into_bytes())))
}

fn preview() -> NavigationContext {
    NavigationContext::parse("/?preview=true").unwrap()
}

const UPDATE_A: &str =
    r#"{"type":"update","data":{"changes":[{"itemId":"a","elements":["title"]}]}}"#;
const UPDATE_B: &str =
    r#"{"type":"update","data":{"changes":[{"itemId":"b","elements":["body"]}]}}"#;
const MANUAL_REFRESH: &str =
    r#"{"type":"refresh","data":{"event":{},"metadata":{"manualRefresh":true}}}"#;

#[tokio::test]
async fn lines_are_delivered_as_updates() {
    let connector = connector(&[UPDATE_A, "", "not json", UPDATE_B]);
    let session = PreviewSession::new(PreviewConfig::for_project("proj"), connector.clone());
    assert_eq!(session.start(&preview()).await, SessionState::Active);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = session.on_update(move |event| sink.lock().unwrap().extend(event.item_ids()));

    connector.listen();
    connector.closed().await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![ItemId::from("a"), ItemId::from("b")]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn input_waits_for_listeners() {
    let connector = connector(&[UPDATE_A, UPDATE_B]);
    let session = PreviewSession::new(PreviewConfig::for_project("proj"), connector.clone());
    assert_eq!(session.start(&preview()).await, SessionState::Active);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = session.on_update(move |event| sink.lock().unwrap().extend(event.item_ids()));
    connector.listen();
    connector.closed().await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![ItemId::from("a"), ItemId::from("b")]
    );
}

#[tokio::test]
async fn manual_refresh_surfaces_as_refresh_request() {
    let connector = connector(&[MANUAL_REFRESH]);
    let session = PreviewSession::new(PreviewConfig::for_project("proj"), connector.clone());
    session.start(&preview()).await;

    connector.listen();
    connector.closed().await;
    connector.refresh_requested().await;
}

#[tokio::test]
async fn refresh_listener_can_skip_default_refresh() {
    let connector = connector(&[MANUAL_REFRESH]);
    let session = PreviewSession::new(PreviewConfig::for_project("proj"), connector.clone());
    session.start(&preview()).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = session.on_refresh(move |_: &RefreshEvent, metadata: RefreshMetadata, _| {
        sink.lock().unwrap().push(metadata.manual_refresh);
    });
    connector.listen();
    connector.closed().await;

    assert_eq!(*seen.lock().unwrap(), vec![true]);
}

#[tokio::test]
async fn input_backs_a_single_connection() {
    let connector = connector(&[]);
    let session = PreviewSession::new(PreviewConfig::for_project("proj"), connector.clone());

    assert_eq!(session.start(&preview()).await, SessionState::Active);
    assert_eq!(
        session.start(&NavigationContext::parse("/?lang=es&preview=true").unwrap()).await,
        SessionState::Disabled
    );
}

#[tokio::test]
async fn outside_preview_input_is_untouched() {
    let connector = connector(&[UPDATE_A]);
    let session = PreviewSession::new(PreviewConfig::for_project("proj"), connector.clone());

    assert_eq!(
        session.start(&NavigationContext::parse("/").unwrap()).await,
        SessionState::Disabled
    );
    assert_eq!(session.start(&preview()).await, SessionState::Active);
}
