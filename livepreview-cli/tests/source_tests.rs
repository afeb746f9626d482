mod common;

use common::{course_response, empty_response, landing_page_response, navigation_response};
use livepreview_cli::{PageKind, PageSource};
use livepreview_delivery::{DeliveryConfig, DeliveryError, HttpDeliveryClient, PageLoader};
use livepreview_sync::TreeLoader;
use livepreview_types::NavigationContext;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> DeliveryConfig {
    DeliveryConfig {
        environment_id: "env-1".into(),
        ..DeliveryConfig::default()
    }
    .with_base_url(server.uri())
}

fn source(server: &MockServer, kind: PageKind, slug: &str) -> PageSource<HttpDeliveryClient> {
    let config = config(server);
    let client = HttpDeliveryClient::new(config.clone()).unwrap();
    let ctx = NavigationContext::parse(&kind.path(slug)).unwrap();
    PageSource::new(PageLoader::new(client, &config), kind, slug, ctx)
}

async fn respond(server: &MockServer, content_type: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(query_param("system.type", content_type))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[test]
fn page_paths() {
    assert_eq!(PageKind::Landing.path(""), "/");
    assert_eq!(PageKind::Navigation.path("ignored"), "/");
    assert_eq!(PageKind::Course.path("intro"), "/courses/intro");
}

#[tokio::test]
async fn landing_source_loads_tree() {
    let server = MockServer::start().await;
    respond(&server, "landing_page", landing_page_response()).await;

    let tree = source(&server, PageKind::Landing, "").fetch().await.unwrap().unwrap();

    assert_eq!(tree.root_id().as_str(), "lp-1");
    assert!(tree.contains("cmp-1"));
    assert!(tree.contains("vid-1"));
}

#[tokio::test]
async fn course_source_filters_by_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(query_param("system.type", "video_course"))
        .and(query_param("system.codename", "intro_to_care"))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_response()))
        .mount(&server)
        .await;

    let tree = source(&server, PageKind::Course, "intro_to_care")
        .fetch()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tree.root().text("course_title"), Some("Intro to <Care>"));
    assert_eq!(tree.len(), 3);
}

#[tokio::test]
async fn navigation_source_loads_menu_tree() {
    let server = MockServer::start().await;
    respond(&server, "_navigation", navigation_response()).await;

    let source: Arc<dyn TreeLoader> = Arc::new(source(&server, PageKind::Navigation, ""));
    let tree = source.load().await.unwrap().unwrap();

    assert_eq!(livepreview_delivery::menu_links(&tree).len(), 3);
}

#[tokio::test]
async fn empty_result_is_no_page() {
    let server = MockServer::start().await;
    respond(&server, "landing_page", empty_response()).await;

    assert!(source(&server, PageKind::Landing, "").fetch().await.unwrap().is_none());
}

#[tokio::test]
async fn api_error_is_no_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    assert!(source(&server, PageKind::Landing, "").fetch().await.unwrap().is_none());
}

#[tokio::test]
async fn transport_fault_propagates() {
    let config = DeliveryConfig {
        environment_id: "env-1".into(),
        timeout_secs: 2,
        ..DeliveryConfig::default()
    }
    .with_base_url("http://127.0.0.1:9");
    let client = HttpDeliveryClient::new(config.clone()).unwrap();
    let source = PageSource::new(
        PageLoader::new(client, &config),
        PageKind::Landing,
        "",
        NavigationContext::default(),
    );

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, DeliveryError::Http(_)));
}
