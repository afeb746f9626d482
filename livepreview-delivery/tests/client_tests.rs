mod common;

use livepreview_delivery::{ContentQuery, DeliveryClient, DeliveryConfig, DeliveryError, HttpDeliveryClient};
use livepreview_types::{ItemId, LanguageCodename, ProjectId};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> DeliveryConfig {
    DeliveryConfig {
        environment_id: ProjectId::from("env-1"),
        ..Default::default()
    }
    .with_base_url(server.uri())
}

// ── Success ──────────────────────────────────────────────────────

#[tokio::test]
async fn query_sends_pairs_and_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(query_param("system.type", "landing_page"))
        .and(query_param("limit", "1"))
        .and(query_param("depth", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::landing_page_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpDeliveryClient::new(config(&server)).unwrap();
    let query = ContentQuery::new().of_type("landing_page").limit(1).depth(3);
    let page = client.query(&query).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.linked.len(), 2);
}

#[tokio::test]
async fn preview_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::empty_response()))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config(&server).with_preview(true);
    cfg.preview_api_key = Some("secret".into());
    let client = HttpDeliveryClient::new(cfg).unwrap();
    let page = client.query(&ContentQuery::new()).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn items_by_id_uses_in_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(query_param("system.id[in]", "lp-1,other"))
        .and(query_param("language", "es"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::landing_page_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpDeliveryClient::new(config(&server)).unwrap();
    let ids = [ItemId::from("lp-1"), ItemId::from("other")];
    let entities = client
        .items_by_id(&ids, &LanguageCodename::from("es"))
        .await
        .unwrap();
    assert_eq!(entities.len(), 3);
    assert_eq!(entities[0].id.as_str(), "lp-1");
}

#[tokio::test]
async fn items_by_id_follows_links_beyond_depth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(query_param("system.id[in]", "id-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::depth_limited_response()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(query_param("system.codename[in]", "c1"))
        .and(query_param("language", "es"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::leaf_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpDeliveryClient::new(config(&server)).unwrap();
    let entities = client
        .items_by_id(&[ItemId::from("id-a")], &LanguageCodename::from("es"))
        .await
        .unwrap();

    assert_eq!(entities.len(), 3);
    let b = entities.iter().find(|e| e.id.as_str() == "id-b").unwrap();
    assert_eq!(b.linked_ids("children"), &[ItemId::from("id-c")]);
}

#[tokio::test]
async fn items_by_id_gives_up_on_unknown_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(query_param("system.id[in]", "id-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::depth_limited_response()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/env-1/items"))
        .and(query_param("system.codename[in]", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::empty_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpDeliveryClient::new(config(&server)).unwrap();
    let entities = client
        .items_by_id(&[ItemId::from("id-a")], &LanguageCodename::default())
        .await
        .unwrap();

    assert_eq!(entities.len(), 2);
    let b = entities.iter().find(|e| e.id.as_str() == "id-b").unwrap();
    assert!(b.linked_ids("children").is_empty());
}

#[tokio::test]
async fn items_by_id_with_no_ids_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = HttpDeliveryClient::new(config(&server)).unwrap();
    let entities = client
        .items_by_id(&[], &LanguageCodename::default())
        .await
        .unwrap();
    assert!(entities.is_empty());
}

// ── Errors ───────────────────────────────────────────────────────

#[tokio::test]
async fn not_found_maps_to_content_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(common::not_found_body()))
        .mount(&server)
        .await;

    let client = HttpDeliveryClient::new(config(&server)).unwrap();
    let err = client.query(&ContentQuery::new()).await.unwrap_err();
    assert!(matches!(&err, DeliveryError::NotFound(m) if m.contains("not found")));
    assert!(err.is_content_missing());
}

#[tokio::test]
async fn backend_error_keeps_status_and_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .mount(&server)
        .await;

    let client = HttpDeliveryClient::new(config(&server)).unwrap();
    let err = client.query(&ContentQuery::new()).await.unwrap_err();
    match err {
        DeliveryError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "denied");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_not_content_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpDeliveryClient::new(config(&server)).unwrap();
    let err = client.query(&ContentQuery::new()).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let server = MockServer::start().await;
    let cfg = config(&server);
    drop(server);

    let client = HttpDeliveryClient::new(cfg).unwrap();
    let err = client.query(&ContentQuery::new()).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Http(_)));
    assert!(!err.is_content_missing());
}
