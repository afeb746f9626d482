use livepreview_delivery::DeliveryConfig;
use livepreview_delivery::config::DEFAULT_COLLECTION;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// ── Defaults ─────────────────────────────────────────────────────

#[test]
fn default_config() {
    let cfg = DeliveryConfig::default();
    assert_eq!(cfg.collection.as_str(), DEFAULT_COLLECTION);
    assert_eq!(cfg.delivery_base_url, "https://deliver.kontent.ai");
    assert_eq!(cfg.preview_base_url, "https://preview-deliver.kontent.ai");
    assert_eq!(cfg.timeout(), Duration::from_secs(30));
    assert!(!cfg.preview);
}

// ── Environment ──────────────────────────────────────────────────

#[test]
fn from_lookup_reads_all_variables() {
    let cfg = DeliveryConfig::from_lookup(lookup(&[
        ("KONTENT_ENVIRONMENT_ID", "env-1"),
        ("KONTENT_PREVIEW_API_KEY", "secret"),
        ("KONTENT_COLLECTION", "clinicians"),
        ("CLOUDINARY_CLOUD_NAME", "demo"),
    ]))
    .unwrap();
    assert_eq!(cfg.environment_id.as_str(), "env-1");
    assert_eq!(cfg.preview_api_key.as_deref(), Some("secret"));
    assert_eq!(cfg.collection.as_str(), "clinicians");
    assert_eq!(cfg.cloudinary_cloud_name.as_deref(), Some("demo"));
}

#[test]
fn from_lookup_requires_environment_id() {
    let err = DeliveryConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(err.to_string().contains("KONTENT_ENVIRONMENT_ID"));
    assert!(!err.is_content_missing());
}

#[test]
fn from_lookup_treats_blank_as_unset() {
    let cfg = DeliveryConfig::from_lookup(lookup(&[
        ("KONTENT_ENVIRONMENT_ID", "env-1"),
        ("KONTENT_COLLECTION", "  "),
        ("KONTENT_PREVIEW_API_KEY", ""),
    ]))
    .unwrap();
    assert_eq!(cfg.collection.as_str(), DEFAULT_COLLECTION);
    assert!(cfg.preview_api_key.is_none());
}

// ── URLs ─────────────────────────────────────────────────────────

#[test]
fn items_url_switches_on_preview() {
    let cfg = DeliveryConfig::from_lookup(lookup(&[("KONTENT_ENVIRONMENT_ID", "env-1")])).unwrap();
    assert_eq!(cfg.items_url(), "https://deliver.kontent.ai/env-1/items");
    let cfg = cfg.with_preview(true);
    assert_eq!(cfg.items_url(), "https://preview-deliver.kontent.ai/env-1/items");
}

#[test]
fn with_base_url_trims_trailing_slash() {
    let cfg = DeliveryConfig::from_lookup(lookup(&[("KONTENT_ENVIRONMENT_ID", "env-1")]))
        .unwrap()
        .with_base_url("http://127.0.0.1:9000/");
    assert_eq!(cfg.items_url(), "http://127.0.0.1:9000/env-1/items");
}

#[test]
fn config_serde_roundtrip() {
    let cfg = DeliveryConfig {
        preview: true,
        ..Default::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: DeliveryConfig = serde_json::from_str(&json).unwrap();
    assert!(back.preview);
    assert_eq!(back.collection, cfg.collection);
}
