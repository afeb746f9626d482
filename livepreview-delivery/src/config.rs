//! Delivery configuration.

use crate::error::{DeliveryError, DeliveryResult};
use livepreview_types::{Codename, ProjectId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_ENVIRONMENT_ID: &str = "KONTENT_ENVIRONMENT_ID";
pub const ENV_PREVIEW_API_KEY: &str = "KONTENT_PREVIEW_API_KEY";
pub const ENV_COLLECTION: &str = "KONTENT_COLLECTION";
pub const ENV_CLOUDINARY_CLOUD_NAME: &str = "CLOUDINARY_CLOUD_NAME";

/// Collection queried when neither the URL nor the environment names one.
pub const DEFAULT_COLLECTION: &str = "patient_resources";

/// Configuration for the delivery client and page loaders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Environment (project) identifier. Also the editor's project id.
    pub environment_id: ProjectId,
    /// API key for the preview endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_api_key: Option<String>,
    /// Query unpublished content through the preview endpoint.
    #[serde(default)]
    pub preview: bool,
    /// Collection used when the URL does not override it.
    pub collection: Codename,
    /// Cloud name used to build video URLs from a bare public id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudinary_cloud_name: Option<String>,
    /// Base URL of the published content API.
    pub delivery_base_url: String,
    /// Base URL of the preview content API.
    pub preview_base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            environment_id: ProjectId::new(String::new()),
            preview_api_key: None,
            preview: false,
            collection: Codename::new(DEFAULT_COLLECTION),
            cloudinary_cloud_name: None,
            delivery_base_url: "https://deliver.kontent.ai".to_string(),
            preview_base_url: "https://preview-deliver.kontent.ai".to_string(),
            timeout_secs: 30,
        }
    }
}

impl DeliveryConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> DeliveryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DeliveryResult<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment_id = get(ENV_ENVIRONMENT_ID)
            .ok_or_else(|| DeliveryError::Config(format!("{ENV_ENVIRONMENT_ID} is not set")))?;

        let mut config = Self {
            environment_id: ProjectId::new(environment_id),
            preview_api_key: get(ENV_PREVIEW_API_KEY),
            cloudinary_cloud_name: get(ENV_CLOUDINARY_CLOUD_NAME),
            ..Self::default()
        };
        if let Some(collection) = get(ENV_COLLECTION) {
            config.collection = Codename::new(collection);
        }
        Ok(config)
    }

    /// Enables or disables the preview endpoint.
    #[must_use]
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Points both endpoints at `base_url`. Used for local mocks.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.delivery_base_url.clone_from(&base_url);
        self.preview_base_url = base_url;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint listing content items for the configured environment.
    pub fn items_url(&self) -> String {
        let base = if self.preview {
            &self.preview_base_url
        } else {
            &self.delivery_base_url
        };
        format!("{}/{}/items", base.trim_end_matches('/'), self.environment_id)
    }
}
