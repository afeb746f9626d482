//! Delivery client trait and its HTTP implementation.

use crate::config::DeliveryConfig;
use crate::error::{DeliveryError, DeliveryResult};
use crate::query::ContentQuery;
use crate::wire::{self, DeliveryResponse};
use async_trait::async_trait;
use livepreview_model::{ContentEntity, ResolvedTree};
use livepreview_types::{ItemId, LanguageCodename};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Pagination info of a result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u32,
    pub limit: u32,
    pub count: u32,
    pub next_page: Option<String>,
}

/// The first page of a query result.
#[derive(Debug, Clone, Default)]
pub struct ItemsPage {
    /// Items matching the query, in response order.
    pub items: Vec<Arc<ContentEntity>>,
    /// Linked items and components delivered alongside, keyed by id.
    pub linked: HashMap<ItemId, Arc<ContentEntity>>,
    pub pagination: Pagination,
}

impl ItemsPage {
    /// Decodes a delivery response body.
    pub fn from_json(body: &str) -> DeliveryResult<Self> {
        let response: DeliveryResponse = serde_json::from_str(body)?;
        Ok(Self::from_response(&response))
    }

    pub fn from_response(response: &DeliveryResponse) -> Self {
        let mapped = wire::map_response(response);
        let pagination = response
            .pagination
            .as_ref()
            .map(|p| Pagination {
                skip: p.skip,
                limit: p.limit,
                count: p.count,
                next_page: Some(p.next_page.clone()).filter(|n| !n.is_empty()),
            })
            .unwrap_or_default();
        Self {
            items: mapped.items,
            linked: mapped.linked,
            pagination,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolved tree rooted at the first item, if any.
    pub fn first_tree(&self) -> Option<ResolvedTree> {
        let root = self.items.first()?.clone();
        Some(ResolvedTree::new(root, self.entities()))
    }

    /// Every entity on the page: items first, then linked content.
    pub fn entities(&self) -> impl Iterator<Item = Arc<ContentEntity>> + '_ {
        self.items.iter().chain(self.linked.values()).cloned()
    }

    pub fn into_entities(self) -> Vec<Arc<ContentEntity>> {
        let mut entities = self.items;
        entities.extend(self.linked.into_values());
        entities
    }
}

/// Follow-up requests `items_by_id` makes for links the backend left out.
const LINK_ROUNDS: usize = 8;

/// Runs content queries against a delivery backend.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Runs a query and returns the decoded response body.
    async fn fetch_response(&self, query: &ContentQuery) -> DeliveryResult<DeliveryResponse>;

    /// Runs a query and returns its first page.
    async fn query(&self, query: &ContentQuery) -> DeliveryResult<ItemsPage> {
        Ok(ItemsPage::from_response(&self.fetch_response(query).await?))
    }

    /// Fetches the items with the given ids, together with everything they
    /// link to. Links the backend did not include at its default depth are
    /// fetched by codename in further requests. Ids the backend does not
    /// know are simply absent from the result.
    async fn items_by_id(
        &self,
        ids: &[ItemId],
        language: &LanguageCodename,
    ) -> DeliveryResult<Vec<Arc<ContentEntity>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = ContentQuery::new().language(language.clone()).by_ids(ids);
        let mut response = self.fetch_response(&query).await?;

        let mut requested = HashSet::new();
        for _ in 0..LINK_ROUNDS {
            let missing: Vec<String> = response
                .unresolved_codenames()
                .into_iter()
                .filter(|codename| requested.insert(codename.clone()))
                .collect();
            if missing.is_empty() {
                break;
            }
            debug!("Fetching {} linked item(s) by codename", missing.len());
            let query = ContentQuery::new()
                .language(language.clone())
                .by_codenames(missing);
            match self.fetch_response(&query).await {
                Ok(linked) => {
                    response.absorb(linked);
                }
                Err(e) if e.is_not_found() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(ItemsPage::from_response(&response).into_entities())
    }
}

#[async_trait]
impl<T: DeliveryClient + ?Sized> DeliveryClient for Arc<T> {
    async fn fetch_response(&self, query: &ContentQuery) -> DeliveryResult<DeliveryResponse> {
        (**self).fetch_response(query).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Delivery client backed by the delivery REST API.
pub struct HttpDeliveryClient {
    config: DeliveryConfig,
    client: Client,
}

impl HttpDeliveryClient {
    pub fn new(config: DeliveryConfig) -> DeliveryResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DeliveryError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }
}

#[async_trait]
impl DeliveryClient for HttpDeliveryClient {
    async fn fetch_response(&self, query: &ContentQuery) -> DeliveryResult<DeliveryResponse> {
        let url = self.config.items_url();
        debug!("GET {}?{}", url, query.to_query_string());

        let mut request = self.client.get(&url).query(&query.to_pairs());
        if self.config.preview {
            match &self.config.preview_api_key {
                Some(key) => request = request.bearer_auth(key),
                None => warn!("Preview requested without a preview API key"),
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| DeliveryError::Http(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeliveryError::Http(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            return Err(if status == StatusCode::NOT_FOUND {
                DeliveryError::NotFound(message)
            } else {
                DeliveryError::Api {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let response: DeliveryResponse = serde_json::from_str(&body)?;
        debug!(
            "Received {} item(s) and {} linked item(s)",
            response.items.len(),
            response.modular_content.len()
        );
        Ok(response)
    }
}
