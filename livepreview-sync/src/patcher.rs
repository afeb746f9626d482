//! Incremental tree patching.
//!
//! An update event names the items whose elements changed. The patcher
//! refetches exactly those that are reachable from the current root, then
//! resolves whatever the fresh versions newly link to, one batched fetch per
//! round. Every entity it does not refetch is carried over by reference.

use crate::cache::ContentCache;
use crate::error::PatchResult;
use async_trait::async_trait;
use livepreview_delivery::{DeliveryClient, DeliveryResult};
use livepreview_model::{ContentEntity, ResolvedTree};
use livepreview_types::{ItemId, LanguageCodename, UpdateEvent};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches items by id. The result may contain extra entities (linked
/// content delivered alongside) and may omit ids the backend does not know.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    async fn fetch(&self, ids: &[ItemId]) -> DeliveryResult<Vec<Arc<ContentEntity>>>;
}

/// Fetches items through a [`DeliveryClient`] in a fixed language.
pub struct DeliveryFetcher<C> {
    client: C,
    language: LanguageCodename,
}

impl<C: DeliveryClient> DeliveryFetcher<C> {
    pub fn new(client: C, language: LanguageCodename) -> Self {
        Self { client, language }
    }
}

#[async_trait]
impl<C: DeliveryClient> ItemFetcher for DeliveryFetcher<C> {
    async fn fetch(&self, ids: &[ItemId]) -> DeliveryResult<Vec<Arc<ContentEntity>>> {
        self.client.items_by_id(ids, &self.language).await
    }
}

/// Configuration for the tree patcher.
#[derive(Debug, Clone)]
pub struct PatcherConfig {
    /// Upper bound on fetch rounds for one update. References still
    /// unresolved after the last round are dropped.
    pub max_rounds: usize,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self { max_rounds: 8 }
    }
}

/// Applies update events to resolved trees.
#[derive(Debug, Clone)]
pub struct TreePatcher {
    cache: Arc<ContentCache>,
    config: PatcherConfig,
}

impl TreePatcher {
    pub fn new(cache: Arc<ContentCache>) -> Self {
        Self::with_config(cache, PatcherConfig::default())
    }

    pub fn with_config(cache: Arc<ContentCache>, config: PatcherConfig) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// Produces the tree that results from applying `event` to `tree`.
    ///
    /// Returns `Ok(None)` when there is no tree yet. When the event names no
    /// item of the tree, the result equals the input and nothing is fetched.
    /// A not-found response counts as "these items are gone"; any other fetch
    /// error, including other status errors, is returned and the caller keeps
    /// its tree.
    pub async fn apply_update<F>(
        &self,
        tree: Option<&ResolvedTree>,
        event: &UpdateEvent,
        fetcher: &F,
    ) -> PatchResult<Option<ResolvedTree>>
    where
        F: ItemFetcher + ?Sized,
    {
        let Some(tree) = tree else {
            debug!("No tree loaded, ignoring update");
            return Ok(None);
        };

        let changed = event.item_ids();
        for id in &changed {
            self.cache.remove(id);
        }

        let reachable = tree.reachable_ids();
        let stale: BTreeSet<ItemId> = changed
            .iter()
            .filter(|id| reachable.contains(*id))
            .cloned()
            .collect();
        if stale.is_empty() {
            debug!("Update names no item of the current tree");
            return Ok(Some(tree.clone()));
        }

        let mut arena = tree.arena().clone();
        let mut requested: HashSet<ItemId> = HashSet::new();
        let mut missing: HashSet<ItemId> = HashSet::new();
        let mut pending: Vec<ItemId> = stale.into_iter().collect();
        let mut round = 0;

        while !pending.is_empty() {
            if round == self.config.max_rounds {
                warn!(
                    "Giving up on {} unresolved reference(s) after {} rounds",
                    pending.len(),
                    round
                );
                break;
            }
            round += 1;

            debug!("Fetching {} item(s), round {}", pending.len(), round);
            requested.extend(pending.iter().cloned());
            let batch: HashSet<ItemId> = pending.iter().cloned().collect();
            let entities = match fetcher.fetch(&pending).await {
                Ok(entities) => entities,
                Err(e) if e.is_not_found() => {
                    debug!("Items not found, treating them as deleted: {}", e);
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            };

            let mut inserted = Vec::new();
            for entity in entities {
                if batch.contains(&entity.id) || !arena.contains_key(&entity.id) {
                    arena.insert(entity.id.clone(), entity.clone());
                    inserted.push(entity);
                }
            }
            for id in &batch {
                if !inserted.iter().any(|e| &e.id == id) {
                    debug!("Backend did not return {}, dropping it", id);
                    arena.remove(id);
                    missing.insert(id.clone());
                }
            }

            pending = self.unresolved(inserted, &mut arena, &requested, &changed);
        }

        let root_id = tree.root_id().clone();
        if !arena.contains_key(&root_id) {
            warn!("Root item {} is no longer delivered, keeping previous version", root_id);
            arena.insert(root_id.clone(), tree.root().clone());
        }

        let Some(patched) = ResolvedTree::from_arena(&root_id, arena) else {
            return Ok(Some(tree.clone()));
        };

        for id in &missing {
            self.cache.remove(id);
        }
        self.cache.seed(&patched);
        info!(
            "Patched tree {} in {} round(s): {} item(s), {} dropped",
            root_id,
            round,
            patched.len(),
            missing.len()
        );
        Ok(Some(patched))
    }

    /// Walks the references of freshly inserted entities and returns the ids
    /// that still need a fetch. Cached entities fill gaps for ids that the
    /// event did not name.
    fn unresolved(
        &self,
        inserted: Vec<Arc<ContentEntity>>,
        arena: &mut HashMap<ItemId, Arc<ContentEntity>>,
        requested: &HashSet<ItemId>,
        changed: &BTreeSet<ItemId>,
    ) -> Vec<ItemId> {
        let mut queue: VecDeque<Arc<ContentEntity>> = inserted.into();
        let mut next = BTreeSet::new();

        while let Some(entity) = queue.pop_front() {
            for reference in entity.references() {
                if arena.contains_key(reference) || requested.contains(reference) {
                    continue;
                }
                if !changed.contains(reference) {
                    if let Some(cached) = self.cache.get(reference) {
                        debug!("Resolved {} from cache", reference);
                        arena.insert(reference.clone(), cached.clone());
                        queue.push_back(cached);
                        continue;
                    }
                }
                next.insert(reference.clone());
            }
        }
        next.into_iter().collect()
    }
}

/// An in-memory backend for tests.
pub mod mock {
    use super::*;
    use livepreview_delivery::DeliveryError;
    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    #[derive(Default)]
    struct BackendState {
        items: HashMap<ItemId, Arc<ContentEntity>>,
        requests: Vec<Vec<ItemId>>,
        failures: VecDeque<DeliveryError>,
        delays: VecDeque<Duration>,
    }

    /// Serves items from a map and records every request.
    #[derive(Default)]
    pub struct MockBackend {
        state: Mutex<BackendState>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_items(entities: impl IntoIterator<Item = Arc<ContentEntity>>) -> Self {
            let backend = Self::new();
            for entity in entities {
                backend.put(entity);
            }
            backend
        }

        fn state(&self) -> std::sync::MutexGuard<'_, BackendState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Adds or replaces an item.
        pub fn put(&self, entity: impl Into<Arc<ContentEntity>>) {
            let entity = entity.into();
            self.state().items.insert(entity.id.clone(), entity);
        }

        pub fn remove(&self, id: &ItemId) {
            self.state().items.remove(id);
        }

        pub fn get(&self, id: &ItemId) -> Option<Arc<ContentEntity>> {
            self.state().items.get(id).cloned()
        }

        /// Makes the next fetch fail with `error`.
        pub fn fail_next(&self, error: DeliveryError) {
            self.state().failures.push_back(error);
        }

        /// Delays the next fetch by `delay`.
        pub fn delay_next(&self, delay: Duration) {
            self.state().delays.push_back(delay);
        }

        /// Every batch requested so far, each sorted.
        pub fn requests(&self) -> Vec<Vec<ItemId>> {
            self.state().requests.clone()
        }

        pub fn request_count(&self) -> usize {
            self.state().requests.len()
        }
    }

    #[async_trait]
    impl ItemFetcher for MockBackend {
        async fn fetch(&self, ids: &[ItemId]) -> DeliveryResult<Vec<Arc<ContentEntity>>> {
            let (delay, failure) = {
                let mut state = self.state();
                let mut batch = ids.to_vec();
                batch.sort();
                state.requests.push(batch);
                (state.delays.pop_front(), state.failures.pop_front())
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(error) = failure {
                return Err(error);
            }
            let state = self.state();
            Ok(ids.iter().filter_map(|id| state.items.get(id).cloned()).collect())
        }
    }
}
