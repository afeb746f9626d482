//! Resolved-content cache.
//!
//! Maps item ids to the last resolved entity seen during the current page
//! view. The patcher consults it before fetching linked items that a fresh
//! entity newly references. It is never authoritative: ids named by an
//! update event always go to the backend.

use livepreview_model::{ContentEntity, ResolvedTree};
use livepreview_types::{ItemId, LanguageCodename, NavigationContext};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Default)]
struct CacheState {
    scope: Option<(String, LanguageCodename, bool)>,
    entries: HashMap<ItemId, Arc<ContentEntity>>,
}

/// Process-lifetime entity cache, scoped to one page view.
#[derive(Debug, Default)]
pub struct ContentCache {
    state: RwLock<CacheState>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scopes the cache to the page view described by `ctx`. Switching path,
    /// language or preview mode empties it. Returns whether it was cleared.
    pub fn bind(&self, ctx: &NavigationContext) -> bool {
        let scope = (ctx.path.clone(), ctx.language.clone(), ctx.preview);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.scope.as_ref() == Some(&scope) {
            return false;
        }
        let cleared = !state.entries.is_empty();
        if cleared {
            debug!("Invalidating {} cached item(s) for {}", state.entries.len(), scope.0);
        }
        state.entries.clear();
        state.scope = Some(scope);
        cleared
    }

    pub fn get(&self, id: &ItemId) -> Option<Arc<ContentEntity>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .contains_key(id)
    }

    pub fn insert(&self, entity: Arc<ContentEntity>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .insert(entity.id.clone(), entity);
    }

    pub fn extend(&self, entities: impl IntoIterator<Item = Arc<ContentEntity>>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for entity in entities {
            state.entries.insert(entity.id.clone(), entity);
        }
    }

    /// Caches every entity of `tree`.
    pub fn seed(&self, tree: &ResolvedTree) {
        self.extend(tree.iter().map(|(_, entity)| entity.clone()));
    }

    pub fn remove(&self, id: &ItemId) -> Option<Arc<ContentEntity>> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .remove(id)
    }

    /// Drops every entry, keeping the current scope.
    pub fn clear(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clear();
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
