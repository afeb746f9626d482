//! Resolved content trees.
//!
//! A [`ResolvedTree`] is an arena: every entity reachable from the root is
//! stored once, keyed by id, behind an `Arc`. Cloning a tree only bumps
//! reference counts, and a patched tree shares every untouched entity with
//! the tree it was derived from.

use crate::ContentEntity;
use livepreview_types::ItemId;
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// A root entity plus the closure of everything it links to.
///
/// Invariant: every id referenced by an entity in the tree resolves to an
/// entity in the same tree, and every stored entity is reachable from the root.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTree {
    root: Arc<ContentEntity>,
    items: HashMap<ItemId, Arc<ContentEntity>>,
}

impl ResolvedTree {
    /// Builds a tree from a root and any number of linked entities.
    ///
    /// References that cannot be resolved are dropped from the entities that
    /// hold them, and entities that are not reachable from the root are
    /// discarded.
    pub fn new(
        root: impl Into<Arc<ContentEntity>>,
        linked: impl IntoIterator<Item = Arc<ContentEntity>>,
    ) -> Self {
        let arena = linked
            .into_iter()
            .map(|entity| (entity.id.clone(), entity))
            .collect();
        Self::assemble(root.into(), arena)
    }

    /// Builds a tree from an arena, returning `None` if the root id is absent.
    pub fn from_arena(root_id: &ItemId, mut arena: HashMap<ItemId, Arc<ContentEntity>>) -> Option<Self> {
        let root = arena.remove(root_id)?;
        Some(Self::assemble(root, arena))
    }

    /// Walks the arena breadth-first from `root`, keeping reachable entities
    /// and pruning references that point outside the arena.
    fn assemble(root: Arc<ContentEntity>, mut arena: HashMap<ItemId, Arc<ContentEntity>>) -> Self {
        let root_id = root.id.clone();
        arena.remove(&root_id);

        let mut items: HashMap<ItemId, Arc<ContentEntity>> = HashMap::with_capacity(arena.len() + 1);
        let mut visited: HashSet<ItemId> = HashSet::from([root_id.clone()]);
        let mut queue = VecDeque::new();

        let root = Self::admit(root, &arena, &items, &mut visited, &mut queue);
        items.insert(root_id, root.clone());

        while let Some(id) = queue.pop_front() {
            let Some(entity) = arena.remove(&id) else {
                continue;
            };
            let entity = Self::admit(entity, &arena, &items, &mut visited, &mut queue);
            items.insert(id, entity);
        }

        Self { root, items }
    }

    /// Prunes unresolvable references from `entity` and queues the rest.
    fn admit(
        mut entity: Arc<ContentEntity>,
        arena: &HashMap<ItemId, Arc<ContentEntity>>,
        items: &HashMap<ItemId, Arc<ContentEntity>>,
        visited: &mut HashSet<ItemId>,
        queue: &mut VecDeque<ItemId>,
    ) -> Arc<ContentEntity> {
        let dangling: HashSet<ItemId> = entity
            .references()
            .into_iter()
            .filter(|r| **r != entity.id && !arena.contains_key(*r) && !items.contains_key(*r))
            .cloned()
            .collect();
        if !dangling.is_empty() {
            debug!("Dropping {} unresolved reference(s) from {}", dangling.len(), entity.id);
            if let Some(pruned) = entity.without_references(&dangling) {
                entity = Arc::new(pruned);
            }
        }

        for reference in entity.references() {
            if visited.insert(reference.clone()) {
                queue.push_back(reference.clone());
            }
        }
        entity
    }

    pub fn root(&self) -> &Arc<ContentEntity> {
        &self.root
    }

    pub fn root_id(&self) -> &ItemId {
        &self.root.id
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&Arc<ContentEntity>>
    where
        ItemId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.get(id)
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        ItemId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.contains_key(id)
    }

    /// Number of entities in the tree, root included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Arc<ContentEntity>)> {
        self.items.iter()
    }

    /// The underlying arena.
    pub fn arena(&self) -> &HashMap<ItemId, Arc<ContentEntity>> {
        &self.items
    }

    /// Consumes the tree, returning its arena.
    pub fn into_arena(self) -> HashMap<ItemId, Arc<ContentEntity>> {
        self.items
    }

    /// Resolves the entities referenced by a linked-items element of `entity`.
    pub fn linked<'a>(&'a self, entity: &'a ContentEntity, element: &str) -> Vec<&'a Arc<ContentEntity>> {
        entity
            .linked_ids(element)
            .iter()
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    /// First entity of a linked-items element, if any.
    pub fn first_linked<'a>(&'a self, entity: &'a ContentEntity, element: &str) -> Option<&'a Arc<ContentEntity>> {
        entity
            .linked_ids(element)
            .iter()
            .find_map(|id| self.items.get(id))
    }

    /// Ids reachable from the root by following references. Terminates on
    /// cyclic content.
    pub fn reachable_ids(&self) -> HashSet<ItemId> {
        let mut visited = HashSet::from([self.root.id.clone()]);
        let mut queue = VecDeque::from([&self.root]);

        while let Some(entity) = queue.pop_front() {
            for reference in entity.references() {
                if let Some(next) = self.items.get(reference) {
                    if visited.insert(reference.clone()) {
                        queue.push_back(next);
                    }
                }
            }
        }
        visited
    }

    /// References pointing outside the tree, as `(holder, missing)` pairs.
    /// Always empty for trees built through this type's constructors.
    pub fn dangling_references(&self) -> Vec<(ItemId, ItemId)> {
        let mut dangling = Vec::new();
        for (id, entity) in &self.items {
            for reference in entity.references() {
                if !self.items.contains_key(reference) {
                    dangling.push((id.clone(), reference.clone()));
                }
            }
        }
        dangling
    }
}
