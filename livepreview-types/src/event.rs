//! Events emitted by the authoring tool's preview frame.
//!
//! The frame never ships entity bodies. An [`UpdateEvent`] only says *which*
//! items changed and which of their elements were touched; the consumer has to
//! re-resolve the content itself. A [`RefreshEvent`] is a coarser "state may be
//! stale" signal, paired with [`RefreshMetadata`] telling whether the author
//! clicked refresh by hand.

use crate::{Codename, ItemId, LanguageCodename, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single item touched by a remote edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChange {
    /// The edited item.
    pub item_id: ItemId,
    /// The item's codename, when the frame sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codename: Option<Codename>,
    /// Codenames of the elements whose values changed.
    #[serde(default)]
    pub elements: Vec<Codename>,
}

impl ItemChange {
    /// Creates a change record for an item.
    #[must_use]
    pub fn new(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            codename: None,
            elements: Vec::new(),
        }
    }

    /// Adds a changed element codename.
    #[must_use]
    pub fn with_element(mut self, element: impl Into<Codename>) -> Self {
        self.elements.push(element.into());
        self
    }

    /// Sets the item codename.
    #[must_use]
    pub fn with_codename(mut self, codename: impl Into<Codename>) -> Self {
        self.codename = Some(codename.into());
        self
    }
}

/// A remote edit: zero or more items whose element values changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageCodename>,
    #[serde(default)]
    pub changes: Vec<ItemChange>,
}

impl UpdateEvent {
    /// Creates an empty update event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an update touching a single item and element.
    #[must_use]
    pub fn single(item_id: impl Into<ItemId>, element: impl Into<Codename>) -> Self {
        Self::new().with_change(ItemChange::new(item_id).with_element(element))
    }

    /// Adds an item change.
    #[must_use]
    pub fn with_change(mut self, change: ItemChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Sets the language the edit was made in.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<LanguageCodename>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Returns the distinct set of item ids referenced by this event.
    #[must_use]
    pub fn item_ids(&self) -> BTreeSet<ItemId> {
        self.changes.iter().map(|c| c.item_id.clone()).collect()
    }

    /// Returns true if the event references no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// A "state may be stale" signal from the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageCodename>,
    #[serde(default)]
    pub updated_item_codenames: Vec<Codename>,
}

/// Metadata delivered alongside a [`RefreshEvent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshMetadata {
    /// True when the author explicitly asked for a refresh. Manual refreshes
    /// must force a full reload.
    pub manual_refresh: bool,
}

impl RefreshMetadata {
    /// Metadata for a user-initiated refresh.
    #[must_use]
    pub const fn manual() -> Self {
        Self { manual_refresh: true }
    }

    /// Metadata for an automatic refresh signal.
    #[must_use]
    pub const fn automatic() -> Self {
        Self { manual_refresh: false }
    }
}

/// Everything a preview-frame connection can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum FrameEvent {
    /// Element values of one or more items changed.
    Update(UpdateEvent),
    /// The editor believes the page may be stale.
    Refresh {
        event: RefreshEvent,
        metadata: RefreshMetadata,
    },
}

impl FrameEvent {
    /// Parses a frame message from its JSON wire form.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the event to its JSON wire form.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
