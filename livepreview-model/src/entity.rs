use crate::element::{Asset, ChoiceOption, ElementValue, RichText, TaxonomyTerm};
use livepreview_types::{Codename, ItemId, LanguageCodename};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A content item as delivered by the backend.
///
/// Element keys are fixed per content type, but a partially loaded entity may
/// carry only some of them; accessors return `None` rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntity {
    pub id: ItemId,
    pub codename: Codename,
    #[serde(default)]
    pub name: String,
    pub content_type: Codename,
    #[serde(default)]
    pub language: LanguageCodename,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Codename>,
    #[serde(default)]
    pub elements: BTreeMap<Codename, ElementValue>,
}

impl ContentEntity {
    /// Creates an entity with no elements.
    pub fn new(
        id: impl Into<ItemId>,
        codename: impl Into<Codename>,
        content_type: impl Into<Codename>,
    ) -> Self {
        Self {
            id: id.into(),
            codename: codename.into(),
            name: String::new(),
            content_type: content_type.into(),
            language: LanguageCodename::default(),
            collection: None,
            elements: BTreeMap::new(),
        }
    }

    /// Sets an element value.
    #[must_use]
    pub fn with_element(mut self, codename: impl Into<Codename>, value: ElementValue) -> Self {
        self.elements.insert(codename.into(), value);
        self
    }

    /// Sets the language variant.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<LanguageCodename>) -> Self {
        self.language = language.into();
        self
    }

    pub fn element(&self, codename: &str) -> Option<&ElementValue> {
        self.elements.get(codename)
    }

    pub fn is_type(&self, content_type: &str) -> bool {
        self.content_type.as_str() == content_type
    }

    /// True when the entity carries no elements at all (nothing to render).
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn text(&self, codename: &str) -> Option<&str> {
        match self.element(codename)? {
            ElementValue::Text(s) | ElementValue::UrlSlug(s) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, codename: &str) -> Option<f64> {
        match self.element(codename)? {
            ElementValue::Number(n) => *n,
            _ => None,
        }
    }

    pub fn rich_text(&self, codename: &str) -> Option<&RichText> {
        match self.element(codename)? {
            ElementValue::RichText(rich) => Some(rich),
            _ => None,
        }
    }

    /// Ids referenced by a linked-items element. Missing or mistyped elements
    /// yield an empty slice.
    pub fn linked_ids(&self, codename: &str) -> &[ItemId] {
        match self.element(codename) {
            Some(ElementValue::LinkedItems(ids)) => ids,
            _ => &[],
        }
    }

    pub fn assets(&self, codename: &str) -> &[Asset] {
        match self.element(codename) {
            Some(ElementValue::Assets(assets)) => assets,
            _ => &[],
        }
    }

    pub fn taxonomy(&self, codename: &str) -> &[TaxonomyTerm] {
        match self.element(codename) {
            Some(ElementValue::Taxonomy(terms)) => terms,
            _ => &[],
        }
    }

    pub fn choices(&self, codename: &str) -> &[ChoiceOption] {
        match self.element(codename) {
            Some(ElementValue::MultipleChoice(options)) => options,
            _ => &[],
        }
    }

    /// Raw payload of a custom element.
    pub fn custom(&self, codename: &str) -> Option<&str> {
        match self.element(codename)? {
            ElementValue::Custom(raw) => Some(raw),
            _ => None,
        }
    }

    /// Every item id this entity references, deduplicated, in element order.
    pub fn references(&self) -> Vec<&ItemId> {
        let mut seen = HashSet::new();
        self.elements
            .values()
            .flat_map(ElementValue::references)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Returns a copy with every reference to `dropped` removed, or `None`
    /// if the entity does not reference any of them.
    pub fn without_references(&self, dropped: &HashSet<ItemId>) -> Option<Self> {
        let mut changed = false;
        let elements = self
            .elements
            .iter()
            .map(|(codename, value)| {
                let value = match value.without_references(dropped) {
                    Some(pruned) => {
                        changed = true;
                        pruned
                    }
                    None => value.clone(),
                };
                (codename.clone(), value)
            })
            .collect();

        changed.then(|| Self {
            elements,
            ..self.clone()
        })
    }
}
