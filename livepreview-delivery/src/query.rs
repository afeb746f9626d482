//! Delivery query builder.

use livepreview_types::{Codename, ItemId, LanguageCodename};
use serde::{Deserialize, Serialize};

/// A filter on a system or element field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    Equals { field: String, value: String },
    In { field: String, values: Vec<String> },
}

/// A content items query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentQuery {
    pub content_type: Option<Codename>,
    pub language: Option<LanguageCodename>,
    pub limit: Option<u32>,
    pub depth: Option<u32>,
    pub filters: Vec<Filter>,
}

impl ContentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn of_type(mut self, content_type: impl Into<Codename>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<LanguageCodename>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Restricts to a single collection.
    #[must_use]
    pub fn collection(self, collection: impl Into<Codename>) -> Self {
        let collection: Codename = collection.into();
        self.equals("system.collection", collection.as_str())
    }

    /// Restricts to any of several collections.
    #[must_use]
    pub fn collections<I, C>(self, collections: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Codename>,
    {
        let values = collections.into_iter().map(|c| Into::<Codename>::into(c).into_inner()).collect();
        self.in_filter("system.collection", values)
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// How many levels of linked items the backend includes.
    #[must_use]
    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    #[must_use]
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn in_filter(mut self, field: impl Into<String>, values: Vec<String>) -> Self {
        self.filters.push(Filter::In {
            field: field.into(),
            values,
        });
        self
    }

    /// Items whose id is one of `ids`.
    #[must_use]
    pub fn by_ids<'a>(self, ids: impl IntoIterator<Item = &'a ItemId>) -> Self {
        let values = ids.into_iter().map(|id| id.as_str().to_string()).collect();
        self.in_filter("system.id", values)
    }

    /// Items whose codename is one of `codenames`.
    #[must_use]
    pub fn by_codenames<I, C>(self, codenames: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let values = codenames.into_iter().map(Into::into).collect();
        self.in_filter("system.codename", values)
    }

    /// Query string pairs, in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(content_type) = &self.content_type {
            pairs.push(("system.type".to_string(), content_type.to_string()));
        }
        if let Some(language) = &self.language {
            pairs.push(("language".to_string(), language.to_string()));
        }
        for filter in &self.filters {
            match filter {
                Filter::Equals { field, value } => pairs.push((field.clone(), value.clone())),
                Filter::In { field, values } => {
                    pairs.push((format!("{field}[in]"), values.join(",")));
                }
            }
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(depth) = self.depth {
            pairs.push(("depth".to_string(), depth.to_string()));
        }
        pairs
    }

    /// Encoded query string, for logs.
    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
