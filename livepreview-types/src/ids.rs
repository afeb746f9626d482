//! Identifier types used throughout the live preview core.
//!
//! The content backend hands out opaque identifiers; nothing here interprets
//! their structure. Item ids are usually UUIDs, codenames are snake_case
//! strings, but both are treated as plain strings.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier without validation.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Parses an identifier, rejecting empty or whitespace-only input.
            pub fn parse(s: &str) -> Result<Self, Error> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(Error::EmptyIdentifier);
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Stable, immutable identifier of a content item.
    ItemId
);

string_id!(
    /// Human-readable codename of an item, element, type or collection.
    Codename
);

string_id!(
    /// Identifier of the content project (environment) a page is rendered from.
    ProjectId
);

string_id!(
    /// Codename of a content language variant.
    LanguageCodename
);

impl LanguageCodename {
    /// Sentinel used when the URL carries no `lang` parameter.
    pub const DEFAULT: &'static str = "default";

    /// Returns true for the `"default"` sentinel.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for LanguageCodename {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}
