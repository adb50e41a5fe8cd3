//! Spot tags.
//!
//! The backend returns tags either as bare strings or as normalized tag
//! objects. Both shapes are decoded here, once, into [`Tag`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tag attached to a spot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    /// Free text tag.
    Plain(String),

    /// Tag produced by the backend's tag normalizer.
    Structured {
        #[serde(default)]
        value: String,
        #[serde(default)]
        normalized: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
}

impl Tag {
    /// Text to show for this tag.
    pub fn label(&self) -> &str {
        match self {
            Tag::Plain(text) => text,
            Tag::Structured {
                value, normalized, ..
            } => {
                if value.is_empty() {
                    normalized
                } else {
                    value
                }
            }
        }
    }

    /// Key used to treat synonyms as the same tag.
    pub fn normalized(&self) -> &str {
        match self {
            Tag::Plain(text) => text,
            Tag::Structured { normalized, .. } if !normalized.is_empty() => normalized,
            Tag::Structured { value, .. } => value,
        }
    }

    /// Tag category, if the normalizer assigned one.
    pub fn category(&self) -> Option<&str> {
        match self {
            Tag::Plain(_) => None,
            Tag::Structured { category, .. } => category.as_deref(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
