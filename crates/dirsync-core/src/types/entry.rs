//! Raw directory entries and search requests

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Search scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    Base,
    OneLevel,
    #[default]
    Subtree,
}

/// A single search request sent over a directory session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base_dn: String,
    pub scope: SearchScope,
    pub filter: String,
    pub attributes: Vec<String>,
}

impl SearchRequest {
    pub fn subtree(base_dn: &str, filter: &str, attributes: Vec<String>) -> Self {
        Self {
            base_dn: base_dn.to_string(),
            scope: SearchScope::Subtree,
            filter: filter.to_string(),
            attributes,
        }
    }
}

/// Entry returned by a directory search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    /// Builder-style attribute insertion
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    /// All values of an attribute. Attribute names are case-insensitive.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        if let Some(values) = self.attrs.get(name) {
            return Some(values.as_slice());
        }

        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    /// First value of an attribute, if present and non-empty
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }
}
