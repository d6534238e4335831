//! Source document loading
//!
//! A source document is an `oc export`/`oc process` style `List` (resources
//! under `items`) or `Template` (resources under `objects`). JSON exports
//! load as well since JSON is a subset of YAML.

use serde_yaml::Value;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Top-level `kind` of a source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    List,
    Template,
    /// Any other kind; carries no deployable items
    Other(String),
}

impl DocumentKind {
    fn from_value(kind: Option<&str>) -> Self {
        match kind {
            Some("List") => DocumentKind::List,
            Some("Template") => DocumentKind::Template,
            Some(other) => DocumentKind::Other(other.to_string()),
            None => DocumentKind::Other(String::new()),
        }
    }

    /// Key holding the embedded resources, if this kind has one
    pub fn items_key(&self) -> Option<&'static str> {
        match self {
            DocumentKind::List => Some("items"),
            DocumentKind::Template => Some("objects"),
            DocumentKind::Other(_) => None,
        }
    }
}

/// One embedded resource object
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceItem {
    kind: String,
    name: String,
    value: Value,
}

impl ResourceItem {
    /// Wrap a parsed object; `None` unless it has a string `kind` and `metadata.name`
    pub fn from_value(value: Value) -> Option<Self> {
        let kind = value.get("kind")?.as_str()?.to_string();
        let name = value.get("metadata")?.get("name")?.as_str()?.to_string();
        Some(Self { kind, name, value })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full object as parsed
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Parsed input document
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub kind: DocumentKind,
    pub items: Vec<ResourceItem>,
}

impl SourceDocument {
    /// A document with no deployable items
    pub fn empty() -> Self {
        Self {
            kind: DocumentKind::Other(String::new()),
            items: Vec::new(),
        }
    }

    /// Read and parse a document from disk
    ///
    /// Read failures are returned as [`CoreError::Io`]; malformed content,
    /// including bytes that are not UTF-8, as [`CoreError::Parse`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        let root: Value = serde_yaml::from_slice(&content).map_err(|source| CoreError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_value(root))
    }

    /// Parse a document from text
    pub fn parse(content: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(content).map_err(|source| CoreError::Parse {
            path: "<input>".to_string(),
            source,
        })?;
        Ok(Self::from_value(root))
    }

    /// Build a document from an already parsed tree
    pub fn from_value(root: Value) -> Self {
        let kind = DocumentKind::from_value(root.get("kind").and_then(Value::as_str));

        let Some(key) = kind.items_key() else {
            tracing::info!("Document kind {:?} carries no deployable items", kind);
            return Self {
                kind,
                items: Vec::new(),
            };
        };

        let raw_items = match root.get(key) {
            Some(Value::Sequence(seq)) => seq.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                tracing::warn!("`{}` is not a sequence, ignoring it", key);
                Vec::new()
            }
        };

        let items = raw_items
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let item = ResourceItem::from_value(value);
                if item.is_none() {
                    tracing::warn!("{}[{}] has no kind or metadata.name, skipping", key, index);
                }
                item
            })
            .collect();

        Self { kind, items }
    }
}
