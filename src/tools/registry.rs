//! Name-based tool lookup over an externally supplied catalog.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::tool::ToolFactory;
use crate::error::ParleyError;

/// Source of invocable tools for one responder.
pub trait ToolCatalog: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Arc<dyn ToolFactory>>;

    /// Names of every tool in the catalog, in catalog order.
    fn names(&self) -> Vec<String>;

    fn factories(&self) -> Vec<Arc<dyn ToolFactory>>;
}

/// In-memory catalog built up front.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    factories: Vec<Arc<dyn ToolFactory>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A later tool with the same name shadows an earlier one.
    pub fn with(mut self, factory: Arc<dyn ToolFactory>) -> Self {
        self.factories.push(factory);
        self
    }
}

impl FromIterator<Arc<dyn ToolFactory>> for StaticCatalog {
    fn from_iter<I: IntoIterator<Item = Arc<dyn ToolFactory>>>(iter: I) -> Self {
        Self {
            factories: iter.into_iter().collect(),
        }
    }
}

impl ToolCatalog for StaticCatalog {
    fn lookup(&self, name: &str) -> Option<Arc<dyn ToolFactory>> {
        self.factories
            .iter()
            .rev()
            .find(|f| f.name() == name)
            .cloned()
    }

    fn names(&self) -> Vec<String> {
        self.factories.iter().map(|f| f.name().to_string()).collect()
    }

    fn factories(&self) -> Vec<Arc<dyn ToolFactory>> {
        self.factories.clone()
    }
}

/// Function definition in the shape remote assistants are configured with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Resolves requested tool names against a catalog.
#[derive(Clone)]
pub struct ToolRegistry {
    catalog: Arc<dyn ToolCatalog>,
}

impl ToolRegistry {
    pub fn new(catalog: Arc<dyn ToolCatalog>) -> Self {
        Self { catalog }
    }

    pub fn from_factories(factories: impl IntoIterator<Item = Arc<dyn ToolFactory>>) -> Self {
        Self::new(Arc::new(factories.into_iter().collect::<StaticCatalog>()))
    }

    /// Find the tool named `name`, or report every name that does exist.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ToolFactory>, ParleyError> {
        self.catalog
            .lookup(name)
            .ok_or_else(|| ParleyError::ToolNotFound {
                name: name.to_string(),
                available: self.catalog.names(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.catalog.names()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.names().is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.catalog
            .factories()
            .iter()
            .map(|f| ToolDefinition {
                name: f.name().to_string(),
                description: f.description().to_string(),
                parameters: f.parameters().schema.clone(),
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(Arc::new(StaticCatalog::new()))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.catalog.names())
            .finish()
    }
}
