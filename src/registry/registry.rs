//! Registry trait and default implementation for managing tool definitions.

use crate::registry::{ToolDefinition, ToolError};
use std::collections::HashMap;

/// A registry for managing tool definitions.
///
/// Registries are read-mostly: tools are registered at process start
/// and looked up by name during dispatch. Orchestration runs never
/// consult the registry mid-flight; they work against a snapshot taken
/// at run start.
pub trait ToolRegistry {
    /// Register a tool definition.
    ///
    /// Returns an error if a tool with the same name already exists.
    fn register(&mut self, definition: ToolDefinition) -> Result<(), ToolError>;

    /// Get a tool by name.
    fn get(&self, name: &str) -> Option<&ToolDefinition>;

    /// List all registered tools.
    fn list(&self) -> Vec<&ToolDefinition>;

    /// Check if a tool exists.
    fn contains(&self, name: &str) -> bool;

    /// Remove a tool, returning it if it existed.
    fn remove(&mut self, name: &str) -> Option<ToolDefinition>;

    /// Get the number of registered tools.
    fn len(&self) -> usize;

    /// Check if the registry is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get all tool names.
    fn names(&self) -> Vec<&str>;
}

/// Default implementation of `ToolRegistry` using a HashMap.
#[derive(Debug, Default, Clone)]
pub struct DefaultToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl DefaultToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any existing one with the same name.
    pub fn register_or_replace(&mut self, definition: ToolDefinition) -> Option<ToolDefinition> {
        self.tools.insert(definition.name.clone(), definition)
    }

    /// Take an immutable snapshot of the active tool set for one run.
    ///
    /// With `subset` given, unknown names are silently skipped and the
    /// run's resolution step reports them as "Tool not found" if the
    /// model calls one. Without a subset the whole catalog is active.
    pub fn snapshot(&self, subset: Option<&[String]>) -> Vec<ToolDefinition> {
        match subset {
            Some(names) => names
                .iter()
                .filter_map(|name| self.tools.get(name).cloned())
                .collect(),
            None => {
                let mut all: Vec<ToolDefinition> = self.tools.values().cloned().collect();
                // Stable catalog order keeps the rendered system prompt deterministic.
                all.sort_by(|a, b| a.name.cmp(&b.name));
                all
            }
        }
    }

    /// Iterate over all tools.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ToolDefinition)> {
        self.tools.iter()
    }
}

impl ToolRegistry for DefaultToolRegistry {
    fn register(&mut self, definition: ToolDefinition) -> Result<(), ToolError> {
        if self.tools.contains_key(&definition.name) {
            return Err(ToolError::duplicate_name(&definition.name));
        }
        self.tools.insert(definition.name.clone(), definition);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    fn remove(&mut self, name: &str) -> Option<ToolDefinition> {
        self.tools.remove(name)
    }

    fn len(&self) -> usize {
        self.tools.len()
    }

    fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl FromIterator<ToolDefinition> for DefaultToolRegistry {
    fn from_iter<T: IntoIterator<Item = ToolDefinition>>(iter: T) -> Self {
        let mut registry = Self::new();
        for def in iter {
            registry.register_or_replace(def);
        }
        registry
    }
}
