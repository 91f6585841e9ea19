//! In-memory source definition registry.

use crate::{
    definition::SourceDefinition,
    error::Result,
    loader::SourceLoader,
};
use jobmesh_core::SourceId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// In-memory cache of source definitions.
///
/// The registry loads definitions from disk and caches them in memory
/// for fast lookups. Definitions are returned sorted by ID so
/// adapter order and fallback output stay deterministic.
#[derive(Clone)]
pub struct SourceRegistry {
    /// Cached source definitions, indexed by source ID
    definitions: Arc<RwLock<HashMap<SourceId, SourceDefinition>>>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry and load all definitions from the given loader.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn load_from(loader: &SourceLoader) -> Result<Self> {
        let registry = Self::new();
        registry.reload(loader)?;
        Ok(registry)
    }

    /// Reload all source definitions from the loader.
    ///
    /// This replaces the current cache with freshly loaded definitions.
    pub fn reload(&self, loader: &SourceLoader) -> Result<()> {
        let definitions = loader.load_all()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        cache.clear();

        for definition in definitions {
            let source_id = definition.id().clone();
            cache.insert(source_id, definition);
        }

        info!(count = cache.len(), "reloaded source definitions");

        Ok(())
    }

    /// Get all source definitions, sorted by ID.
    #[must_use]
    pub fn get_all(&self) -> Vec<SourceDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        let mut definitions: Vec<_> = cache.values().cloned().collect();
        definitions.sort_by(|a, b| a.id().cmp(b.id()));
        definitions
    }

    /// Get the total number of sources in the registry.
    #[must_use]
    pub fn count(&self) -> usize {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.len()
    }

    /// Add or update a source definition in the registry.
    pub fn insert(&self, definition: SourceDefinition) -> Result<()> {
        // Validate before inserting
        definition.validate()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        let source_id = definition.id().clone();
        cache.insert(source_id.clone(), definition);

        debug!(source_id = %source_id, "inserted source definition");

        Ok(())
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
