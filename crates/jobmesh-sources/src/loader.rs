//! Source definition loading from TOML files.
//!
//! This module handles loading source definitions from the `source-definitions/` directory.

use crate::{
    definition::SourceDefinition,
    error::{Result, SourceError},
};
use jobmesh_core::SourceId;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory name searched for at the workspace root.
pub const DEFAULT_DEFINITIONS_DIR: &str = "source-definitions";

/// Loader for source definitions from TOML files.
pub struct SourceLoader {
    /// Base directory containing source definitions
    definitions_dir: PathBuf,
}

impl SourceLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(SourceError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Create a loader using the default definitions directory.
    ///
    /// Looks for `source-definitions/` relative to the workspace root.
    ///
    /// # Errors
    /// Returns error if the default directory doesn't exist.
    pub fn with_default_dir() -> Result<Self> {
        // Find workspace root by looking for Cargo.toml with [workspace]
        let mut current_dir = std::env::current_dir()?;

        loop {
            let cargo_toml = current_dir.join("Cargo.toml");
            if cargo_toml.exists() {
                if let Ok(contents) = std::fs::read_to_string(&cargo_toml) {
                    if contents.contains("[workspace]") {
                        return Self::new(current_dir.join(DEFAULT_DEFINITIONS_DIR));
                    }
                }
            }

            if let Some(parent) = current_dir.parent() {
                current_dir = parent.to_path_buf();
            } else {
                break;
            }
        }

        // Fallback: try relative path
        Self::new(PathBuf::from(DEFAULT_DEFINITIONS_DIR))
    }

    /// Use `dir` when configured, otherwise the default directory.
    pub fn from_config(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::new(dir),
            None => Self::with_default_dir(),
        }
    }

    /// Directory this loader reads from.
    #[must_use]
    pub fn definitions_dir(&self) -> &Path {
        &self.definitions_dir
    }

    /// Load a single source definition by ID.
    ///
    /// # Errors
    /// Returns error if the definition file doesn't exist, can't be read, or is invalid.
    pub fn load(&self, source_id: &SourceId) -> Result<SourceDefinition> {
        let filename = format!("{}.toml", source_id.as_str());
        let path = Self::find_file(&self.definitions_dir, &filename)?.ok_or_else(|| {
            SourceError::NotFound {
                source_id: source_id.to_string(),
            }
        })?;

        let definition = Self::load_from_path(&path)?;
        definition.validate()?;

        debug!(
            source_id = %source_id,
            name = %definition.name(),
            "loaded source definition"
        );

        Ok(definition)
    }

    /// Load all source definitions from the definitions directory.
    ///
    /// Invalid definitions are logged as warnings and skipped.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<SourceDefinition>> {
        let mut definitions = Vec::new();

        Self::walk_and_load_recursive(&self.definitions_dir, &mut definitions)?;

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded source definitions"
        );

        Ok(definitions)
    }

    /// Recursively walk directory and load all TOML files.
    fn walk_and_load_recursive(dir: &Path, definitions: &mut Vec<SourceDefinition>) -> Result<()> {
        let mut entries = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                Self::walk_and_load_recursive(&path, definitions)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                match Self::load_from_path(&path) {
                    Ok(definition) => {
                        if let Err(e) = definition.validate() {
                            warn!(
                                path = %path.display(),
                                error = %e,
                                "skipping invalid source definition"
                            );
                            continue;
                        }
                        definitions.push(definition);
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to load source definition"
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Recursively search for a file by name.
    fn find_file(dir: &Path, filename: &str) -> Result<Option<PathBuf>> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                if let Some(found) = Self::find_file(&path, filename)? {
                    return Ok(Some(found));
                }
            } else if path.file_name().and_then(|s| s.to_str()) == Some(filename) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Load a source definition from a specific file path.
    fn load_from_path(path: &Path) -> Result<SourceDefinition> {
        let contents = std::fs::read_to_string(path).map_err(|e| SourceError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        toml::from_str(&contents).map_err(|e| SourceError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobmesh_core::SourceTier;
    use tempfile::TempDir;

    fn create_test_definition_file(dir: &Path, source_id: &str, tier_dir: &str) -> PathBuf {
        let tier_path = dir.join(tier_dir);
        std::fs::create_dir_all(&tier_path).expect("create tier dir");

        let file_path = tier_path.join(format!("{source_id}.toml"));

        let content = format!(
            r#"
[source]
id = "{source_id}"
name = "Test Board"
url = "https://test.com"
domain = "test.com"
region_relevance = ["bd"]

[search]
method = "browser"
template = "https://test.com/search?q={{query}}&l={{location}}"
scroll = true

[search.selectors]
results_container = "div.results"
card = "div.card"
title = "h2"
company = ".company"
location = ".location"
link = "a"

[fallback]
board = "Test Board"
template = "https://test.com/search?q={{query}}"
"#
        );

        std::fs::write(&file_path, content).expect("write test file");
        file_path
    }

    #[test]
    fn test_loader_new_with_existing_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        assert!(SourceLoader::new(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_loader_new_with_nonexistent_dir() {
        let loader = SourceLoader::new("/nonexistent/path/to/definitions");
        assert!(matches!(loader, Err(SourceError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_load_single_source() {
        let temp_dir = TempDir::new().expect("create temp dir");
        create_test_definition_file(temp_dir.path(), "test-board", "browser");

        let loader = SourceLoader::new(temp_dir.path()).expect("create loader");
        let source_id = SourceId::new("test-board").expect("valid source ID");
        let definition = loader.load(&source_id).expect("load source definition");

        assert_eq!(definition.id(), &source_id);
        assert_eq!(definition.name(), "Test Board");
        assert_eq!(definition.tier(), SourceTier::Browser);
        assert!(definition.fallback.is_some());
    }

    #[test]
    fn test_load_nonexistent_source() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let loader = SourceLoader::new(temp_dir.path()).expect("create loader");
        let source_id = SourceId::new("nonexistent").expect("valid source ID");

        assert!(matches!(
            loader.load(&source_id),
            Err(SourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_all_sources() {
        let temp_dir = TempDir::new().expect("create temp dir");

        create_test_definition_file(temp_dir.path(), "board-1", "browser");
        create_test_definition_file(temp_dir.path(), "board-2", "browser");
        create_test_definition_file(temp_dir.path(), "board-3", "regional");

        let loader = SourceLoader::new(temp_dir.path()).expect("create loader");
        let definitions = loader.load_all().expect("load all definitions");

        assert_eq!(definitions.len(), 3);
        let ids: Vec<_> = definitions.iter().map(|d| d.id().as_str()).collect();
        assert_eq!(ids, vec!["board-1", "board-2", "board-3"]);
    }

    #[test]
    fn test_load_all_skips_invalid() {
        let temp_dir = TempDir::new().expect("create temp dir");

        create_test_definition_file(temp_dir.path(), "valid-board", "browser");

        // Unparseable TOML
        std::fs::write(temp_dir.path().join("broken.toml"), "invalid toml content [[[")
            .expect("write invalid file");

        // Parses, but fails validation (template lacks {query})
        let valid = std::fs::read_to_string(temp_dir.path().join("browser/valid-board.toml"))
            .expect("read valid file");
        let invalid = valid
            .replace("id = \"valid-board\"", "id = \"no-query-board\"")
            .replace("search?q={query}&l={location}", "search");
        std::fs::write(temp_dir.path().join("no-query-board.toml"), invalid)
            .expect("write invalid file");

        // Non-TOML files are ignored
        std::fs::write(temp_dir.path().join("README.md"), "# sources").expect("write readme");

        let loader = SourceLoader::new(temp_dir.path()).expect("create loader");
        let definitions = loader.load_all().expect("load all definitions");

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].id().as_str(), "valid-board");
    }

    #[test]
    fn test_from_config_prefers_explicit_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let loader = SourceLoader::from_config(Some(temp_dir.path())).expect("create loader");
        assert_eq!(loader.definitions_dir(), temp_dir.path());
    }
}
