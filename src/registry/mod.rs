//! Package registry
//!
//! The registry is built once from a sequence of package records and is
//! read-only afterwards. Entries that fail validation are reported and
//! skipped; the remaining entries still load.
//!
//! # Example
//!
//! ```rust
//! use container_docgen::registry::{PackageRecord, Registry};
//!
//! let report = Registry::load(vec![
//!     PackageRecord::new("rclone", "ghcr.io/autamus/rclone").with_version("1.55.1"),
//! ]);
//! assert!(report.errors.is_empty());
//! assert!(report.registry.lookup("rclone").is_some());
//! ```

mod entry;
pub mod loader;

pub use entry::{CommandRecord, PackageEntry, PackageRecord, ProvidedCommand};
pub use loader::{ConfigError, RegistryFile};

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{LoadError, ResolveError};

/// Immutable collection of validated package entries
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: Vec<PackageEntry>,
    /// Name lookup: package name -> entry index
    names: HashMap<String, usize>,
    /// Alias lookup: alias -> entry index, first registration wins
    aliases: HashMap<String, usize>,
}

/// Result of loading a registry: the valid entries plus per-entry errors
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub registry: Registry,
    pub errors: Vec<LoadError>,
}

impl LoadReport {
    /// Whether every record loaded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate records and build a registry from the ones that pass
    pub fn load(records: impl IntoIterator<Item = PackageRecord>) -> LoadReport {
        Self::load_checked(records.into_iter().map(Ok))
    }

    /// Like [`Registry::load`], for records that may have failed to
    /// deserialize; those failures are reported alongside validation errors
    pub fn load_checked(
        records: impl IntoIterator<Item = Result<PackageRecord, LoadError>>,
    ) -> LoadReport {
        let mut entries: Vec<PackageEntry> = Vec::new();
        let mut names = HashMap::new();
        let mut errors = Vec::new();

        for record in records {
            let entry = match record.and_then(PackageEntry::from_record) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(package = err.package(), error = %err, "skipping package entry");
                    errors.push(err);
                    continue;
                }
            };

            if names.contains_key(entry.name()) {
                let err = LoadError::DuplicatePackage {
                    name: entry.name().to_string(),
                };
                warn!(package = entry.name(), error = %err, "skipping package entry");
                errors.push(err);
                continue;
            }

            names.insert(entry.name().to_string(), entries.len());
            entries.push(entry);
        }

        // Aliases are indexed after all names so a later package name always
        // beats an earlier package's alias.
        let mut aliases = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            for alias in entry.aliases() {
                if names.contains_key(alias) || aliases.contains_key(alias) {
                    debug!(
                        package = entry.name(),
                        alias = %alias,
                        "alias shadowed by earlier registration"
                    );
                    continue;
                }
                aliases.insert(alias.clone(), index);
            }
        }

        debug!(loaded = entries.len(), rejected = errors.len(), "registry loaded");

        LoadReport {
            registry: Registry {
                entries,
                names,
                aliases,
            },
            errors,
        }
    }

    /// Find a package by name, then by alias
    pub fn lookup(&self, name_or_alias: &str) -> Option<&PackageEntry> {
        self.names
            .get(name_or_alias)
            .or_else(|| self.aliases.get(name_or_alias))
            .map(|&index| &self.entries[index])
    }

    /// Find a package by name or alias, failing with `NotFound`
    pub fn resolve(&self, name_or_alias: &str) -> Result<&PackageEntry, ResolveError> {
        self.lookup(name_or_alias).ok_or_else(|| ResolveError::NotFound {
            name: name_or_alias.to_string(),
        })
    }

    /// Entries in registration order
    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    /// Package names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
