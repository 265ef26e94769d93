//! TOML registry documents
//!
//! A registry document lists packages as `[[package]]` tables and may carry
//! rendering settings under `[settings]`:
//!
//! ```toml
//! [settings.singularity]
//! container_dir = "/opt/containers"
//!
//! [[package]]
//! name = "tensorflow"
//! versions = ["2.4.1", "2.5.0"]
//! container_url = "ghcr.io/autamus/tensorflow"
//! gpu = true
//!
//! [[package.commands]]
//! name = "python"
//! path = "/usr/local/bin/python"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::EngineConfig;

use super::{LoadReport, PackageRecord, Registry};

/// Errors that can occur when reading a registry document
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read registry file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse registry TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A parsed registry document
///
/// Package tables stay untyped until [`RegistryFile::into_registry`], so a
/// mistyped field in one entry is reported for that entry alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub settings: EngineConfig,
    #[serde(default, rename = "package")]
    pub packages: Vec<toml::Table>,
}

impl RegistryFile {
    /// Load a registry document from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a registry document from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the package records into a registry, keeping the settings
    pub fn into_registry(self) -> (LoadReport, EngineConfig) {
        let records = self.packages.into_iter().map(PackageRecord::from_table);
        (Registry::load_checked(records), self.settings)
    }
}
