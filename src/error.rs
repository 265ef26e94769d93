//! Error types for registry loading and lookup

use thiserror::Error;

/// Structural problems found while loading a package entry.
///
/// A load error only excludes the offending entry; the rest of the
/// registry still loads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A required field is missing or holds an invalid value
    #[error("package '{package}': malformed field '{field}': {reason}")]
    MalformedEntry {
        package: String,
        field: &'static str,
        reason: String,
    },

    /// Two provided commands of one package share a name
    #[error("package '{package}': duplicate provided command '{alias}'")]
    DuplicateAlias { package: String, alias: String },

    /// A package name was already registered by an earlier entry
    #[error("duplicate package name '{name}'")]
    DuplicatePackage { name: String },
}

impl LoadError {
    /// Create a malformed entry error
    pub fn malformed(
        package: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedEntry {
            package: package.into(),
            field,
            reason: reason.into(),
        }
    }

    /// Name of the package the error refers to
    pub fn package(&self) -> &str {
        match self {
            LoadError::MalformedEntry { package, .. } => package,
            LoadError::DuplicateAlias { package, .. } => package,
            LoadError::DuplicatePackage { name } => name,
        }
    }
}

/// Errors raised while resolving a package or version for rendering
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No package name or alias matched
    #[error("package not found: {name}")]
    NotFound { name: String },

    /// The requested version is not declared by the package
    #[error(
        "unknown version '{requested}' for package '{package}' (available: {})",
        available.join(", ")
    )]
    UnknownVersion {
        package: String,
        requested: String,
        available: Vec<String>,
    },
}
