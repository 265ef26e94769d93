//! Version resolution against a package's declared version list
//!
//! "Latest" always means the last declared version. Tags are never compared
//! semantically because registries do not guarantee sorted version lists.

use std::fmt;

use crate::error::ResolveError;
use crate::registry::PackageEntry;

/// A concrete version tag selected for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    tag: String,
    latest: bool,
}

impl ResolvedVersion {
    /// The literal version tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether the tag is the last declared version
    pub fn is_latest(&self) -> bool {
        self.latest
    }

    /// Tag for display text: "latest" or the literal tag
    pub fn display_tag(&self) -> &str {
        if self.latest {
            "latest"
        } else {
            &self.tag
        }
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Resolve the version to render for a package
///
/// Without a request the package's default version is used, falling back to
/// the last declared version. A requested tag must be declared literally.
pub fn resolve_version(
    entry: &PackageEntry,
    requested: Option<&str>,
) -> Result<ResolvedVersion, ResolveError> {
    let tag = match requested {
        Some(tag) if entry.has_version(tag) => tag,
        Some(tag) => {
            return Err(ResolveError::UnknownVersion {
                package: entry.name().to_string(),
                requested: tag.to_string(),
                available: entry.versions().to_vec(),
            })
        }
        None => entry.default_version().unwrap_or_else(|| entry.latest_version()),
    };

    Ok(ResolvedVersion {
        tag: tag.to_string(),
        latest: tag == entry.latest_version(),
    })
}
