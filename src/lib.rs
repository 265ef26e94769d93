//! Container Docgen - module metadata registry and command template engine
//!
//! This library turns a resolved container package description into the
//! canonical set of runnable commands for a target runtime: docker pull/run
//! instructions, or singularity module-style commands with one alias per
//! executable the container provides.
//!
//! # Example
//!
//! ```rust
//! use container_docgen::registry::{PackageRecord, Registry};
//! use container_docgen::{render, Runtime};
//!
//! let registry = Registry::load(vec![
//!     PackageRecord::new("rclone", "ghcr.io/autamus/rclone").with_version("1.55.1"),
//! ])
//! .registry;
//!
//! let page = render(&registry, "rclone", None, Runtime::Docker).unwrap();
//! let pull = page.get("pull-version").unwrap();
//! assert_eq!(pull.invocation(), "pull ghcr.io/autamus/rclone:1.55.1");
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod registry;
pub mod version;

pub use command::{apply, CommandEngine, Overrides, PackageCommands, RenderedCommand, Runtime};
pub use config::EngineConfig;
pub use error::{LoadError, ResolveError};
pub use registry::{LoadReport, PackageEntry, Registry, RegistryFile};
pub use version::{resolve_version, ResolvedVersion};

use std::path::Path;

use thiserror::Error;

use registry::ConfigError;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error reading the registry document
    #[error("registry error: {0}")]
    Config(#[from] ConfigError),

    /// Error resolving the package or version
    #[error("{0}")]
    Resolve(#[from] ResolveError),
}

/// Load a registry document and validate its packages
///
/// Entries that fail validation are listed in the report's errors; the
/// remaining entries are usable.
pub fn load_registry(path: &Path) -> Result<(LoadReport, EngineConfig), RenderError> {
    let file = RegistryFile::from_file(path)?;
    Ok(file.into_registry())
}

/// Render a package's commands with the default configuration
pub fn render(
    registry: &Registry,
    name_or_alias: &str,
    version: Option<&str>,
    runtime: Runtime,
) -> Result<PackageCommands, RenderError> {
    render_with_config(registry, name_or_alias, version, runtime, EngineConfig::default())
}

/// Render a package's commands with a custom configuration
///
/// # Example
///
/// ```rust
/// use container_docgen::registry::{CommandRecord, PackageRecord, Registry};
/// use container_docgen::{render_with_config, EngineConfig, Runtime};
///
/// let registry = Registry::load(vec![
///     PackageRecord::new("tensorflow", "ghcr.io/autamus/tensorflow")
///         .with_version("2.5.0")
///         .with_gpu(true)
///         .with_command(CommandRecord::new("python", "/usr/local/bin/python")),
/// ])
/// .registry;
///
/// let config = EngineConfig::new().with_container_dir("/opt/containers");
/// let page =
///     render_with_config(&registry, "tensorflow", None, Runtime::Singularity, config).unwrap();
/// assert_eq!(
///     page.get("python").unwrap().command_line(),
///     "singularity exec --nv /opt/containers/tensorflow/2.5.0/tensorflow_2.5.0.sif \
///      /usr/local/bin/python"
/// );
/// ```
pub fn render_with_config(
    registry: &Registry,
    name_or_alias: &str,
    version: Option<&str>,
    runtime: Runtime,
    config: EngineConfig,
) -> Result<PackageCommands, RenderError> {
    let entry = registry.resolve(name_or_alias)?;
    let engine = CommandEngine::new(config);
    Ok(engine.render_package(entry, version, runtime)?)
}
