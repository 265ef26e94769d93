//! Rendering settings for each target runtime

use serde::Deserialize;

/// Names of the two environment variables a runtime reads options from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverrideSlots {
    /// Options placed before the command verb
    pub general: String,
    /// Options placed after the command verb
    pub command: String,
}

impl OverrideSlots {
    pub fn new(general: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            general: general.into(),
            command: command.into(),
        }
    }

    /// Slots named `<PREFIX>_OPTS` and `<PREFIX>_COMMAND_OPTS`
    pub fn with_prefix(prefix: &str) -> Self {
        Self::new(format!("{}_OPTS", prefix), format!("{}_COMMAND_OPTS", prefix))
    }
}

/// Host and container paths used by the volume mount example
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MountExample {
    pub host_path: String,
    pub container_path: String,
    pub file: String,
}

impl Default for MountExample {
    fn default() -> Self {
        Self {
            host_path: "$PWD".to_string(),
            container_path: "/data".to_string(),
            file: "input".to_string(),
        }
    }
}

/// Settings for the docker rendering profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    /// Runtime binary prefixed to command lines
    pub binary: String,
    pub default_shell: String,
    pub mount: MountExample,
    pub overrides: OverrideSlots,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            default_shell: "bash".to_string(),
            mount: MountExample::default(),
            overrides: OverrideSlots::with_prefix("DOCKER"),
        }
    }
}

/// Settings for the singularity rendering profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SingularitySettings {
    /// Runtime binary prefixed to command lines
    pub binary: String,
    pub default_shell: String,
    /// Directory holding pulled SIF images; `docker://` references are used when unset
    pub container_dir: Option<String>,
    /// Argument pass-through token for the `-exec` command
    pub exec_args: String,
    pub overrides: OverrideSlots,
}

impl Default for SingularitySettings {
    fn default() -> Self {
        Self {
            binary: "singularity".to_string(),
            default_shell: "/bin/bash".to_string(),
            container_dir: None,
            exec_args: "\"$@\"".to_string(),
            overrides: OverrideSlots::with_prefix("SINGULARITY"),
        }
    }
}

/// Configuration for the command template engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub docker: DockerSettings,
    pub singularity: SingularitySettings,
}

impl EngineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the docker settings
    pub fn with_docker(mut self, settings: DockerSettings) -> Self {
        self.docker = settings;
        self
    }

    /// Set the singularity settings
    pub fn with_singularity(mut self, settings: SingularitySettings) -> Self {
        self.singularity = settings;
        self
    }

    /// Set the directory SIF images are pulled into
    pub fn with_container_dir(mut self, dir: impl Into<String>) -> Self {
        self.singularity.container_dir = Some(dir.into());
        self
    }

    /// Set the mount example paths
    pub fn with_mount(mut self, mount: MountExample) -> Self {
        self.docker.mount = mount;
        self
    }
}
