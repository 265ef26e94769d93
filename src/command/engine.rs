//! Command derivation and rendering for resolved packages

use rayon::prelude::*;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::ResolveError;
use crate::registry::{PackageEntry, Registry};
use crate::version::{resolve_version, ResolvedVersion};

use super::{Binding, CommandTemplate, Invocation, RenderedCommand, Runtime, Target};

/// Flag singularity uses to expose the host's NVIDIA driver
const GPU_FLAG: &str = "--nv";

/// Rendered commands for one package at one resolved version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCommands {
    pub package: String,
    pub version: ResolvedVersion,
    pub runtime: Runtime,
    pub commands: Vec<RenderedCommand>,
}

impl PackageCommands {
    /// Find a rendered command by label
    pub fn get(&self, label: &str) -> Option<&RenderedCommand> {
        self.commands.iter().find(|c| c.label() == label)
    }
}

/// Derives and renders the command set of a package
#[derive(Debug, Clone, Default)]
pub struct CommandEngine {
    config: EngineConfig,
}

impl CommandEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runtime binary for a profile
    pub fn runtime_binary(&self, runtime: Runtime) -> &str {
        match runtime {
            Runtime::Docker => &self.config.docker.binary,
            Runtime::Singularity => &self.config.singularity.binary,
        }
    }

    /// Derive the unbound command templates of a package
    ///
    /// Provided-command aliases follow the fixed set in registration order.
    pub fn templates(&self, entry: &PackageEntry, runtime: Runtime) -> Vec<CommandTemplate> {
        match runtime {
            Runtime::Docker => self.docker_templates(entry),
            Runtime::Singularity => self.singularity_templates(entry),
        }
    }

    fn docker_templates(&self, entry: &PackageEntry) -> Vec<CommandTemplate> {
        let settings = &self.config.docker;
        let shell = entry.default_shell().unwrap_or(&settings.default_shell);
        let mount = &settings.mount;

        vec![
            CommandTemplate::new("pull-latest", Invocation::new("pull", Target::Image)),
            CommandTemplate::new("pull-version", Invocation::new("pull", Target::TaggedImage)),
            CommandTemplate::new("run", Invocation::new("run", Target::Image)),
            CommandTemplate::new(
                "run-interactive",
                Invocation::new("run", Target::Image).with_flag("-it").with_arg(shell),
            ),
            CommandTemplate::new(
                "mount-example",
                Invocation::new("run", Target::Image)
                    .with_flag("-v")
                    .with_flag(format!("{}:{}", mount.host_path, mount.container_path))
                    .with_arg(entry.entry_binary())
                    .with_arg(format!(
                        "{}/{}",
                        mount.container_path.trim_end_matches('/'),
                        mount.file
                    )),
            ),
        ]
    }

    fn singularity_templates(&self, entry: &PackageEntry) -> Vec<CommandTemplate> {
        let settings = &self.config.singularity;
        let name = entry.name();
        let shell = entry.default_shell().unwrap_or(&settings.default_shell);
        let gpu: &[&str] = if entry.gpu() { &[GPU_FLAG] } else { &[] };

        let mut templates = vec![
            CommandTemplate::new(
                format!("{}-run", name),
                Invocation::new("run", Target::Container).with_flags(gpu.iter().copied()),
            ),
            CommandTemplate::new(
                format!("{}-shell", name),
                Invocation::new("shell", Target::Container)
                    .with_flags(gpu.iter().copied())
                    .with_flag("-s")
                    .with_flag(shell),
            ),
            CommandTemplate::new(
                format!("{}-exec", name),
                Invocation::new("exec", Target::Container)
                    .with_flags(gpu.iter().copied())
                    .with_flag("-s")
                    .with_flag(shell)
                    .with_arg(settings.exec_args.as_str()),
            ),
            CommandTemplate::new(
                format!("{}-inspect-runscript", name),
                Invocation::new("inspect", Target::Container).with_flag("-r"),
            ),
            CommandTemplate::new(
                format!("{}-inspect-deffile", name),
                Invocation::new("inspect", Target::Container).with_flag("-d"),
            ),
        ];

        for command in entry.provided_commands() {
            let invocation = Invocation::new("exec", Target::Container)
                .with_flags(gpu.iter().copied())
                .with_flags(command.options())
                .with_arg(command.path());
            templates.push(CommandTemplate::new(command.name(), invocation));
        }

        templates
    }

    /// Concrete container references for a package at a resolved version
    pub fn binding(
        &self,
        entry: &PackageEntry,
        version: &ResolvedVersion,
        runtime: Runtime,
    ) -> Binding {
        let repo = entry.container_url();
        let tagged_image = format!("{}:{}", repo, version.tag());
        let image = if version.is_latest() {
            repo.to_string()
        } else {
            tagged_image.clone()
        };

        let container = match runtime {
            Runtime::Docker => tagged_image.clone(),
            Runtime::Singularity => match &self.config.singularity.container_dir {
                Some(dir) => format!(
                    "{}/{}/{}/{}_{}.sif",
                    dir.trim_end_matches('/'),
                    entry.name(),
                    version.tag(),
                    entry.name(),
                    version.tag()
                ),
                None => format!("docker://{}", tagged_image),
            },
        };

        Binding {
            image,
            tagged_image,
            container,
        }
    }

    /// Render the command set of a package at a resolved version
    pub fn render(
        &self,
        entry: &PackageEntry,
        version: &ResolvedVersion,
        runtime: Runtime,
    ) -> Vec<RenderedCommand> {
        let binding = self.binding(entry, version, runtime);
        let binary = self.runtime_binary(runtime);
        let commands: Vec<RenderedCommand> = self
            .templates(entry, runtime)
            .iter()
            .map(|t| t.render(binary, &binding))
            .collect();

        debug!(
            package = entry.name(),
            version = version.tag(),
            runtime = %runtime,
            count = commands.len(),
            "rendered commands"
        );
        commands
    }

    /// Resolve a version and render a package's commands
    pub fn render_package(
        &self,
        entry: &PackageEntry,
        requested: Option<&str>,
        runtime: Runtime,
    ) -> Result<PackageCommands, ResolveError> {
        let version = resolve_version(entry, requested)?;
        let commands = self.render(entry, &version, runtime);
        Ok(PackageCommands {
            package: entry.name().to_string(),
            version,
            runtime,
            commands,
        })
    }

    /// Render every package at its default version, in registration order
    pub fn render_registry(
        &self,
        registry: &Registry,
        runtime: Runtime,
    ) -> Result<Vec<PackageCommands>, ResolveError> {
        registry
            .entries()
            .par_iter()
            .map(|entry| self.render_package(entry, None, runtime))
            .collect()
    }
}
