//! Command templates and rendered commands
//!
//! Commands are kept as structured records (verb, flags, container slot,
//! trailing arguments) and only turned into text at the boundary. The
//! placeholder form of a template uses `<imageRef>`, `<imageRef>:<version>`
//! and `<container>` for the container slot.

mod engine;
mod inject;

pub use engine::{CommandEngine, PackageCommands};
pub use inject::{apply, Overrides};

use std::fmt;
use std::str::FromStr;

/// Target runtime, selecting which command set is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Runtime {
    /// Plain pull/run instructions
    Docker,
    /// Module-style commands with per-executable aliases
    Singularity,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Docker => "docker",
            Runtime::Singularity => "singularity",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runtime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "docker" => Ok(Runtime::Docker),
            "singularity" => Ok(Runtime::Singularity),
            other => Err(format!("unknown runtime '{}' (expected docker or singularity)", other)),
        }
    }
}

/// The container reference slot of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Image repository, tagged only when a non-latest version is pinned
    Image,
    /// Image repository qualified with the resolved tag
    TaggedImage,
    /// Runtime-specific container reference (SIF path or URI)
    Container,
}

impl Target {
    /// Placeholder text used in the template form
    pub fn placeholder(&self) -> &'static str {
        match self {
            Target::Image => "<imageRef>",
            Target::TaggedImage => "<imageRef>:<version>",
            Target::Container => "<container>",
        }
    }
}

/// Concrete values substituted into the container slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub image: String,
    pub tagged_image: String,
    pub container: String,
}

impl Binding {
    fn resolve(&self, target: Target) -> &str {
        match target {
            Target::Image => &self.image,
            Target::TaggedImage => &self.tagged_image,
            Target::Container => &self.container,
        }
    }
}

/// A runtime invocation: `<verb> <flags...> <target> <args...>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    verb: String,
    flags: Vec<String>,
    target: Target,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(verb: impl Into<String>, target: Target) -> Self {
        Self {
            verb: verb.into(),
            flags: Vec::new(),
            target,
            args: Vec::new(),
        }
    }

    /// Add a flag placed before the container slot
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// Add several flags placed before the container slot
    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Add an argument placed after the container slot
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Template text with the container slot left as a placeholder
    pub fn template(&self) -> String {
        join_tokens(
            std::iter::once(self.verb.as_str())
                .chain(self.flags.iter().map(String::as_str))
                .chain(std::iter::once(self.target.placeholder()))
                .chain(self.args.iter().map(String::as_str)),
        )
    }
}

/// A labelled invocation before binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub label: String,
    pub invocation: Invocation,
}

impl CommandTemplate {
    pub fn new(label: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            label: label.into(),
            invocation,
        }
    }

    /// Bind the container slot and produce a rendered command
    pub fn render(&self, runtime: &str, binding: &Binding) -> RenderedCommand {
        let inv = &self.invocation;
        RenderedCommand {
            label: self.label.clone(),
            template: inv.template(),
            runtime: runtime.to_string(),
            verb: inv.verb.clone(),
            flags: inv.flags.clone(),
            target: binding.resolve(inv.target).to_string(),
            args: inv.args.clone(),
        }
    }
}

/// A label plus a fully interpolated invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    label: String,
    template: String,
    runtime: String,
    verb: String,
    flags: Vec<String>,
    target: String,
    args: Vec<String>,
}

impl RenderedCommand {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Template text with the container placeholder
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Runtime binary the command is run with
    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// The bound container reference
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Invocation text without the runtime binary
    pub fn invocation(&self) -> String {
        join_tokens(
            std::iter::once(self.verb.as_str())
                .chain(self.flags.iter().map(String::as_str))
                .chain(std::iter::once(self.target.as_str()))
                .chain(self.args.iter().map(String::as_str)),
        )
    }

    /// Full command line including the runtime binary
    pub fn command_line(&self) -> String {
        let invocation = self.invocation();
        join_tokens([self.runtime.as_str(), invocation.as_str()])
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.invocation())
    }
}

/// Join tokens with single spaces, dropping empty ones
pub(crate) fn join_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    tokens
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
