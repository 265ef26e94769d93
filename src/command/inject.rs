//! Option injection for rendered commands
//!
//! Two override points are layered onto a rendered command without touching
//! its template: general options go between the runtime binary and the verb,
//! command options go directly after the verb.

use crate::config::OverrideSlots;

use super::{join_tokens, RenderedCommand};

/// Compose a command line with optional general and command options
///
/// Absent or blank overrides leave no trace in the output, so
/// `apply(cmd, None, None)` equals `cmd.command_line()`.
pub fn apply(
    rendered: &RenderedCommand,
    general: Option<&str>,
    command: Option<&str>,
) -> String {
    join_tokens(
        std::iter::once(rendered.runtime())
            .chain(general)
            .chain(std::iter::once(rendered.verb()))
            .chain(command)
            .chain(rendered.flags().iter().map(String::as_str))
            .chain(std::iter::once(rendered.target()))
            .chain(rendered.args().iter().map(String::as_str)),
    )
}

/// Values for the two override points
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub general: Option<String>,
    pub command: Option<String>,
}

impl Overrides {
    /// No overrides
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(general: Option<String>, command: Option<String>) -> Self {
        Self {
            general: non_blank(general),
            command: non_blank(command),
        }
    }

    /// Read both slots through a lookup function, e.g. an environment reader
    pub fn from_lookup<F>(slots: &OverrideSlots, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(lookup(&slots.general), lookup(&slots.command))
    }

    /// Shell variable references for the slots, for documenting the hooks
    pub fn references(slots: &OverrideSlots) -> Self {
        Self::new(
            Some(format!("${{{}}}", slots.general)),
            Some(format!("${{{}}}", slots.command)),
        )
    }

    /// Compose a rendered command with these overrides
    pub fn apply_to(&self, rendered: &RenderedCommand) -> String {
        apply(rendered, self.general.as_deref(), self.command.as_deref())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
