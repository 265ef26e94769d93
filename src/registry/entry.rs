//! Package entries: raw records as declared and validated immutable entries

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::LoadError;

/// A provided command as declared in registry data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandRecord {
    /// Short command name exposed outside the container
    pub name: String,
    /// Absolute path of the executable inside the container
    pub path: String,
    /// Extra exec flags, written as a shell-style string
    #[serde(default)]
    pub options: Option<String>,
}

impl CommandRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            options: None,
        }
    }

    /// Set the extra exec flags
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }
}

/// One package as declared in registry data, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageRecord {
    pub name: String,
    pub aliases: Vec<String>,
    pub versions: Vec<String>,
    pub default_version: Option<String>,
    pub container_url: String,
    pub homepage: Option<String>,
    pub description: Option<String>,
    pub size: Option<u64>,
    pub commands: Vec<CommandRecord>,
    pub default_shell: Option<String>,
    pub entry_binary: Option<String>,
    pub gpu: bool,
}

impl PackageRecord {
    /// Keys accepted in a `[[package]]` table
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "aliases",
        "versions",
        "default_version",
        "container_url",
        "homepage",
        "description",
        "size",
        "commands",
        "default_shell",
        "entry_binary",
        "gpu",
    ];

    /// Deserialize one `[[package]]` table
    ///
    /// Failures are reported against the first offending key so one bad
    /// entry never hides its siblings.
    pub fn from_table(table: toml::Table) -> Result<Self, LoadError> {
        let package = table
            .get("name")
            .and_then(toml::Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or("<unnamed>")
            .to_string();

        if let Some(key) = table.keys().find(|key| !Self::FIELDS.contains(&key.as_str())) {
            return Err(LoadError::malformed(
                package,
                "package",
                format!("unknown field '{}'", key),
            ));
        }

        for &field in Self::FIELDS {
            let Some(value) = table.get(field) else {
                continue;
            };
            let mut single = toml::Table::new();
            single.insert(field.to_string(), value.clone());
            let checked: Result<Self, _> = toml::Value::Table(single).try_into();
            if let Err(e) = checked {
                return Err(LoadError::malformed(package, field, e.to_string().trim()));
            }
        }

        toml::Value::Table(table)
            .try_into()
            .map_err(|e| LoadError::malformed(package, "package", e.to_string().trim()))
    }

    /// Create a record with a name and container repository
    pub fn new(name: impl Into<String>, container_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container_url: container_url.into(),
            ..Self::default()
        }
    }

    /// Append a version tag
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.versions.push(version.into());
        self
    }

    /// Set the default version
    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = Some(version.into());
        self
    }

    /// Append a lookup alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Append a provided command
    pub fn with_command(mut self, command: CommandRecord) -> Self {
        self.commands.push(command);
        self
    }

    /// Set the default shell
    pub fn with_default_shell(mut self, shell: impl Into<String>) -> Self {
        self.default_shell = Some(shell.into());
        self
    }

    /// Set the binary used by the mount example
    pub fn with_entry_binary(mut self, binary: impl Into<String>) -> Self {
        self.entry_binary = Some(binary.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Enable or disable the gpu feature
    pub fn with_gpu(mut self, gpu: bool) -> Self {
        self.gpu = gpu;
        self
    }
}

/// An executable exposed from inside the container under a short name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedCommand {
    name: String,
    path: String,
    options: Option<String>,
}

impl ProvidedCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Extra exec flags as written; quoting is checked at load time
    pub fn options(&self) -> Option<&str> {
        self.options.as_deref()
    }
}

/// A validated, immutable package entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    name: String,
    aliases: Vec<String>,
    versions: Vec<String>,
    default_version: Option<String>,
    container_url: String,
    homepage: Option<String>,
    description: Option<String>,
    size: Option<u64>,
    provided_commands: Vec<ProvidedCommand>,
    default_shell: Option<String>,
    entry_binary: Option<String>,
    gpu: bool,
}

impl PackageEntry {
    /// Validate a record and build an entry from it
    pub fn from_record(record: PackageRecord) -> Result<Self, LoadError> {
        let name = record.name;
        if name.is_empty() {
            return Err(LoadError::malformed("<unnamed>", "name", "must not be empty"));
        }
        if name.contains(char::is_whitespace) {
            return Err(LoadError::malformed(&name, "name", "must not contain whitespace"));
        }

        if record.container_url.trim().is_empty() {
            return Err(LoadError::malformed(&name, "container_url", "must not be empty"));
        }

        validate_versions(&name, &record.versions)?;
        if let Some(default) = &record.default_version {
            if !record.versions.contains(default) {
                return Err(LoadError::malformed(
                    &name,
                    "default_version",
                    format!("'{}' is not a declared version", default),
                ));
            }
        }

        for alias in &record.aliases {
            if alias.is_empty() {
                return Err(LoadError::malformed(&name, "aliases", "alias must not be empty"));
            }
            if alias.contains(char::is_whitespace) {
                return Err(LoadError::malformed(
                    &name,
                    "aliases",
                    format!("alias '{}' must not contain whitespace", alias),
                ));
            }
        }

        let provided_commands = build_commands(&name, record.commands)?;

        Ok(Self {
            name,
            aliases: record.aliases,
            versions: record.versions,
            default_version: record.default_version,
            container_url: record.container_url.trim().to_string(),
            homepage: record.homepage,
            description: record.description,
            size: record.size,
            provided_commands,
            default_shell: record.default_shell.filter(|s| !s.trim().is_empty()),
            entry_binary: record.entry_binary.filter(|s| !s.trim().is_empty()),
            gpu: record.gpu,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Version tags in declaration order
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn default_version(&self) -> Option<&str> {
        self.default_version.as_deref()
    }

    /// The last declared version
    pub fn latest_version(&self) -> &str {
        // versions is non-empty by construction
        self.versions.last().map(String::as_str).unwrap_or_default()
    }

    pub fn container_url(&self) -> &str {
        &self.container_url
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Provided commands in registration order
    pub fn provided_commands(&self) -> &[ProvidedCommand] {
        &self.provided_commands
    }

    pub fn default_shell(&self) -> Option<&str> {
        self.default_shell.as_deref()
    }

    /// Binary invoked by the mount example, falling back to the package name
    pub fn entry_binary(&self) -> &str {
        self.entry_binary.as_deref().unwrap_or(&self.name)
    }

    pub fn gpu(&self) -> bool {
        self.gpu
    }

    /// Check whether a version tag is declared
    pub fn has_version(&self, tag: &str) -> bool {
        self.versions.iter().any(|v| v == tag)
    }
}

fn validate_versions(package: &str, versions: &[String]) -> Result<(), LoadError> {
    if versions.is_empty() {
        return Err(LoadError::malformed(package, "versions", "must not be empty"));
    }

    let mut seen = HashSet::new();
    for version in versions {
        if version.is_empty() || version.contains(char::is_whitespace) {
            return Err(LoadError::malformed(
                package,
                "versions",
                format!("invalid version tag '{}'", version),
            ));
        }
        if !seen.insert(version.as_str()) {
            return Err(LoadError::malformed(
                package,
                "versions",
                format!("version '{}' declared twice", version),
            ));
        }
    }
    Ok(())
}

fn build_commands(
    package: &str,
    records: Vec<CommandRecord>,
) -> Result<Vec<ProvidedCommand>, LoadError> {
    let mut seen = HashSet::new();
    let mut commands = Vec::with_capacity(records.len());

    for record in records {
        if record.name.is_empty() {
            return Err(LoadError::malformed(
                package,
                "commands",
                "command name must not be empty",
            ));
        }
        if record.name.contains(char::is_whitespace) {
            return Err(LoadError::malformed(
                package,
                "commands",
                format!("command name '{}' must not contain whitespace", record.name),
            ));
        }
        if !seen.insert(record.name.clone()) {
            return Err(LoadError::DuplicateAlias {
                package: package.to_string(),
                alias: record.name,
            });
        }
        if record.path.trim().is_empty() {
            return Err(LoadError::malformed(
                package,
                "commands",
                format!("command '{}' has an empty path", record.name),
            ));
        }
        if !record.path.starts_with('/') {
            return Err(LoadError::malformed(
                package,
                "commands",
                format!("command '{}' path '{}' is not absolute", record.name, record.path),
            ));
        }

        let options = record
            .options
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());
        if let Some(raw) = &options {
            shell_words::split(raw).map_err(|e| {
                LoadError::malformed(
                    package,
                    "commands",
                    format!("command '{}' has invalid options: {}", record.name, e),
                )
            })?;
        }

        commands.push(ProvidedCommand {
            name: record.name,
            path: record.path,
            options,
        });
    }

    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rclone() -> PackageRecord {
        PackageRecord::new("rclone", "ghcr.io/autamus/rclone")
            .with_version("1.54.0")
            .with_version("1.55.1")
    }

    #[test]
    fn test_valid_record_builds_entry() {
        let entry = PackageEntry::from_record(rclone()).expect("Should build");
        assert_eq!(entry.name(), "rclone");
        assert_eq!(entry.versions(), &["1.54.0", "1.55.1"]);
        assert_eq!(entry.latest_version(), "1.55.1");
        assert_eq!(entry.entry_binary(), "rclone");
        assert!(entry.provided_commands().is_empty());
    }

    #[test]
    fn test_empty_name_is_malformed() {
        let record = PackageRecord::new("", "ghcr.io/autamus/x").with_version("1.0");
        let err = PackageEntry::from_record(record).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "name", .. }));
    }

    #[test]
    fn test_empty_versions_is_malformed() {
        let record = PackageRecord::new("rsync", "ghcr.io/autamus/rsync");
        let err = PackageEntry::from_record(record).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "versions", .. }));
    }

    #[test]
    fn test_repeated_version_is_malformed() {
        let record = rclone().with_version("1.55.1");
        let err = PackageEntry::from_record(record).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "versions", .. }));
    }

    #[test]
    fn test_default_version_must_be_declared() {
        let record = rclone().with_default_version("2.0.0");
        let err = PackageEntry::from_record(record).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedEntry {
                field: "default_version",
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_command_name_rejected() {
        let record = rclone()
            .with_command(CommandRecord::new("rclone", "/usr/bin/rclone"))
            .with_command(CommandRecord::new("rclone", "/usr/local/bin/rclone"));
        let err = PackageEntry::from_record(record).unwrap_err();
        assert_eq!(
            err,
            LoadError::DuplicateAlias {
                package: "rclone".to_string(),
                alias: "rclone".to_string(),
            }
        );
    }

    #[test]
    fn test_command_path_must_be_absolute() {
        let record = rclone().with_command(CommandRecord::new("rclone", "bin/rclone"));
        let err = PackageEntry::from_record(record).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "commands", .. }));
    }

    #[test]
    fn test_command_options_kept_verbatim() {
        let record = rclone().with_command(
            CommandRecord::new("rclone", "/usr/bin/rclone")
                .with_options(" --cleanenv --bind '/scratch space' "),
        );
        let entry = PackageEntry::from_record(record).expect("Should build");
        assert_eq!(
            entry.provided_commands()[0].options(),
            Some("--cleanenv --bind '/scratch space'")
        );
    }

    #[test]
    fn test_unbalanced_options_are_malformed() {
        let record = rclone().with_command(
            CommandRecord::new("rclone", "/usr/bin/rclone").with_options("--bind '/x"),
        );
        let err = PackageEntry::from_record(record).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "commands", .. }));
    }

    #[test]
    fn test_name_with_surrounding_whitespace_is_malformed() {
        let record = PackageRecord::new(" tensorflow ", "ghcr.io/autamus/tensorflow")
            .with_version("2.5.0");
        let err = PackageEntry::from_record(record).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "name", .. }));
    }

    #[test]
    fn test_alias_with_whitespace_is_malformed() {
        for alias in [" tf", "tf ", "tensor flow"] {
            let record = PackageRecord::new("tensorflow", "ghcr.io/autamus/tensorflow")
                .with_version("2.5.0")
                .with_alias(alias);
            let err = PackageEntry::from_record(record).unwrap_err();
            assert!(
                matches!(err, LoadError::MalformedEntry { field: "aliases", .. }),
                "alias {:?} gave {:?}",
                alias,
                err
            );
        }
    }

    #[test]
    fn test_command_name_with_whitespace_is_malformed() {
        let record = rclone().with_command(CommandRecord::new("rclone ", "/usr/bin/rclone"));
        let err = PackageEntry::from_record(record).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "commands", .. }));
    }

    fn table(source: &str) -> toml::Table {
        source.parse().expect("Should parse table")
    }

    #[test]
    fn test_from_table_reads_record() {
        let record = PackageRecord::from_table(table(
            r#"
name = "mpich"
aliases = ["mpi"]
versions = ["3.4.1", "3.4.2"]
container_url = "ghcr.io/autamus/mpich"
commands = [{ name = "mpirun", path = "/opt/view/bin/mpirun" }]
"#,
        ))
        .expect("Should deserialize");
        assert_eq!(
            record,
            PackageRecord::new("mpich", "ghcr.io/autamus/mpich")
                .with_alias("mpi")
                .with_version("3.4.1")
                .with_version("3.4.2")
                .with_command(CommandRecord::new("mpirun", "/opt/view/bin/mpirun"))
        );
    }

    #[test]
    fn test_from_table_names_mistyped_field() {
        let err = PackageRecord::from_table(table(
            r#"
name = "mpc"
versions = "1.2.1"
container_url = "ghcr.io/autamus/mpc"
"#,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedEntry { ref package, field: "versions", .. } if package == "mpc"
        ));

        let err = PackageRecord::from_table(table("name = 'rsync'\nsize = '50MB'")).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "size", .. }));
    }

    #[test]
    fn test_from_table_rejects_unknown_keys() {
        let err = PackageRecord::from_table(table(
            r#"
name = "tensorflow"
versions = ["2.5.0"]
container_url = "ghcr.io/autamus/tensorflow"
provided_commands = [{ name = "python", path = "/usr/local/bin/python" }]
"#,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::malformed("tensorflow", "package", "unknown field 'provided_commands'")
        );

        let err = PackageRecord::from_table(table(
            r#"
name = "tensorflow"
commands = [{ name = "python", path = "/usr/local/bin/python", opts = "--nv" }]
"#,
        ))
        .unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { field: "commands", .. }));
    }

    #[test]
    fn test_entry_binary_override() {
        let record = PackageRecord::new("libpng", "ghcr.io/autamus/libpng")
            .with_version("1.6.37")
            .with_entry_binary("pngfix");
        let entry = PackageEntry::from_record(record).expect("Should build");
        assert_eq!(entry.entry_binary(), "pngfix");
    }
}
