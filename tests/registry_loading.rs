//! Loading registry documents from disk

use std::fs;
use std::path::Path;

use container_docgen::{load_registry, CommandEngine, LoadError, RenderError, Runtime};

fn demo_registry() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/registry.toml")
}

#[test]
fn test_demo_registry_loads_cleanly() {
    let (report, _config) = load_registry(&demo_registry()).expect("Should load demo registry");
    assert!(report.is_clean(), "unexpected errors: {:?}", report.errors);

    let names: Vec<&str> = report.registry.names().collect();
    assert_eq!(
        names,
        vec!["rclone", "rsync", "tensorflow", "mpich", "mpc", "libpng", "nco"]
    );
}

#[test]
fn test_demo_registry_renders_every_package() {
    let (report, config) = load_registry(&demo_registry()).expect("Should load demo registry");
    let engine = CommandEngine::new(config);

    let docker = engine.render_registry(&report.registry, Runtime::Docker).unwrap();
    assert!(docker.iter().all(|page| page.commands.len() == 5));

    let singularity = engine
        .render_registry(&report.registry, Runtime::Singularity)
        .unwrap();
    let nco = singularity.iter().find(|p| p.package == "nco").unwrap();
    assert_eq!(nco.version.tag(), "5.0.0");
    assert_eq!(nco.commands.len(), 7);
    assert_eq!(
        nco.get("ncks").unwrap().invocation(),
        "exec docker://ghcr.io/autamus/nco:5.0.0 /opt/view/bin/ncks"
    );
}

#[test]
fn test_lookup_through_alias_in_demo_registry() {
    let (report, _config) = load_registry(&demo_registry()).unwrap();
    let tf = report.registry.resolve("tf").expect("alias resolves");
    assert_eq!(tf.name(), "tensorflow");
    assert_eq!(tf.entry_binary(), "python");
}

#[test]
fn test_partial_failure_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.toml");
    fs::write(
        &path,
        r#"
[[package]]
name = "rsync"
versions = ["3.2.3"]
container_url = "ghcr.io/autamus/rsync"

[[package]]
name = "mpc"
versions = []
container_url = "ghcr.io/autamus/mpc"

[[package]]
name = "libpng"
versions = ["1.6.37"]
default_version = "1.6.36"
container_url = "ghcr.io/autamus/libpng"

[[package]]
name = "nco"
versions = ["5.0.0"]
container_url = "ghcr.io/autamus/nco"
"#,
    )
    .unwrap();

    let (report, _config) = load_registry(&path).expect("Should load");
    let names: Vec<&str> = report.registry.names().collect();
    assert_eq!(names, vec!["rsync", "nco"]);

    assert_eq!(report.errors.len(), 2);
    assert!(matches!(
        &report.errors[0],
        LoadError::MalformedEntry { package, field: "versions", .. } if package == "mpc"
    ));
    assert!(matches!(
        &report.errors[1],
        LoadError::MalformedEntry { package, field: "default_version", .. }
            if package == "libpng"
    ));
}

#[test]
fn test_mistyped_entry_does_not_abort_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.toml");
    fs::write(
        &path,
        r#"
[[package]]
name = "rsync"
versions = ["3.2.3"]
container_url = "ghcr.io/autamus/rsync"

[[package]]
name = "mpc"
versions = "1.2.1"
container_url = "ghcr.io/autamus/mpc"

[[package]]
name = "tensorflow"
versions = ["2.5.0"]
container_url = "ghcr.io/autamus/tensorflow"
provided_commands = [{ name = "python", path = "/usr/local/bin/python" }]
"#,
    )
    .unwrap();

    let (report, _config) = load_registry(&path).expect("Should load");
    let names: Vec<&str> = report.registry.names().collect();
    assert_eq!(names, vec!["rsync"]);

    assert_eq!(report.errors.len(), 2);
    assert!(matches!(
        &report.errors[0],
        LoadError::MalformedEntry { package, field: "versions", .. } if package == "mpc"
    ));
    assert!(matches!(
        &report.errors[1],
        LoadError::MalformedEntry { package, field: "package", reason }
            if package == "tensorflow" && reason.contains("provided_commands")
    ));
}

#[test]
fn test_settings_from_file_apply_to_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.toml");
    fs::write(
        &path,
        r#"
[settings.singularity]
binary = "apptainer"
container_dir = "/shared/sif"

[[package]]
name = "rclone"
versions = ["1.55.1"]
container_url = "ghcr.io/autamus/rclone"
"#,
    )
    .unwrap();

    let (report, config) = load_registry(&path).unwrap();
    let engine = CommandEngine::new(config);
    let page = engine
        .render_package(report.registry.resolve("rclone").unwrap(), None, Runtime::Singularity)
        .unwrap();
    assert_eq!(
        page.get("rclone-inspect-runscript").unwrap().command_line(),
        "apptainer inspect -r /shared/sif/rclone/1.55.1/rclone_1.55.1.sif"
    );
}

#[test]
fn test_malformed_toml_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.toml");
    fs::write(&path, "[[package]\nname = \"rclone\"").unwrap();

    let err = load_registry(&path).unwrap_err();
    assert!(matches!(err, RenderError::Config(_)));
}
