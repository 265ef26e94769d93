//! Container Docgen CLI
//!
//! Usage:
//!   container-docgen [OPTIONS] [PACKAGE]
//!
//! Options:
//!   -r, --registry <FILE>    Registry document (TOML), also via DOCGEN_REGISTRY
//!   -R, --runtime <RUNTIME>  Target runtime: docker or singularity
//!   -V, --version <TAG>      Version to render instead of the default
//!       --hooks              Show override variables instead of their values
//!   -l, --list               List registered packages
//!   -a, --all                Render every registered package
//!   -h, --help               Print help

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use container_docgen::{
    load_registry, CommandEngine, Overrides, PackageCommands, Registry, Runtime,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RuntimeArg {
    Docker,
    Singularity,
}

impl From<RuntimeArg> for Runtime {
    fn from(arg: RuntimeArg) -> Self {
        match arg {
            RuntimeArg::Docker => Runtime::Docker,
            RuntimeArg::Singularity => Runtime::Singularity,
        }
    }
}

#[derive(Parser)]
#[command(name = "container-docgen")]
#[command(about = "Render pull/run and module commands for container packages")]
struct Cli {
    /// Package name or alias to render
    package: Option<String>,

    /// Registry document (TOML format)
    #[arg(short, long, env = "DOCGEN_REGISTRY", value_name = "FILE")]
    registry: PathBuf,

    /// Target runtime
    #[arg(short = 'R', long, value_enum, default_value = "docker")]
    runtime: RuntimeArg,

    /// Version tag to render (defaults to the package's default version)
    #[arg(short = 'V', long = "version", value_name = "TAG")]
    tag: Option<String>,

    /// Show the override variables as references instead of reading them
    #[arg(long)]
    hooks: bool,

    /// List registered packages
    #[arg(short, long)]
    list: bool,

    /// Render every registered package
    #[arg(short, long)]
    all: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = Runtime::from(cli.runtime);

    let (report, config) = match load_registry(&cli.registry) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading registry '{}': {}", cli.registry.display(), e);
            process::exit(1);
        }
    };
    for err in &report.errors {
        eprintln!("Warning: {}", err);
    }
    let registry = report.registry;

    if cli.list {
        print_list(&registry);
        return;
    }

    let engine = CommandEngine::new(config);
    let slots = match runtime {
        Runtime::Docker => &engine.config().docker.overrides,
        Runtime::Singularity => &engine.config().singularity.overrides,
    };
    let overrides = if cli.hooks {
        Overrides::references(slots)
    } else {
        Overrides::from_lookup(slots, |name| std::env::var(name).ok())
    };

    let pages = if cli.all {
        if cli.tag.is_some() {
            eprintln!("Error: --version cannot be combined with --all");
            process::exit(1);
        }
        engine.render_registry(&registry, runtime)
    } else {
        let Some(name) = cli.package.as_deref() else {
            eprintln!("Error: no package given (use --list to see registered packages)");
            process::exit(1);
        };
        registry
            .resolve(name)
            .and_then(|entry| engine.render_package(entry, cli.tag.as_deref(), runtime))
            .map(|page| vec![page])
    };

    match pages {
        Ok(pages) => {
            for (i, page) in pages.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_page(page, &overrides);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_list(registry: &Registry) {
    for entry in registry.entries() {
        let aliases = if entry.aliases().is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", entry.aliases().join(", "))
        };
        println!("{}{}: {}", entry.name(), aliases, entry.versions().join(", "));
    }
}

fn print_page(page: &PackageCommands, overrides: &Overrides) {
    if page.version.is_latest() {
        println!("# {} {} ({})", page.package, page.version.tag(), page.version.display_tag());
    } else {
        println!("# {} {}", page.package, page.version.tag());
    }
    for command in &page.commands {
        println!("{}: {}", command.label(), overrides.apply_to(command));
    }
}
