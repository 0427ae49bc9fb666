use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use vestibule_bootstrap::{AppOptions, Bootstrap, BootstrapState, NoFramework, StaticBundle};
use vestibule_extension_db::ExtensionHub;
use vestibule_source::ManifestLoader;
use vestibule_symtab::{RoleRegistry, SymbolTable};

/// Bring a Vestibule application into a fully-loaded state and dump it
/// for downstream introspection tooling.
#[derive(Parser, Debug)]
#[command(name = "vestibule-cli")]
struct Args {
    /// Application root directory
    #[arg(long, default_value = ".")]
    app_root: PathBuf,

    /// Load the environment entry point instead of the application one
    #[arg(long)]
    environment: bool,

    /// Eager-load the application's declared namespaces
    #[arg(long)]
    eager_load: bool,

    /// Newline-delimited listing of resolved bundle modules
    #[arg(long, value_name = "FILE")]
    bundle: Option<PathBuf>,

    /// Bootstrap file loaded before anything else
    #[arg(long, value_name = "FILE")]
    pre_init: Option<PathBuf>,

    /// Bootstrap file loaded after the application
    #[arg(long, value_name = "FILE")]
    post_init: Option<PathBuf>,

    /// Emit the loaded state as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Dump<'a> {
    state: &'a BootstrapState,
    symbols: &'a SymbolTable,
    roles: &'a RoleRegistry,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut bundle = match &args.bundle {
        Some(path) => StaticBundle::from_lock_listing(path)?,
        None => StaticBundle::default(),
    };
    let hub = ExtensionHub::global();
    let mut loader = ManifestLoader::with_extension_hub(Arc::clone(&hub));
    let mut framework = NoFramework;
    let mut table = SymbolTable::new();

    let options = AppOptions {
        environment: args.environment,
        eager_load: args.eager_load,
    };
    let mut bootstrap = Bootstrap::new(&args.app_root, &mut bundle, &mut loader, &mut framework)
        .with_options(options)
        .with_extension_hub(Arc::clone(&hub));
    let state = bootstrap.run(&mut table, args.pre_init.as_deref(), args.post_init.as_deref())?;

    if !state.failures.is_empty() {
        let deferred: usize = state.failures.values().map(Vec::len).sum();
        warn!("{deferred} file(s) needed the retry pass");
    }

    if args.json {
        let dump = Dump {
            state: &state,
            symbols: &table,
            roles: loader.roles(),
        };
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    println!("application: {:?}", state.application);
    println!("symbols: {}", table.len());
    println!("extensions: {}", state.extensions.len());
    for extension in &state.extensions {
        let retried = state.failures.get(&extension.name).map_or(0, Vec::len);
        println!(
            "  {} ({} root(s), {} retried)",
            extension.name,
            extension.load_roots.len(),
            retried
        );
    }
    println!("roles captured: {}", loader.roles().len());
    Ok(())
}
