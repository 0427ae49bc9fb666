use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use vestibule_extension_db::{discover_extensions, ExtensionDescriptor, ExtensionHub};
use vestibule_source::{LoadError, SourceLoader};
use vestibule_symtab::SymbolTable;

use crate::app::{load_application, AppOptions, AppOutcome};
use crate::bundle::{BundleError, DependencyBundle};
use crate::framework::HostFramework;
use crate::tree::load_tree;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to load bootstrap file {}: {source}", .path.display())]
    InitFile {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error("failed to load application: {0}")]
    Application(#[from] LoadError),
}

/// Outcome of one orchestrator run. One instance per run, never shared
/// across runs.
#[derive(Debug, Default, Serialize)]
pub struct BootstrapState {
    pub bundle_loaded: bool,
    pub application: AppOutcome,
    pub extensions: Vec<ExtensionDescriptor>,
    /// First-pass load failures per extension. Files that also failed
    /// the retry pass are not recorded anywhere.
    pub failures: BTreeMap<String, Vec<PathBuf>>,
}

/// Sequences one full bootstrap: optional pre-init file, dependency
/// bundle, application entry point, optional post-init file, then one
/// resilient tree load per discovered extension.
///
/// Every stage mutates the one symbol table, which is why the run is
/// strictly sequential and single-threaded. The orchestrator is not
/// re-entrant; callers serialize invocations.
pub struct Bootstrap<'a> {
    app_root: PathBuf,
    options: AppOptions,
    bundle: &'a mut dyn DependencyBundle,
    loader: &'a mut dyn SourceLoader,
    framework: &'a mut dyn HostFramework,
    hub: Option<Arc<ExtensionHub>>,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        app_root: impl Into<PathBuf>,
        bundle: &'a mut dyn DependencyBundle,
        loader: &'a mut dyn SourceLoader,
        framework: &'a mut dyn HostFramework,
    ) -> Self {
        Self {
            app_root: app_root.into(),
            options: AppOptions::default(),
            bundle,
            loader,
            framework,
            hub: None,
        }
    }

    pub fn with_options(mut self, options: AppOptions) -> Self {
        self.options = options;
        self
    }

    /// Without a hub, discovery yields no extensions (the hosting
    /// framework is absent).
    pub fn with_extension_hub(mut self, hub: Arc<ExtensionHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn run(
        &mut self,
        table: &mut SymbolTable,
        pre_init: Option<&Path>,
        post_init: Option<&Path>,
    ) -> Result<BootstrapState, BootstrapError> {
        let mut state = BootstrapState::default();

        self.load_init_file(pre_init, table)?;

        self.bundle.load_resolved(table)?;
        state.bundle_loaded = true;

        state.application = load_application(
            &self.app_root,
            self.options,
            self.loader,
            table,
            self.framework,
        )?;

        self.load_init_file(post_init, table)?;

        state.extensions = discover_extensions(self.hub.as_deref());
        for extension in &state.extensions {
            log::debug!("loading extension `{}`", extension.name);
            let roots: Vec<PathBuf> = extension
                .load_roots
                .iter()
                .map(|root| {
                    if root.is_absolute() {
                        root.clone()
                    } else {
                        self.app_root.join(root)
                    }
                })
                .collect();
            let report = load_tree(&roots, self.loader, table);
            if !report.retried.is_empty() {
                state.failures.insert(extension.name.clone(), report.retried);
            }
        }

        Ok(state)
    }

    /// User-supplied bootstrap code: silently skipped when absent,
    /// fatal when present and failing.
    fn load_init_file(
        &mut self,
        file: Option<&Path>,
        table: &mut SymbolTable,
    ) -> Result<(), BootstrapError> {
        let Some(file) = file else {
            return Ok(());
        };
        let file = absolutize(file);
        if !file.exists() {
            return Ok(());
        }
        self.loader
            .load(&file, table)
            .map_err(|source| BootstrapError::InitFile { path: file, source })
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
