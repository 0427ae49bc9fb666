use std::path::{Path, PathBuf};

use serde::Serialize;
use vestibule_source::{LoadError, SourceLoader};
use vestibule_symtab::SymbolTable;

use crate::framework::{FeatureOutcome, HostFramework};
use crate::tree::eager_load_tree;

pub const APPLICATION_ENTRY: &str = "config/application.vbl";
pub const ENVIRONMENT_ENTRY: &str = "config/environment.vbl";

#[derive(Debug, Clone, Copy, Default)]
pub struct AppOptions {
    /// Load the environment entry point instead of the bare application.
    pub environment: bool,
    /// Eager-load the application's declared namespaces after loading.
    pub eager_load: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AppOutcome {
    /// No application configuration at the conventional location.
    #[default]
    NotPresent,
    Loaded,
    /// The entry point exists in name only; its framework is not
    /// installed. Swallowed, never surfaced.
    FrameworkMissing,
}

/// Loads the host application's configuration entry point.
///
/// A missing application is a no-op. A module-not-found class failure
/// on the entry point is swallowed; every other error class propagates.
pub fn load_application(
    root: &Path,
    options: AppOptions,
    loader: &mut dyn SourceLoader,
    table: &mut SymbolTable,
    framework: &mut dyn HostFramework,
) -> Result<AppOutcome, LoadError> {
    if !root.join(APPLICATION_ENTRY).exists() {
        return Ok(AppOutcome::NotPresent);
    }

    if framework.silence_deprecations() == FeatureOutcome::Unsupported {
        log::debug!("no deprecation reporting to silence");
    }

    let entry = if options.environment {
        ENVIRONMENT_ENTRY
    } else {
        APPLICATION_ENTRY
    };
    match loader.load(&root.join(entry), table) {
        Ok(()) => {}
        Err(err) if not_installed(&err) => {
            log::debug!("skipping application load: {err}");
            return Ok(AppOutcome::FrameworkMissing);
        }
        Err(err) => return Err(err),
    }

    if options.eager_load {
        eager_load(root, loader, table, framework)?;
    }
    Ok(AppOutcome::Loaded)
}

/// The tolerated "framework is not installed" class: a bundled module
/// the entry point requires is absent, or the entry file itself is.
fn not_installed(err: &LoadError) -> bool {
    match err {
        LoadError::MissingModule { .. } => true,
        LoadError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
        _ => false,
    }
}

fn eager_load(
    root: &Path,
    loader: &mut dyn SourceLoader,
    table: &mut SymbolTable,
    framework: &mut dyn HostFramework,
) -> Result<(), LoadError> {
    if framework.before_eager_load(table) == FeatureOutcome::Unsupported {
        log::debug!("no before-eager-load hook installed");
    }
    let declared: Vec<PathBuf> = table
        .application()
        .map(|app| app.eager_load_roots.clone())
        .unwrap_or_default();
    for namespace in declared {
        let resolved = if namespace.is_absolute() {
            namespace
        } else {
            root.join(namespace)
        };
        if !resolved.exists() {
            log::debug!("declared eager-load root {} is absent", resolved.display());
            continue;
        }
        eager_load_tree(&resolved, loader, table)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, File};
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use vestibule_source::ManifestLoader;

    use super::*;
    use crate::framework::NoFramework;

    fn write_doc(root: &Path, rel: &str, body: serde_json::Value) {
        let path = root.join(rel);
        create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(path).unwrap();
        write!(file, "{body}").unwrap();
    }

    /// Framework double that records which capabilities were exercised.
    #[derive(Default)]
    struct ProbedFramework {
        silenced: bool,
        hooked: bool,
    }

    impl HostFramework for ProbedFramework {
        fn silence_deprecations(&mut self) -> FeatureOutcome {
            self.silenced = true;
            FeatureOutcome::Applied
        }

        fn before_eager_load(&mut self, _table: &SymbolTable) -> FeatureOutcome {
            self.hooked = true;
            FeatureOutcome::Applied
        }
    }

    #[test]
    fn missing_application_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mut loader = ManifestLoader::new();
        let mut table = SymbolTable::new();
        let mut framework = NoFramework;

        let outcome = load_application(
            dir.path(),
            AppOptions::default(),
            &mut loader,
            &mut table,
            &mut framework,
        )
        .unwrap();

        assert_eq!(outcome, AppOutcome::NotPresent);
        assert!(table.is_empty());
    }

    #[test]
    fn environment_mode_picks_the_environment_entry_point() {
        let dir = tempdir().unwrap();
        write_doc(
            dir.path(),
            APPLICATION_ENTRY,
            serde_json::json!({"defines": ["app.base"]}),
        );
        write_doc(
            dir.path(),
            ENVIRONMENT_ENTRY,
            serde_json::json!({"defines": ["app.env"]}),
        );
        let mut loader = ManifestLoader::new();
        let mut table = SymbolTable::new();
        let mut framework = NoFramework;

        let options = AppOptions {
            environment: true,
            eager_load: false,
        };
        let outcome =
            load_application(dir.path(), options, &mut loader, &mut table, &mut framework)
                .unwrap();

        assert_eq!(outcome, AppOutcome::Loaded);
        assert!(table.contains("app.env"));
        assert!(!table.contains("app.base"));
    }

    #[test]
    fn default_mode_picks_the_application_entry_point() {
        let dir = tempdir().unwrap();
        write_doc(
            dir.path(),
            APPLICATION_ENTRY,
            serde_json::json!({"defines": ["app.base"]}),
        );
        let mut loader = ManifestLoader::new();
        let mut table = SymbolTable::new();
        let mut framework = NoFramework;

        let outcome = load_application(
            dir.path(),
            AppOptions::default(),
            &mut loader,
            &mut table,
            &mut framework,
        )
        .unwrap();

        assert_eq!(outcome, AppOutcome::Loaded);
        assert!(table.contains("app.base"));
    }

    #[test]
    fn missing_required_module_is_swallowed() {
        let dir = tempdir().unwrap();
        write_doc(
            dir.path(),
            APPLICATION_ENTRY,
            serde_json::json!({"requires": ["postgres"], "defines": ["app.base"]}),
        );
        let mut loader = ManifestLoader::new();
        let mut table = SymbolTable::new();
        let mut framework = NoFramework;

        let outcome = load_application(
            dir.path(),
            AppOptions::default(),
            &mut loader,
            &mut table,
            &mut framework,
        )
        .unwrap();

        assert_eq!(outcome, AppOutcome::FrameworkMissing);
    }

    #[test]
    fn missing_environment_entry_point_is_swallowed_too() {
        let dir = tempdir().unwrap();
        write_doc(
            dir.path(),
            APPLICATION_ENTRY,
            serde_json::json!({"defines": ["app.base"]}),
        );
        let mut loader = ManifestLoader::new();
        let mut table = SymbolTable::new();
        let mut framework = NoFramework;

        let options = AppOptions {
            environment: true,
            eager_load: false,
        };
        let outcome =
            load_application(dir.path(), options, &mut loader, &mut table, &mut framework)
                .unwrap();

        assert_eq!(outcome, AppOutcome::FrameworkMissing);
    }

    #[test]
    fn malformed_entry_point_propagates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APPLICATION_ENTRY);
        create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        let mut loader = ManifestLoader::new();
        let mut table = SymbolTable::new();
        let mut framework = NoFramework;

        let err = load_application(
            dir.path(),
            AppOptions::default(),
            &mut loader,
            &mut table,
            &mut framework,
        )
        .unwrap_err();

        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn eager_load_walks_declared_roots_and_runs_the_hook() {
        let dir = tempdir().unwrap();
        write_doc(
            dir.path(),
            APPLICATION_ENTRY,
            serde_json::json!({
                "defines": ["app.base"],
                "application": {"name": "shop", "eager_load_roots": ["app/models", "app/jobs"]}
            }),
        );
        write_doc(
            dir.path(),
            "app/models/invoice.vbl",
            serde_json::json!({"defines": ["shop.invoice"]}),
        );
        let mut loader = ManifestLoader::new();
        let mut table = SymbolTable::new();
        let mut framework = ProbedFramework::default();

        let options = AppOptions {
            environment: false,
            eager_load: true,
        };
        let outcome =
            load_application(dir.path(), options, &mut loader, &mut table, &mut framework)
                .unwrap();

        assert_eq!(outcome, AppOutcome::Loaded);
        assert!(framework.silenced);
        assert!(framework.hooked);
        // app/jobs does not exist; its absence is tolerated.
        assert!(table.contains("shop.invoice"));
    }
}
