use std::path::{Path, PathBuf};

use vestibule_source::{LoadError, SourceLoader, SOURCE_EXTENSION};
use vestibule_symtab::SymbolTable;
use walkdir::WalkDir;

/// Recursively enumerates the source documents under `root`,
/// lexicographically sorted. Deterministic for identical filesystem
/// contents.
pub fn enumerate_sources(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if let Some(io) = err.io_error() {
                    log::debug!("skipping entry under {}: {}", root.display(), io);
                }
                continue;
            }
        };
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    files
}

/// First-pass failures of a tree load, kept for diagnostics. Files that
/// fail the retry pass as well are dropped without record.
#[derive(Debug, Default)]
pub struct TreeReport {
    pub attempted: usize,
    pub retried: Vec<PathBuf>,
}

/// Loads every source document under `roots`, tolerating failures.
///
/// A document may reopen a symbol that a later sibling defines, so
/// first-pass failures are retried once, in failure order, after the
/// full sweep. Documents still failing after the retry are skipped;
/// this call never errors.
pub fn load_tree(
    roots: &[PathBuf],
    loader: &mut dyn SourceLoader,
    table: &mut SymbolTable,
) -> TreeReport {
    let mut report = TreeReport::default();
    let mut failed = Vec::new();
    for root in roots {
        for file in enumerate_sources(root) {
            report.attempted += 1;
            if let Err(err) = loader.load(&file, table) {
                log::debug!("deferring {}: {err}", file.display());
                failed.push(file);
            }
        }
    }
    // A first-pass failure may just have been load order; one more try.
    for file in &failed {
        if let Err(err) = loader.load(file, table) {
            log::debug!("giving up on {}: {err}", file.display());
        }
    }
    report.retried = failed;
    report
}

/// Fail-fast variant used for the application's own namespaces, where a
/// load failure is a configuration error rather than an ordering one.
pub fn eager_load_tree(
    root: &Path,
    loader: &mut dyn SourceLoader,
    table: &mut SymbolTable,
) -> Result<(), LoadError> {
    for file in enumerate_sources(root) {
        loader.load(&file, table)?;
    }
    Ok(())
}
