use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use vestibule_symtab::SymbolTable;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read module listing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dependency resolution failed: {0}")]
    Resolution(String),
}

/// Brings the resolved dependency set into the process. Resolution and
/// installation happen upstream; the orchestrator only needs this call,
/// and treats any failure as fatal.
pub trait DependencyBundle {
    fn load_resolved(&mut self, table: &mut SymbolTable) -> Result<(), BundleError>;
}

/// An already-resolved module set.
#[derive(Debug, Clone, Default)]
pub struct StaticBundle {
    modules: Vec<String>,
}

impl StaticBundle {
    pub fn new(modules: Vec<String>) -> Self {
        Self { modules }
    }

    /// Reads a newline-delimited module listing; blank lines and `#`
    /// comments are ignored.
    pub fn from_lock_listing(path: &Path) -> Result<Self, BundleError> {
        let raw = fs::read_to_string(path).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let modules = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();
        Ok(Self { modules })
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }
}

impl DependencyBundle for StaticBundle {
    fn load_resolved(&mut self, table: &mut SymbolTable) -> Result<(), BundleError> {
        for module in &self.modules {
            table.add_module(module.clone());
        }
        Ok(())
    }
}
