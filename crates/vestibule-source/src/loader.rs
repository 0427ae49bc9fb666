use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use vestibule_extension_db::ExtensionHub;
use vestibule_symtab::{DeclareError, Provenance, RoleCapture, RoleRegistry, SymbolTable};

use crate::document::SourceDoc;

/// File extension of Vestibule source documents.
pub const SOURCE_EXTENSION: &str = "vbl";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid source document {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing bundled module `{module}` required by {}", .path.display())]
    MissingModule { module: String, path: PathBuf },
    #[error("cannot reopen undefined symbol `{symbol}` in {}", .path.display())]
    UndefinedSymbol { symbol: String, path: PathBuf },
    #[error("invalid role declaration in {}: {source}", .path.display())]
    Role {
        path: PathBuf,
        #[source]
        source: DeclareError,
    },
}

impl LoadError {
    /// The "framework not installed" class, tolerated when loading the
    /// application entry point.
    pub fn is_missing_module(&self) -> bool {
        matches!(self, Self::MissingModule { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::MissingModule { path, .. }
            | Self::UndefinedSymbol { path, .. }
            | Self::Role { path, .. } => path,
        }
    }
}

/// The primitive that brings one source file into the process.
pub trait SourceLoader {
    fn load(&mut self, path: &Path, table: &mut SymbolTable) -> Result<(), LoadError>;
}

/// The shipped load primitive: evaluates `.vbl` documents against the
/// symbol table.
///
/// A path that loaded successfully is never re-evaluated. A failed path
/// is forgotten, so a later attempt replays the whole document; the
/// table upserts make that replay converge.
#[derive(Debug, Default)]
pub struct ManifestLoader {
    loaded: BTreeSet<PathBuf>,
    roles: RoleCapture,
    hub: Option<Arc<ExtensionHub>>,
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader whose documents may declare extensions; declarations
    /// register into `hub` as their files load.
    pub fn with_extension_hub(hub: Arc<ExtensionHub>) -> Self {
        Self {
            hub: Some(hub),
            ..Self::default()
        }
    }

    /// Role declarations captured so far, readable without replaying
    /// any document.
    pub fn roles(&self) -> &RoleRegistry {
        self.roles.registry()
    }

    fn evaluate(
        &mut self,
        path: &Path,
        doc: SourceDoc,
        table: &mut SymbolTable,
    ) -> Result<(), LoadError> {
        for module in &doc.requires {
            if !table.has_module(module) {
                return Err(LoadError::MissingModule {
                    module: module.clone(),
                    path: path.to_path_buf(),
                });
            }
        }
        for symbol in &doc.reopens {
            if !table.contains(symbol) {
                return Err(LoadError::UndefinedSymbol {
                    symbol: symbol.clone(),
                    path: path.to_path_buf(),
                });
            }
            table.reopen(symbol, path);
        }
        for name in &doc.defines {
            table.define(name.clone(), Provenance::Source(path.to_path_buf()));
        }
        if let Some(application) = doc.application {
            table.set_application(application);
        }
        if let Some(hub) = &self.hub {
            for extension in doc.extensions {
                hub.register(extension);
            }
        } else if !doc.extensions.is_empty() {
            log::debug!(
                "{}: no extension hub wired, ignoring {} extension declaration(s)",
                path.display(),
                doc.extensions.len()
            );
        }
        for decl in doc.roles {
            self.roles
                .declare_role(table, &decl.owner, &decl.role, decl.declaration)
                .map_err(|source| LoadError::Role {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }
}

impl SourceLoader for ManifestLoader {
    fn load(&mut self, path: &Path, table: &mut SymbolTable) -> Result<(), LoadError> {
        if self.loaded.contains(path) {
            return Ok(());
        }
        let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: SourceDoc = serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        self.evaluate(path, doc, table)?;
        self.loaded.insert(path.to_path_buf());
        Ok(())
    }
}
