use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::roles::{DeclareError, RoleDeclaration};

/// Where a symbol definition came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Defined by a module the dependency bundle brought into the process.
    Bundle(String),
    /// Defined by the source document at this path.
    Source(PathBuf),
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolRecord {
    pub name: String,
    pub defined_in: Provenance,
    pub reopened_in: Vec<PathBuf>,
    pub roles: BTreeMap<String, RoleDeclaration>,
}

/// Application manifest carried by the configuration entry point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub eager_load_roots: Vec<PathBuf>,
}

/// The process namespace every load mutates.
///
/// All mutation goes through `&mut self`, so there is exactly one
/// serialization point and loading stays single-threaded by construction.
/// One table lives for one bootstrap run.
#[derive(Debug, Default, Serialize)]
pub struct SymbolTable {
    symbols: BTreeMap<String, SymbolRecord>,
    modules: BTreeSet<String>,
    application: Option<AppManifest>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a definition.
    ///
    /// Re-defining an existing symbol records the new provenance as a
    /// reopen instead of failing, so a document that half-loaded on a
    /// first pass converges when retried.
    pub fn define(&mut self, name: impl Into<String>, provenance: Provenance) {
        let name = name.into();
        match self.symbols.get_mut(&name) {
            Some(record) => {
                if let Provenance::Source(path) = provenance {
                    if record.defined_in != Provenance::Source(path.clone())
                        && !record.reopened_in.contains(&path)
                    {
                        record.reopened_in.push(path);
                    }
                }
            }
            None => {
                self.symbols.insert(
                    name.clone(),
                    SymbolRecord {
                        name,
                        defined_in: provenance,
                        reopened_in: Vec::new(),
                        roles: BTreeMap::new(),
                    },
                );
            }
        }
    }

    /// Records that `path` reopens `name`. No-op if the symbol is absent;
    /// callers check [`SymbolTable::contains`] first and surface their
    /// own error for unresolved reopens.
    pub fn reopen(&mut self, name: &str, path: &Path) {
        if let Some(record) = self.symbols.get_mut(name) {
            if !record.reopened_in.contains(&path.to_path_buf()) {
                record.reopened_in.push(path.to_path_buf());
            }
        }
    }

    /// The undecorated role declaration API. Callers that need the
    /// declarations to be retrievable later route through
    /// [`crate::RoleCapture::declare_role`] instead.
    pub fn declare_role(
        &mut self,
        owner: &str,
        role: impl Into<String>,
        declaration: RoleDeclaration,
    ) -> Result<(), DeclareError> {
        let record = self
            .symbols
            .get_mut(owner)
            .ok_or_else(|| DeclareError::UnknownSymbol(owner.to_string()))?;
        record.roles.insert(role.into(), declaration);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SymbolRecord> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolRecord> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn add_module(&mut self, module: impl Into<String>) {
        self.modules.insert(module.into());
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn set_application(&mut self, manifest: AppManifest) {
        self.application = Some(manifest);
    }

    pub fn application(&self) -> Option<&AppManifest> {
        self.application.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn define_then_redefine_records_reopen_provenance() {
        let mut table = SymbolTable::new();
        table.define("core.record", Provenance::Source(PathBuf::from("/app/a.vbl")));
        table.define("core.record", Provenance::Source(PathBuf::from("/app/b.vbl")));

        let record = table.get("core.record").unwrap();
        assert_eq!(
            record.defined_in,
            Provenance::Source(PathBuf::from("/app/a.vbl"))
        );
        assert_eq!(record.reopened_in, vec![PathBuf::from("/app/b.vbl")]);
    }

    #[test]
    fn redefine_from_same_path_is_idempotent() {
        let mut table = SymbolTable::new();
        table.define("core.record", Provenance::Source(PathBuf::from("/app/a.vbl")));
        table.define("core.record", Provenance::Source(PathBuf::from("/app/a.vbl")));

        let record = table.get("core.record").unwrap();
        assert!(record.reopened_in.is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn declare_role_requires_a_defined_owner() {
        let mut table = SymbolTable::new();
        let err = table
            .declare_role("billing.invoice", "payer", RoleDeclaration::default())
            .unwrap_err();
        assert!(matches!(err, DeclareError::UnknownSymbol(name) if name == "billing.invoice"));
    }

    #[test]
    fn declare_role_attaches_to_the_owner_record() {
        let mut table = SymbolTable::new();
        table.define("billing.invoice", Provenance::Bundle("billing".into()));
        let declaration = RoleDeclaration {
            variants: vec!["person".into(), "company".into()],
            options: BTreeMap::new(),
        };
        table
            .declare_role("billing.invoice", "payer", declaration.clone())
            .unwrap();

        let record = table.get("billing.invoice").unwrap();
        assert_eq!(record.roles.get("payer"), Some(&declaration));
    }
}
