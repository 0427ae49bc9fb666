use serde::Deserialize;
use vestibule_extension_db::ExtensionDescriptor;
use vestibule_symtab::{AppManifest, RoleDeclaration};

/// One `.vbl` source document, as written on disk.
///
/// Every field is optional; an empty document is a valid no-op load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceDoc {
    /// Modules that must have been brought in by the dependency bundle.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Symbols this document reopens; they must already be defined.
    #[serde(default)]
    pub reopens: Vec<String>,
    /// Symbols this document defines.
    #[serde(default)]
    pub defines: Vec<String>,
    /// Role declarations made by this document.
    #[serde(default)]
    pub roles: Vec<RoleDecl>,
    /// Application manifest; only meaningful in a config entry point.
    #[serde(default)]
    pub application: Option<AppManifest>,
    /// Extension declarations registered when this document loads.
    #[serde(default)]
    pub extensions: Vec<ExtensionDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleDecl {
    pub owner: String,
    pub role: String,
    #[serde(flatten)]
    pub declaration: RoleDeclaration,
}
