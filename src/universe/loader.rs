use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use smol_str::SmolStr;
use thiserror::Error;

use crate::types::TypeDecl;

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The path cannot name a package at all. Passing one in is a caller bug
    #[error("malformed package path {path:?}")]
    MalformedPath { path: String },
    /// No package lives at this path. An ordinary, recoverable outcome
    #[error("package {path:?} not found")]
    NotFound { path: String },
}

/// Compiled metadata for one package: its declarations, in declaration order.
#[derive(Debug, Clone)]
pub struct Package {
    pub path: SmolStr,
    pub name: SmolStr,
    decls: IndexMap<SmolStr, Arc<TypeDecl>>,
}

impl Package {
    pub fn new(path: impl Into<SmolStr>) -> Self {
        let path = path.into();
        let name = SmolStr::new(path.rsplit('/').next().unwrap_or(""));
        Package {
            path,
            name,
            decls: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, decl: TypeDecl) {
        self.decls.insert(decl.name.clone(), Arc::new(decl));
    }

    pub fn with(mut self, decl: TypeDecl) -> Self {
        self.insert(decl);
        self
    }

    pub fn decl(&self, name: &str) -> Option<&Arc<TypeDecl>> {
        self.decls.get(name)
    }

    pub fn decls(&self) -> impl Iterator<Item = &Arc<TypeDecl>> {
        self.decls.values()
    }
}

/// Where compiled package metadata comes from. Loaded packages are cached by
/// the backend, so a loader is asked about each path at most once per
/// universe, except paths it reported [LoadError::NotFound] for.
pub trait PackageLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<Package, LoadError>;
}

/// A loader backed by an in-memory registration map. The process-wide
/// universe uses one; tests and embedders register packages directly.
#[derive(Default)]
pub struct MapLoader {
    packages: Mutex<HashMap<SmolStr, Package>>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a package, replacing any previous registration at its path.
    /// Replacement only affects universes that have not loaded the path yet.
    pub fn add(&self, package: Package) {
        self.packages.lock().insert(package.path.clone(), package);
    }

    /// Registers a single declaration, creating its package on demand.
    pub fn add_decl(&self, decl: TypeDecl) {
        let mut packages = self.packages.lock();
        packages
            .entry(decl.pkg.path.clone())
            .or_insert_with(|| Package::new(decl.pkg.path.clone()))
            .insert(decl);
    }
}

impl PackageLoader for MapLoader {
    fn load(&self, path: &str) -> Result<Package, LoadError> {
        self.packages
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_owned(),
            })
    }
}
