use std::sync::Arc;

use elsa::sync::FrozenMap;
use log::debug;

use crate::ident::ESCAPE;
use crate::types::TypeDecl;
use crate::universe::{LoadError, Package, PackageLoader, SourceKind, TypeSource};

/// Backend over compiled package metadata. Packages load lazily on first
/// reference and stay cached for the life of the universe; a path the loader
/// does not know is *not* cached, so it resolves once its package appears.
pub struct DeclBackend {
    loader: Arc<dyn PackageLoader>,
    packages: FrozenMap<String, Box<Package>>,
}

impl DeclBackend {
    pub fn new(loader: Arc<dyn PackageLoader>) -> Self {
        DeclBackend {
            loader,
            packages: FrozenMap::new(),
        }
    }

    pub fn loader(&self) -> &Arc<dyn PackageLoader> {
        &self.loader
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        assert!(
            !path.contains(ESCAPE),
            "package path must be unwrapped: {:?}",
            path
        );
        if let Some(package) = self.packages.get(path) {
            return Some(package);
        }
        match self.loader.load(path) {
            Ok(package) => Some(self.packages.insert(path.to_owned(), Box::new(package))),
            Err(LoadError::NotFound { .. }) => {
                debug!("package {:?} not found", path);
                None
            }
            Err(err @ LoadError::MalformedPath { .. }) => panic!("{}", err),
        }
    }
}

impl TypeSource for DeclBackend {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Decl
    }

    fn lookup(&self, pkg_path: &str, name: &str) -> Option<Arc<TypeDecl>> {
        self.package(pkg_path)?.decl(name).cloned()
    }
}
