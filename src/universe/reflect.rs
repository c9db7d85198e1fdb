use std::sync::Arc;

use elsa::sync::FrozenMap;

use crate::types::TypeDecl;
use crate::universe::{SourceKind, TypeSource};

/// Backend over declarations observed at runtime. There is no loader behind
/// it; callers register what they see, one declaration at a time.
#[derive(Default)]
pub struct ReflectBackend {
    decls: FrozenMap<String, Box<Arc<TypeDecl>>>,
}

fn key(pkg_path: &str, name: &str) -> String {
    format!("{}.{}", pkg_path, name)
}

impl ReflectBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration and returns the registered copy. The first
    /// registration of a (package, name) pair wins; later ones are dropped,
    /// so every holder of the name sees one identical declaration.
    pub fn register(&self, decl: TypeDecl) -> Arc<TypeDecl> {
        self.decls
            .insert(key(&decl.pkg.path, &decl.name), Box::new(Arc::new(decl)))
            .clone()
    }
}

impl TypeSource for ReflectBackend {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Reflect
    }

    fn lookup(&self, pkg_path: &str, name: &str) -> Option<Arc<TypeDecl>> {
        self.decls.get(&key(pkg_path, name)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::types::{Basic, PackageRef, TypeDecl, TypeDescriptor};
    use crate::universe::{ReflectBackend, TypeSource};

    #[test]
    pub fn test_first_registration_wins() {
        let backend = ReflectBackend::new();
        let demo = PackageRef::new("demo");
        backend.register(TypeDecl::new(
            demo.clone(),
            "ID",
            TypeDescriptor::basic(Basic::Int64),
        ));
        let replayed = backend.register(TypeDecl::new(
            demo,
            "ID",
            TypeDescriptor::basic(Basic::String),
        ));
        assert_eq!(replayed.underlying, TypeDescriptor::basic(Basic::Int64));
        let looked_up = backend.lookup("demo", "ID").unwrap();
        assert_eq!(looked_up.underlying, TypeDescriptor::basic(Basic::Int64));
    }

    #[test]
    pub fn test_unregistered_names_are_absent() {
        let backend = ReflectBackend::new();
        assert!(backend.lookup("demo", "ID").is_none());
    }
}
