use std::collections::HashMap;
use std::sync::Arc;

use elsa::sync::FrozenMap;
use lazy_static::lazy_static;
use log::debug;
use parking_lot::Mutex;
use crate::ident::{id_to_type, type_to_id};
use crate::types::promote::{member_set, MemberSet};
use crate::types::{Basic, Type, TypeDecl, TypeDescriptor};

mod decl;
mod loader;
mod reflect;

pub use decl::DeclBackend;
pub use loader::{LoadError, MapLoader, Package, PackageLoader};
pub use reflect::ReflectBackend;

/// Which backend a type was observed through. Structurally equal types from
/// different backends print and compare alike but resolve names separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Compiled package metadata
    Decl,
    /// Declarations observed at runtime
    Reflect,
}

/// One backend's name-resolution surface.
pub(crate) trait TypeSource: Send + Sync {
    fn source_kind(&self) -> SourceKind;
    fn lookup(&self, pkg_path: &str, name: &str) -> Option<Arc<TypeDecl>>;
}

struct UniverseInner {
    decl: DeclBackend,
    reflect: ReflectBackend,
    /// id -> descriptor, per backend (the same id may resolve differently)
    decl_parse: FrozenMap<String, Box<Arc<TypeDescriptor>>>,
    reflect_parse: FrozenMap<String, Box<Arc<TypeDescriptor>>>,
    /// descriptor -> rendered id
    print_memo: Mutex<HashMap<(TypeDescriptor, bool), String>>,
    /// promoted member sets, keyed by backend tag + wrapped root id
    member_memo: FrozenMap<String, Box<MemberSet>>,
}

/// A shared type universe: both backends plus the caches that make repeated
/// printing, parsing and member resolution cheap. Cloning is a handle copy;
/// all clones see the same caches.
#[derive(Clone)]
pub struct Universe {
    inner: Arc<UniverseInner>,
}

lazy_static! {
    static ref GLOBAL_LOADER: Arc<MapLoader> = Arc::new(MapLoader::new());
    static ref GLOBAL: Universe = Universe::new(GLOBAL_LOADER.clone());
}

impl Universe {
    pub fn new(loader: Arc<dyn PackageLoader>) -> Self {
        Universe {
            inner: Arc::new(UniverseInner {
                decl: DeclBackend::new(loader),
                reflect: ReflectBackend::new(),
                decl_parse: FrozenMap::new(),
                reflect_parse: FrozenMap::new(),
                print_memo: Mutex::new(HashMap::new()),
                member_memo: FrozenMap::new(),
            }),
        }
    }

    /// The process-wide universe, fed by [Universe::global_loader].
    pub fn global() -> Universe {
        GLOBAL.clone()
    }

    /// The registration map behind the process-wide universe.
    pub fn global_loader() -> Arc<MapLoader> {
        GLOBAL_LOADER.clone()
    }

    pub fn decl_backend(&self) -> &DeclBackend {
        &self.inner.decl
    }

    pub fn reflect_backend(&self) -> &ReflectBackend {
        &self.inner.reflect
    }

    pub(crate) fn source(&self, kind: SourceKind) -> &dyn TypeSource {
        match kind {
            SourceKind::Decl => &self.inner.decl,
            SourceKind::Reflect => &self.inner.reflect,
        }
    }

    /// Parses a canonical ID against one backend. Unresolvable ids come back
    /// as the invalid type.
    pub fn parse_id(&self, kind: SourceKind, id: &str) -> Type {
        let desc = self.parse_descriptor(kind, id);
        Type::over(self.clone(), kind, desc)
    }

    /// A backend-neutral basic type.
    pub fn basic(&self, basic: Basic) -> Type {
        self.from_descriptor(SourceKind::Decl, TypeDescriptor::basic(basic))
    }

    pub fn from_descriptor(&self, kind: SourceKind, desc: TypeDescriptor) -> Type {
        Type::over(self.clone(), kind, Arc::new(desc))
    }

    /// Shorthand for [Universe::named_type] against the compiled-metadata
    /// backend.
    pub fn decl_type(&self, pkg_path: &str, name: &str) -> Type {
        self.named_type(SourceKind::Decl, pkg_path, name)
    }

    /// Shorthand for [Universe::named_type] against the runtime backend.
    pub fn reflect_type(&self, pkg_path: &str, name: &str) -> Type {
        self.named_type(SourceKind::Reflect, pkg_path, name)
    }

    /// The declared type at (package path, name) as one backend knows it, or
    /// the invalid type if the backend does not.
    pub fn named_type(&self, kind: SourceKind, pkg_path: &str, name: &str) -> Type {
        match self.source(kind).lookup(pkg_path, name) {
            Some(decl) => self.from_descriptor(kind, decl.to_ref()),
            None => {
                debug!("no type {}.{} in the {:?} backend", pkg_path, name, kind);
                self.from_descriptor(kind, TypeDescriptor::Invalid)
            }
        }
    }

    pub(crate) fn parse_descriptor(&self, kind: SourceKind, id: &str) -> Arc<TypeDescriptor> {
        let memo = match kind {
            SourceKind::Decl => &self.inner.decl_parse,
            SourceKind::Reflect => &self.inner.reflect_parse,
        };
        if let Some(desc) = memo.get(id) {
            return desc.clone();
        }
        let desc = Arc::new(id_to_type(id, self.source(kind)));
        // Unresolved ids are not memoized; they may resolve after more
        // packages load or declarations register
        if desc.is_invalid() {
            return desc;
        }
        memo.insert(id.to_owned(), Box::new(desc)).clone()
    }

    pub(crate) fn print_descriptor(&self, desc: &TypeDescriptor, wrap: bool) -> String {
        let key = (desc.clone(), wrap);
        let mut memo = self.inner.print_memo.lock();
        if let Some(id) = memo.get(&key) {
            return id.clone();
        }
        let id = type_to_id(desc, wrap);
        memo.insert(key, id.clone());
        id
    }

    pub(crate) fn members(&self, kind: SourceKind, root: &TypeDescriptor) -> &MemberSet {
        let tag = match kind {
            SourceKind::Decl => 'd',
            SourceKind::Reflect => 'r',
        };
        let key = format!("{}:{}", tag, self.print_descriptor(root, true));
        if let Some(set) = self.inner.member_memo.get(&key) {
            return set;
        }
        let set = member_set(root, self.source(kind));
        self.inner.member_memo.insert(key, Box::new(set))
    }

    pub(crate) fn lookup(&self, kind: SourceKind, pkg_path: &str, name: &str) -> Option<Arc<TypeDecl>> {
        self.source(kind).lookup(pkg_path, name)
    }
}

impl std::fmt::Debug for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Universe").finish_non_exhaustive()
    }
}
