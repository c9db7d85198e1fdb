use smol_str::SmolStr;

use crate::types::Basic;

/// A package identity: the full import path plus the short name used in
/// qualified member references (the last path segment).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    pub path: SmolStr,
    pub name: SmolStr,
}

/// Channel direction. `Both` prints `chan `, `Send` prints `chan<- `,
/// `Recv` prints `<-chan `.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A structural type tree. Built on demand from exactly one backend, never
/// mutated after construction; instantiation always produces a new tree.
///
/// All inner descriptors are boxed to allow recursive definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Sentinel for references that failed to resolve (unknown package,
    /// unknown member, generic arity mismatch). Returned, never raised;
    /// callers test for it explicitly.
    #[default]
    Invalid,
    Basic(Basic),
    Array {
        len: u64,
        elem: Box<TypeDescriptor>,
    },
    Slice {
        elem: Box<TypeDescriptor>,
    },
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeDescriptor>,
    },
    Pointer {
        elem: Box<TypeDescriptor>,
    },
    /// Function type. Boxed because signatures are large
    Func(Box<FunctionSignature>),
    Struct {
        fields: Vec<FieldDescriptor>,
    },
    Interface {
        embeds: Vec<TypeDescriptor>,
        methods: Vec<MethodDescriptor>,
    },
    /// Reference to a declared type, with its bound generic arguments
    /// (empty = unbound template or non-generic declaration)
    Named(Box<NamedTypeRef>),
    /// A free type parameter of the enclosing generic declaration
    Param {
        index: usize,
        name: SmolStr,
    },
}

/// A declared type reference and its bound generic args
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedTypeRef {
    pub pkg: PackageRef,
    pub name: SmolStr,
    // Remember: these don't need to be boxed because they are in a vec
    pub args: Vec<TypeDescriptor>,
}

/// One struct field. `anonymous` marks an embedded field; its name is the
/// embedded type's base name, which still participates in shadowing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: SmolStr,
    pub type_: TypeDescriptor,
    /// Raw tag content, without surrounding quotes. Empty = no tag
    pub tag: SmolStr,
    pub anonymous: bool,
    /// Declaring package, for unexported-name visibility
    pub pkg_path: SmolStr,
}

/// One declared or interface method. The receiver is not part of the
/// signature; promotion threads the outer type in as the effective receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub name: SmolStr,
    /// Declaring package, for unexported-name visibility
    pub pkg_path: SmolStr,
    pub sig: FunctionSignature,
    /// Mutable (pointer-style) receiver. Such methods promote only along an
    /// addressable embedding chain
    pub pointer_recv: bool,
}

/// Ordered parameter and result types. A variadic signature stores its last
/// parameter as the slice type; the printer renders it `...elem`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FunctionSignature {
    pub params: Vec<TypeDescriptor>,
    pub results: Vec<TypeDescriptor>,
    pub variadic: bool,
}

/// A generic parameter of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParamDecl {
    pub name: SmolStr,
    pub constraint: Constraint,
}

/// What an argument bound to a parameter must satisfy. When a generic type is
/// inspected without arguments, each parameter defaults to the constraint's
/// first embedded member, recursively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub embeds: Vec<TypeDescriptor>,
    pub methods: Vec<MethodDescriptor>,
}

/// A type declaration as one backend knows it: the generic template plus the
/// method set declared directly on the named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub pkg: PackageRef,
    pub name: SmolStr,
    pub params: Vec<TypeParamDecl>,
    pub underlying: TypeDescriptor,
    pub methods: Vec<MethodDescriptor>,
}

/// Whether a member name is visible outside its declaring package
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_uppercase())
}

impl PackageRef {
    pub fn new(path: impl Into<SmolStr>) -> Self {
        let path = path.into();
        let name = SmolStr::new(path.rsplit('/').next().unwrap_or(""));
        PackageRef { path, name }
    }

    /// The empty package, for builtins and unqualified declarations
    pub fn local() -> Self {
        PackageRef {
            path: SmolStr::default(),
            name: SmolStr::default(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.path.is_empty()
    }
}

impl TypeDescriptor {
    pub fn basic(basic: Basic) -> Self {
        TypeDescriptor::Basic(basic)
    }

    pub fn pointer_to(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Pointer { elem: Box::new(elem) }
    }

    pub fn slice_of(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Slice { elem: Box::new(elem) }
    }

    pub fn array_of(len: u64, elem: TypeDescriptor) -> Self {
        TypeDescriptor::Array { len, elem: Box::new(elem) }
    }

    pub fn map_of(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan_of(dir: ChanDir, elem: TypeDescriptor) -> Self {
        TypeDescriptor::Chan { dir, elem: Box::new(elem) }
    }

    pub fn func(sig: FunctionSignature) -> Self {
        TypeDescriptor::Func(Box::new(sig))
    }

    pub fn empty_interface() -> Self {
        TypeDescriptor::Interface {
            embeds: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn named(pkg: PackageRef, name: impl Into<SmolStr>) -> Self {
        Self::named_generic(pkg, name, Vec::new())
    }

    pub fn named_generic(
        pkg: PackageRef,
        name: impl Into<SmolStr>,
        args: Vec<TypeDescriptor>,
    ) -> Self {
        TypeDescriptor::Named(Box::new(NamedTypeRef {
            pkg,
            name: name.into(),
            args,
        }))
    }

    pub fn param(index: usize, name: impl Into<SmolStr>) -> Self {
        TypeDescriptor::Param {
            index,
            name: name.into(),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, TypeDescriptor::Invalid)
    }

    /// The named ref if this is a named type, possibly behind one pointer
    pub fn base_named(&self) -> Option<&NamedTypeRef> {
        match self {
            TypeDescriptor::Named(nref) => Some(nref),
            TypeDescriptor::Pointer { elem } => match elem.as_ref() {
                TypeDescriptor::Named(nref) => Some(nref),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<SmolStr>, type_: TypeDescriptor) -> Self {
        FieldDescriptor {
            name: name.into(),
            type_,
            tag: SmolStr::default(),
            anonymous: false,
            pkg_path: SmolStr::default(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<SmolStr>) -> Self {
        self.tag = tag.into();
        self
    }

    /// An embedded field; the field name is the embedded type's base name.
    /// *Panics* if `type_` is not a named type or pointer to one
    pub fn embedded(type_: TypeDescriptor) -> Self {
        let name = type_
            .base_named()
            .map(|nref| nref.name.clone())
            .unwrap_or_else(|| panic!("embedded field must be a named type, got {:?}", type_));
        FieldDescriptor {
            name,
            type_,
            tag: SmolStr::default(),
            anonymous: true,
            pkg_path: SmolStr::default(),
        }
    }

    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

impl MethodDescriptor {
    pub fn new(name: impl Into<SmolStr>, sig: FunctionSignature) -> Self {
        MethodDescriptor {
            name: name.into(),
            pkg_path: SmolStr::default(),
            sig,
            pointer_recv: false,
        }
    }

    pub fn with_pointer_recv(mut self) -> Self {
        self.pointer_recv = true;
        self
    }

    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

impl FunctionSignature {
    pub fn new(params: Vec<TypeDescriptor>, results: Vec<TypeDescriptor>) -> Self {
        FunctionSignature {
            params,
            results,
            variadic: false,
        }
    }

    pub fn variadic(params: Vec<TypeDescriptor>, results: Vec<TypeDescriptor>) -> Self {
        debug_assert!(
            matches!(params.last(), Some(TypeDescriptor::Slice { .. })),
            "variadic signature must end in a slice parameter"
        );
        FunctionSignature {
            params,
            results,
            variadic: true,
        }
    }
}

impl TypeParamDecl {
    pub fn new(name: impl Into<SmolStr>, constraint: Constraint) -> Self {
        TypeParamDecl {
            name: name.into(),
            constraint,
        }
    }

    /// A parameter constrained only by the empty interface
    pub fn any(name: impl Into<SmolStr>) -> Self {
        Self::new(name, Constraint::default())
    }
}

impl Constraint {
    pub fn embedding(embeds: Vec<TypeDescriptor>) -> Self {
        Constraint {
            embeds,
            methods: Vec::new(),
        }
    }
}

impl TypeDecl {
    pub fn new(pkg: PackageRef, name: impl Into<SmolStr>, underlying: TypeDescriptor) -> Self {
        TypeDecl {
            pkg,
            name: name.into(),
            params: Vec::new(),
            underlying,
            methods: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<TypeParamDecl>) -> Self {
        self.params = params;
        self
    }

    pub fn with_methods(mut self, methods: Vec<MethodDescriptor>) -> Self {
        self.methods = methods;
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.params.is_empty()
    }

    /// The unbound reference to this declaration
    pub fn to_ref(&self) -> TypeDescriptor {
        TypeDescriptor::named(self.pkg.clone(), self.name.clone())
    }
}
