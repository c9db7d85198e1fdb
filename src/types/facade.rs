use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use smallvec::{smallvec, SmallVec};
use smol_str::SmolStr;

use crate::types::instantiate::resolve_underlying;
use crate::types::promote::flatten_interface;
use crate::types::{
    Basic, FieldDescriptor, FunctionSignature, Kind, MethodDescriptor, TypeDescriptor,
};
use crate::universe::{SourceKind, Universe};

/// A type as seen through one backend of one universe: a descriptor plus
/// everything needed to resolve the names inside it. Cheap to clone.
///
/// Accessors that depend on the shape (element types, fields, methods) see
/// through named types to their underlying shape, so a declared `type Handles
/// []int` answers slice questions directly. Accessors that do not apply to
/// the shape return `None`, zero, or `false`; they never abort.
#[derive(Debug, Clone)]
pub struct Type {
    universe: Universe,
    source: SourceKind,
    desc: Arc<TypeDescriptor>,
}

/// One field as the facade reports it: either a direct field or a promoted
/// one, with the index chain that reaches it from the root.
#[derive(Debug, Clone)]
pub struct StructField {
    pub name: SmolStr,
    pub type_: Type,
    pub tag: SmolStr,
    pub anonymous: bool,
    pub pkg_path: SmolStr,
    pub index: SmallVec<[u32; 4]>,
}

/// One method of a type's method set. `type_` is the receiver-less func
/// type; `recv` is the type the method was resolved through.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: SmolStr,
    pub pkg_path: SmolStr,
    pub type_: Type,
    pub recv: Type,
    pub pointer_recv: bool,
}

impl Type {
    pub(crate) fn over(universe: Universe, source: SourceKind, desc: Arc<TypeDescriptor>) -> Type {
        Type {
            universe,
            source,
            desc,
        }
    }

    fn derived(&self, desc: TypeDescriptor) -> Type {
        Type::over(self.universe.clone(), self.source, Arc::new(desc))
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.desc
    }

    pub fn is_valid(&self) -> bool {
        !self.desc.is_invalid()
    }

    /// The canonical ID. With `wrap` set, package paths go through the path
    /// codec so the result reparses as a single token stream.
    pub fn id(&self, wrap: bool) -> String {
        self.universe.print_descriptor(&self.desc, wrap)
    }

    /// The underlying shape: the descriptor with named references chased to
    /// their structural form. Alias cycles and free parameters reduce to the
    /// invalid sentinel.
    fn shape(&self) -> TypeDescriptor {
        let mut desc = (*self.desc).clone();
        let mut visited = HashSet::new();
        while let TypeDescriptor::Named(nref) = &desc {
            if !visited.insert((nref.pkg.path.clone(), nref.name.clone())) {
                return TypeDescriptor::Invalid;
            }
            desc = resolve_underlying(nref, self.universe.source(self.source));
        }
        desc
    }

    pub fn kind(&self) -> Kind {
        match self.shape() {
            TypeDescriptor::Invalid => Kind::Invalid,
            TypeDescriptor::Basic(basic) => basic.kind(),
            TypeDescriptor::Array { .. } => Kind::Array,
            TypeDescriptor::Slice { .. } => Kind::Slice,
            TypeDescriptor::Map { .. } => Kind::Map,
            TypeDescriptor::Chan { .. } => Kind::Chan,
            TypeDescriptor::Pointer { .. } => Kind::Pointer,
            TypeDescriptor::Func(_) => Kind::Func,
            TypeDescriptor::Struct { .. } => Kind::Struct,
            TypeDescriptor::Interface { .. } => Kind::Interface,
            // shape() chased these away
            TypeDescriptor::Named(_) => Kind::Invalid,
            TypeDescriptor::Param { .. } => Kind::Invalid,
        }
    }

    /// The declaring package path, for named types. Empty otherwise.
    pub fn pkg_path(&self) -> SmolStr {
        match &*self.desc {
            TypeDescriptor::Named(nref) => nref.pkg.path.clone(),
            _ => SmolStr::default(),
        }
    }

    /// The declared or predeclared name. Empty for unnamed composites.
    pub fn name(&self) -> SmolStr {
        match &*self.desc {
            TypeDescriptor::Named(nref) => nref.name.clone(),
            TypeDescriptor::Basic(basic) => SmolStr::new_inline(basic.name()),
            _ => SmolStr::default(),
        }
    }

    /// The element type: of an array, slice, channel or pointer, or a map's
    /// value type.
    pub fn elem(&self) -> Option<Type> {
        match self.shape() {
            TypeDescriptor::Array { elem, .. }
            | TypeDescriptor::Slice { elem }
            | TypeDescriptor::Chan { elem, .. }
            | TypeDescriptor::Pointer { elem } => Some(self.derived(*elem)),
            TypeDescriptor::Map { value, .. } => Some(self.derived(*value)),
            _ => None,
        }
    }

    /// A map's key type.
    pub fn key(&self) -> Option<Type> {
        match self.shape() {
            TypeDescriptor::Map { key, .. } => Some(self.derived(*key)),
            _ => None,
        }
    }

    /// An array's length.
    pub fn len(&self) -> Option<u64> {
        match self.shape() {
            TypeDescriptor::Array { len, .. } => Some(len),
            _ => None,
        }
    }

    fn struct_fields(&self) -> Vec<FieldDescriptor> {
        match self.shape() {
            TypeDescriptor::Struct { fields } => fields,
            _ => Vec::new(),
        }
    }

    /// The number of direct fields, for struct shapes.
    pub fn num_field(&self) -> usize {
        self.struct_fields().len()
    }

    /// The i-th direct field, in declaration order.
    pub fn field(&self, i: usize) -> Option<StructField> {
        let field = self.struct_fields().into_iter().nth(i)?;
        Some(StructField {
            name: field.name,
            type_: self.derived(field.type_),
            tag: field.tag,
            anonymous: field.anonymous,
            pkg_path: field.pkg_path,
            index: smallvec![i as u32],
        })
    }

    /// A field by name, direct or promoted. Names shadowed or ambiguous in
    /// the embedding graph are absent.
    pub fn field_by_name(&self, name: &str) -> Option<StructField> {
        let members = self.universe.members(self.source, &self.desc);
        let entry = members.field(name)?;
        Some(StructField {
            name: entry.field.name.clone(),
            type_: self.derived(entry.field.type_.clone()),
            tag: entry.field.tag.clone(),
            anonymous: entry.field.anonymous,
            pkg_path: entry.field.pkg_path.clone(),
            index: entry.index.clone(),
        })
    }

    /// The unique field whose name satisfies `matches`, direct or promoted.
    /// Several matches at once mean no answer, same as an ambiguous name.
    pub fn field_by_name_func(&self, matches: impl Fn(&str) -> bool) -> Option<StructField> {
        let members = self.universe.members(self.source, &self.desc);
        let mut found = None;
        for entry in &members.fields {
            if !matches(&entry.field.name) {
                continue;
            }
            if found.is_some() {
                return None;
            }
            found = Some(entry);
        }
        let entry = found?;
        Some(StructField {
            name: entry.field.name.clone(),
            type_: self.derived(entry.field.type_.clone()),
            tag: entry.field.tag.clone(),
            anonymous: entry.field.anonymous,
            pkg_path: entry.field.pkg_path.clone(),
            index: entry.index.clone(),
        })
    }

    /// The method set: an interface's flattened methods, or every direct and
    /// promoted method of a concrete type. Sorted by name.
    fn method_descriptors(&self) -> Vec<MethodDescriptor> {
        let shape = self.shape();
        if matches!(shape, TypeDescriptor::Interface { .. }) {
            return flatten_interface(&self.desc, self.universe.source(self.source));
        }
        self.universe
            .members(self.source, &self.desc)
            .methods
            .iter()
            .map(|entry| entry.method.clone())
            .collect()
    }

    pub fn num_method(&self) -> usize {
        self.method_descriptors().len()
    }

    /// The i-th method, in name order.
    pub fn method(&self, i: usize) -> Option<Method> {
        let method = self.method_descriptors().into_iter().nth(i)?;
        Some(self.as_method(method))
    }

    pub fn method_by_name(&self, name: &str) -> Option<Method> {
        let method = self
            .method_descriptors()
            .into_iter()
            .find(|method| method.name == name)?;
        Some(self.as_method(method))
    }

    fn as_method(&self, method: MethodDescriptor) -> Method {
        Method {
            name: method.name,
            pkg_path: method.pkg_path,
            type_: self.derived(TypeDescriptor::func(method.sig)),
            recv: self.clone(),
            pointer_recv: method.pointer_recv,
        }
    }

    fn signature(&self) -> Option<FunctionSignature> {
        match self.shape() {
            TypeDescriptor::Func(sig) => Some(*sig),
            _ => None,
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.signature().map_or(false, |sig| sig.variadic)
    }

    pub fn num_in(&self) -> usize {
        self.signature().map_or(0, |sig| sig.params.len())
    }

    pub fn in_at(&self, i: usize) -> Option<Type> {
        let sig = self.signature()?;
        sig.params.into_iter().nth(i).map(|param| self.derived(param))
    }

    pub fn num_out(&self) -> usize {
        self.signature().map_or(0, |sig| sig.results.len())
    }

    pub fn out_at(&self, i: usize) -> Option<Type> {
        let sig = self.signature()?;
        sig.results
            .into_iter()
            .nth(i)
            .map(|result| self.derived(result))
    }

    /// Whether this type's method set covers `iface`, which must reduce to an
    /// interface. Types from the other backend cross over through their
    /// canonical ID, so a compiled declaration can be checked against an
    /// interface observed at runtime.
    pub fn implements(&self, iface: &Type) -> bool {
        let iface = if iface.source == self.source {
            iface.clone()
        } else {
            self.universe.parse_id(self.source, &iface.id(true))
        };
        if iface.kind() != Kind::Interface {
            return false;
        }
        let want = flatten_interface(&iface.desc, self.universe.source(self.source));
        if want.is_empty() {
            return true;
        }
        let have = self.method_descriptors();
        want.iter().all(|wanted| {
            have.iter()
                .any(|held| held.name == wanted.name && held.sig == wanted.sig)
        })
    }

    /// Go-flavored assignability, without the backend's full rule set:
    /// identical types, one-side-named types with identical underlying
    /// shapes, and interface satisfaction. Types from different backends are
    /// never assignable.
    pub fn assignable_to(&self, dest: &Type) -> bool {
        if self.source != dest.source {
            return false;
        }
        if !self.is_valid() || !dest.is_valid() {
            return false;
        }
        if self.desc == dest.desc {
            return true;
        }
        if dest.kind() == Kind::Interface {
            return self.implements(dest);
        }
        let self_named = matches!(&*self.desc, TypeDescriptor::Named(_));
        let dest_named = matches!(&*dest.desc, TypeDescriptor::Named(_));
        if self_named == dest_named {
            return false;
        }
        self.shape() == dest.shape() && !self.shape().is_invalid()
    }

    /// Assignability plus numeric conversions and the string/byte-slice and
    /// string/rune-slice pairs.
    pub fn convertible_to(&self, dest: &Type) -> bool {
        if self.assignable_to(dest) {
            return true;
        }
        if self.source != dest.source {
            return false;
        }
        let from = self.shape();
        let to = dest.shape();
        match (&from, &to) {
            (TypeDescriptor::Basic(from), TypeDescriptor::Basic(to)) => {
                from.is_numeric() && to.is_numeric()
                    || from == to
            }
            (TypeDescriptor::Basic(Basic::String), TypeDescriptor::Slice { elem })
            | (TypeDescriptor::Slice { elem }, TypeDescriptor::Basic(Basic::String)) => matches!(
                elem.as_ref(),
                TypeDescriptor::Basic(Basic::Uint8) | TypeDescriptor::Basic(Basic::Int32)
            ),
            _ => false,
        }
    }

    /// Whether values of this type support `==`.
    pub fn comparable(&self) -> bool {
        comparable_shape(self, &self.shape())
    }

    /// Binds generic arguments to an unbound named reference. Anything else,
    /// an arity mismatch, an invalid argument, or an argument from another
    /// backend yields the invalid type.
    pub fn instantiate(&self, args: &[Type]) -> Type {
        let nref = match &*self.desc {
            TypeDescriptor::Named(nref) if nref.args.is_empty() => nref,
            _ => return self.derived(TypeDescriptor::Invalid),
        };
        let decl = match self.universe.lookup(self.source, &nref.pkg.path, &nref.name) {
            Some(decl) => decl,
            None => return self.derived(TypeDescriptor::Invalid),
        };
        if args.len() != decl.params.len() {
            return self.derived(TypeDescriptor::Invalid);
        }
        if args
            .iter()
            .any(|arg| arg.source != self.source || !arg.is_valid())
        {
            return self.derived(TypeDescriptor::Invalid);
        }
        let bound = args.iter().map(|arg| (*arg.desc).clone()).collect();
        self.derived(TypeDescriptor::named_generic(
            nref.pkg.clone(),
            nref.name.clone(),
            bound,
        ))
    }
}

fn comparable_shape(root: &Type, shape: &TypeDescriptor) -> bool {
    match shape {
        TypeDescriptor::Invalid => false,
        TypeDescriptor::Basic(_) => true,
        TypeDescriptor::Pointer { .. }
        | TypeDescriptor::Chan { .. }
        | TypeDescriptor::Interface { .. } => true,
        TypeDescriptor::Array { elem, .. } => root.derived((**elem).clone()).comparable(),
        TypeDescriptor::Struct { fields } => fields
            .iter()
            .all(|field| root.derived(field.type_.clone()).comparable()),
        TypeDescriptor::Slice { .. }
        | TypeDescriptor::Map { .. }
        | TypeDescriptor::Func(_) => false,
        TypeDescriptor::Named(_) | TypeDescriptor::Param { .. } => false,
    }
}

/// Structural equality of the descriptors; the observing backend does not
/// change what a type is.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.desc == other.desc
    }
}

impl Eq for Type {}

impl std::hash::Hash for Type {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.desc.hash(state);
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.universe.print_descriptor(&self.desc, false))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use test_log::test;

    use crate::types::{
        Basic, Constraint, FieldDescriptor, FunctionSignature, Kind, MethodDescriptor,
        PackageRef, TypeDecl, TypeDescriptor, TypeParamDecl,
    };
    use crate::universe::{MapLoader, SourceKind, Universe};

    fn demo() -> PackageRef {
        PackageRef::new("demo")
    }

    fn named(name: &str) -> TypeDescriptor {
        TypeDescriptor::named(demo(), name)
    }

    fn int() -> TypeDescriptor {
        TypeDescriptor::basic(Basic::Int)
    }

    fn string() -> TypeDescriptor {
        TypeDescriptor::basic(Basic::String)
    }

    fn decls() -> Vec<TypeDecl> {
        vec![
            // type Handles []*Item
            TypeDecl::new(
                demo(),
                "Handles",
                TypeDescriptor::slice_of(TypeDescriptor::pointer_to(named("Item"))),
            ),
            // type Item struct { ID int; Name string "json:\"name\"" }
            // func (Item) Tag() string; func (*Item) Bump()
            TypeDecl::new(
                demo(),
                "Item",
                TypeDescriptor::Struct {
                    fields: vec![
                        FieldDescriptor::new("ID", int()),
                        FieldDescriptor::new("Name", string()).with_tag(r#"json:"name""#),
                    ],
                },
            )
            .with_methods(vec![
                MethodDescriptor::new("Tag", FunctionSignature::new(vec![], vec![string()])),
                MethodDescriptor::new("Bump", FunctionSignature::new(vec![], vec![]))
                    .with_pointer_recv(),
            ]),
            // type Entry struct { Item; Count int }
            TypeDecl::new(
                demo(),
                "Entry",
                TypeDescriptor::Struct {
                    fields: vec![
                        FieldDescriptor::embedded(named("Item")),
                        FieldDescriptor::new("Count", int()),
                    ],
                },
            ),
            // type Tagger interface { Tag() string }
            TypeDecl::new(
                demo(),
                "Tagger",
                TypeDescriptor::Interface {
                    embeds: vec![],
                    methods: vec![MethodDescriptor::new(
                        "Tag",
                        FunctionSignature::new(vec![], vec![string()]),
                    )],
                },
            ),
            // type Box[T any] struct { Value T }
            TypeDecl::new(
                demo(),
                "Box",
                TypeDescriptor::Struct {
                    fields: vec![FieldDescriptor::new("Value", TypeDescriptor::param(0, "T"))],
                },
            )
            .with_params(vec![TypeParamDecl::new("T", Constraint::default())]),
            // type Indirect Item
            TypeDecl::new(demo(), "Indirect", named("Item")),
        ]
    }

    fn universe() -> Universe {
        let loader = Arc::new(MapLoader::new());
        for decl in decls() {
            loader.add_decl(decl);
        }
        Universe::new(loader)
    }

    #[test]
    pub fn test_named_types_answer_shape_questions() {
        let u = universe();
        let handles = u.decl_type("demo", "Handles");
        assert_eq!(handles.kind(), Kind::Slice);
        assert_eq!(handles.name(), "Handles");
        assert_eq!(handles.pkg_path(), "demo");
        // The name prints, not the underlying shape; the element is its own
        // type
        assert_eq!(handles.to_string(), "demo.Handles");
        let elem = handles.elem().unwrap();
        assert_eq!(elem.kind(), Kind::Pointer);
        assert_eq!(elem.to_string(), "*demo.Item");
        assert_eq!(handles.len(), None);
    }

    #[test]
    pub fn test_struct_accessors() {
        let u = universe();
        let item = u.named_type(SourceKind::Decl, "demo", "Item");
        assert_eq!(item.kind(), Kind::Struct);
        assert_eq!(item.num_field(), 2);
        let name = item.field(1).unwrap();
        assert_eq!(name.name, "Name");
        assert_eq!(name.tag, r#"json:"name""#);
        assert_eq!(name.type_.kind(), Kind::String);
        assert!(item.field(2).is_none());

        let by_name = item.field_by_name("ID").unwrap();
        assert_eq!(by_name.index.as_slice(), [0]);
        let fuzzy = item
            .field_by_name_func(|name| name.eq_ignore_ascii_case("id"))
            .unwrap();
        assert_eq!(fuzzy.name, "ID");
        // Two matches: no answer
        assert!(item.field_by_name_func(|name| !name.is_empty()).is_none());
    }

    #[test]
    pub fn test_accessors_agree_across_an_alias_chain() {
        let u = universe();
        let indirect = u.decl_type("demo", "Indirect");
        assert_eq!(indirect.kind(), Kind::Struct);
        assert_eq!(indirect.num_field(), 2);
        let first = indirect.field(0).unwrap();
        let by_name = indirect.field_by_name(&first.name).unwrap();
        assert_eq!(by_name.name, first.name);
        assert_eq!(by_name.index.as_slice(), [0]);
        // Methods stay with Item, not with a type declared over it
        assert!(indirect.method_by_name("Tag").is_none());
    }

    #[test]
    pub fn test_promoted_members_through_the_facade() {
        let u = universe();
        let entry = u.named_type(SourceKind::Decl, "demo", "Entry");
        let id = entry.field_by_name("ID").unwrap();
        assert_eq!(id.index.as_slice(), [0, 0]);
        assert!(entry.method_by_name("Tag").is_some());
        // Pointer receiver needs the pointer facade
        assert!(entry.method_by_name("Bump").is_none());
        let entry_ptr = u.from_descriptor(SourceKind::Decl, TypeDescriptor::pointer_to(named("Entry")));
        assert!(entry_ptr.method_by_name("Bump").is_some());
    }

    #[test]
    pub fn test_func_accessors() {
        let u = universe();
        let f = u.parse_id(SourceKind::Decl, "func(string, ...int) (bool, invalid)");
        assert_eq!(f.kind(), Kind::Func);
        assert!(f.is_variadic());
        assert_eq!(f.num_in(), 2);
        assert_eq!(f.in_at(1).unwrap().kind(), Kind::Slice);
        assert_eq!(f.num_out(), 2);
        assert_eq!(f.out_at(0).unwrap().kind(), Kind::Bool);
        assert!(!f.out_at(1).unwrap().is_valid());
        assert!(f.in_at(2).is_none());
    }

    #[test]
    pub fn test_implements_and_assignability() {
        let u = universe();
        let item = u.named_type(SourceKind::Decl, "demo", "Item");
        let entry = u.named_type(SourceKind::Decl, "demo", "Entry");
        let tagger = u.named_type(SourceKind::Decl, "demo", "Tagger");
        assert!(item.implements(&tagger));
        assert!(entry.implements(&tagger)); // promoted method counts
        assert!(!u.basic(Basic::Int).implements(&tagger));
        assert!(item.assignable_to(&tagger));

        let handles = u.decl_type("demo", "Handles");
        let raw = u.parse_id(SourceKind::Decl, "[]*demo.Item");
        assert!(raw.assignable_to(&handles));
        assert!(handles.assignable_to(&raw));
        assert!(!handles.assignable_to(&u.parse_id(SourceKind::Decl, "[]string")));

        assert!(u.basic(Basic::Int).convertible_to(&u.basic(Basic::Float64)));
        assert!(!u.basic(Basic::Bool).convertible_to(&u.basic(Basic::Int)));
        let bytes = u.parse_id(SourceKind::Decl, "[]uint8");
        assert!(u.basic(Basic::String).convertible_to(&bytes));
    }

    #[test]
    pub fn test_cross_backend_checks() {
        let u = universe();
        u.reflect_backend().register(TypeDecl::new(
            demo(),
            "Tagger",
            TypeDescriptor::Interface {
                embeds: vec![],
                methods: vec![MethodDescriptor::new(
                    "Tag",
                    FunctionSignature::new(vec![], vec![string()]),
                )],
            },
        ));
        let item = u.named_type(SourceKind::Decl, "demo", "Item");
        let runtime_tagger = u.named_type(SourceKind::Reflect, "demo", "Tagger");
        // Interface satisfaction crosses backends through the canonical ID
        assert!(item.implements(&runtime_tagger));
        // Assignability does not
        assert!(!item.assignable_to(&runtime_tagger));
    }

    #[test]
    pub fn test_colliding_promoted_methods_and_a_direct_field() {
        let loader = Arc::new(MapLoader::new());
        let sig = FunctionSignature::new(vec![], vec![string()]);
        for side in ["Left", "Right"] {
            loader.add_decl(
                TypeDecl::new(
                    demo(),
                    side,
                    TypeDescriptor::Struct { fields: vec![] },
                )
                .with_methods(vec![MethodDescriptor::new("Name", sig.clone())]),
            );
        }
        loader.add_decl(TypeDecl::new(
            demo(),
            "Pair",
            TypeDescriptor::Struct {
                fields: vec![
                    FieldDescriptor::embedded(named("Left")),
                    FieldDescriptor::embedded(named("Right")),
                ],
            },
        ));
        loader.add_decl(TypeDecl::new(
            demo(),
            "NamedPair",
            TypeDescriptor::Struct {
                fields: vec![
                    FieldDescriptor::embedded(named("Left")),
                    FieldDescriptor::embedded(named("Right")),
                    FieldDescriptor::new("Name", string()),
                ],
            },
        ));
        let u = Universe::new(loader);

        // Equal-depth collision: the name is gone entirely
        let pair = u.decl_type("demo", "Pair");
        assert!(pair.method_by_name("Name").is_none());
        assert!(pair.field_by_name("Name").is_none());

        // A direct field wins over both inherited methods
        let named_pair = u.decl_type("demo", "NamedPair");
        assert!(named_pair.method_by_name("Name").is_none());
        let field = named_pair.field_by_name("Name").unwrap();
        assert_eq!(field.index.as_slice(), [2]);
    }

    #[test]
    pub fn test_neutral_accessors_match_across_backends() {
        let u = universe();
        u.reflect_backend().register(
            decls()
                .into_iter()
                .find(|decl| decl.name == "Item")
                .unwrap(),
        );
        for kind in [SourceKind::Decl, SourceKind::Reflect] {
            let item = u.named_type(kind, "demo", "Item");
            assert_eq!(item.len(), None);
            assert_eq!(item.key(), None);
            assert!(item.elem().is_none());
            assert_eq!(item.num_in(), 0);
            let not_a_struct = u.parse_id(kind, "chan int");
            assert_eq!(not_a_struct.num_field(), 0);
            assert!(not_a_struct.field(0).is_none());
            assert!(not_a_struct.field_by_name("ID").is_none());
            assert_eq!(not_a_struct.num_method(), 0);
        }
    }

    #[test]
    pub fn test_comparability() {
        let u = universe();
        assert!(u.basic(Basic::String).comparable());
        assert!(u.parse_id(SourceKind::Decl, "[4]int").comparable());
        assert!(u.named_type(SourceKind::Decl, "demo", "Item").comparable());
        assert!(!u.named_type(SourceKind::Decl, "demo", "Handles").comparable());
        assert!(!u.parse_id(SourceKind::Decl, "map[string]int").comparable());
        assert!(!u.parse_id(SourceKind::Decl, "[2][]int").comparable());
        assert!(!u.parse_id(SourceKind::Decl, "invalid").comparable());
    }

    #[test]
    pub fn test_generic_instantiation_via_the_facade() {
        let u = universe();
        let template = u.named_type(SourceKind::Decl, "demo", "Box");
        let bound = template.instantiate(&[u.basic(Basic::String)]);
        assert!(bound.is_valid());
        assert_eq!(bound.to_string(), "demo.Box[string]");
        assert_eq!(bound.field_by_name("Value").unwrap().type_.kind(), Kind::String);
        // Instantiating twice from the same template is the same type
        assert_eq!(template.instantiate(&[u.basic(Basic::String)]), bound);
        // Arity mismatch at the public surface is just an invalid type
        assert!(!template.instantiate(&[]).is_valid());
        assert!(!template
            .instantiate(&[u.basic(Basic::Int), u.basic(Basic::Int)])
            .is_valid());
    }
}
