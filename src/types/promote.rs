use std::collections::{HashMap, HashSet};

use either::Either;
use join_lazy_fmt::Join;
use log::{debug, trace};
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::types::instantiate::{resolve_methods, resolve_underlying};
use crate::types::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use crate::universe::TypeSource;

/// A field reachable from the root, with the embedding chain that reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotedField {
    pub field: FieldDescriptor,
    /// Embedding steps between the root struct and the declaring struct
    pub depth: usize,
    /// Index path from the root struct, one field index per step
    pub index: SmallVec<[u32; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotedMethod {
    pub method: MethodDescriptor,
    pub depth: usize,
}

/// Every member reachable from one root type. Shadowing is already applied:
/// a name claimed at a shallower depth hides deeper ones, and a name claimed
/// by two members at the same depth is absent outright. Fields and methods
/// are each sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSet {
    pub fields: Vec<PromotedField>,
    pub methods: Vec<PromotedMethod>,
}

impl MemberSet {
    pub fn field(&self, name: &str) -> Option<&PromotedField> {
        self.fields.iter().find(|entry| entry.field.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&PromotedMethod> {
        self.methods.iter().find(|entry| entry.method.name == name)
    }
}

/// One breadth-first layer of the embedding graph.
struct Branch {
    type_: TypeDescriptor,
    index: SmallVec<[u32; 4]>,
    /// Whether the chain to this node can take addresses, which is what
    /// pointer-receiver methods need to promote
    addressable: bool,
    /// Named types already entered along this chain, for cycle safety
    visited: HashSet<(SmolStr, SmolStr)>,
}

type Candidates = HashMap<SmolStr, Vec<Either<PromotedField, PromotedMethod>>>;

/// Resolves the full member set of `root`, breadth-first over embedded
/// fields. Direct members (depth 0) enumerate regardless of visibility;
/// promotion only carries exported names.
pub fn member_set(root: &TypeDescriptor, source: &dyn TypeSource) -> MemberSet {
    let mut set = MemberSet::default();
    let mut taken: HashSet<SmolStr> = HashSet::new();
    let mut dead: HashSet<SmolStr> = HashSet::new();

    let mut frontier = vec![Branch {
        type_: root.clone(),
        index: SmallVec::new(),
        addressable: matches!(root, TypeDescriptor::Pointer { .. }),
        visited: HashSet::new(),
    }];
    let mut depth = 0;
    while !frontier.is_empty() {
        let mut candidates = Candidates::new();
        let mut next = Vec::new();
        for branch in frontier {
            expand(branch, depth, source, &mut candidates, &mut next);
        }
        for (name, mut found) in candidates {
            // Claimed shallower, or already known ambiguous
            if taken.contains(&name) || dead.contains(&name) {
                continue;
            }
            if found.len() > 1 {
                debug!("dropping ambiguous member {:?} at depth {}", name, depth);
                dead.insert(name);
                continue;
            }
            match found.pop().unwrap() {
                Either::Left(field) => set.fields.push(field),
                Either::Right(method) => set.methods.push(method),
            }
            taken.insert(name);
        }
        frontier = next;
        depth += 1;
    }
    set.fields.sort_by(|a, b| a.field.name.cmp(&b.field.name));
    set.methods.sort_by(|a, b| a.method.name.cmp(&b.method.name));
    trace!(
        "member set: fields [{}], methods [{}]",
        ", ".join(set.fields.iter().map(|entry| entry.field.name.as_str())),
        ", ".join(set.methods.iter().map(|entry| entry.method.name.as_str()))
    );
    set
}

fn expand(
    branch: Branch,
    depth: usize,
    source: &dyn TypeSource,
    candidates: &mut Candidates,
    next: &mut Vec<Branch>,
) {
    let mut visited = branch.visited;
    let (ty, addressable, stripped_ptr) = match branch.type_ {
        TypeDescriptor::Pointer { elem } => (*elem, true, true),
        other => (other, branch.addressable, false),
    };
    let underlying = match &ty {
        TypeDescriptor::Named(nref) => {
            if !visited.insert((nref.pkg.path.clone(), nref.name.clone())) {
                return; // embedding cycle
            }
            for method in resolve_methods(nref, source) {
                if method.pointer_recv && !addressable {
                    continue;
                }
                if depth > 0 && !method.is_exported() {
                    continue;
                }
                candidates
                    .entry(method.name.clone())
                    .or_default()
                    .push(Either::Right(PromotedMethod { method, depth }));
            }
            resolve_underlying(nref, source)
        }
        _ => ty.clone(),
    };
    // A declaration's underlying may itself be a named reference; chase the
    // chain to a structural type, methods stay with their declaring type
    let underlying = match chase_named(underlying, source, &mut visited) {
        Some(underlying) => underlying,
        None => return, // underlying cycle
    };
    match underlying {
        TypeDescriptor::Struct { fields } => {
            for (i, field) in fields.into_iter().enumerate() {
                let mut index = branch.index.clone();
                index.push(i as u32);
                if field.anonymous {
                    next.push(Branch {
                        type_: field.type_.clone(),
                        index: index.clone(),
                        addressable,
                        visited: visited.clone(),
                    });
                }
                if depth > 0 && !field.is_exported() {
                    continue;
                }
                candidates
                    .entry(field.name.clone())
                    .or_default()
                    .push(Either::Left(PromotedField {
                        field,
                        depth,
                        index,
                    }));
            }
        }
        TypeDescriptor::Interface { embeds, methods } => {
            // A pointer to an interface has no members of its own
            if stripped_ptr {
                return;
            }
            let mut flattened = interface_methods(&embeds, methods, source, &mut visited);
            let mut seen = HashSet::new();
            flattened.retain(|method| seen.insert(method.name.clone()));
            for method in flattened {
                if depth > 0 && !method.is_exported() {
                    continue;
                }
                candidates
                    .entry(method.name.clone())
                    .or_default()
                    .push(Either::Right(PromotedMethod { method, depth }));
            }
        }
        _ => {}
    }
}

/// Resolves `desc` down to a structural (non-named) type, or `None` if the
/// chain of underlying declarations cycles.
fn chase_named(
    mut desc: TypeDescriptor,
    source: &dyn TypeSource,
    visited: &mut HashSet<(SmolStr, SmolStr)>,
) -> Option<TypeDescriptor> {
    while let TypeDescriptor::Named(nref) = &desc {
        if !visited.insert((nref.pkg.path.clone(), nref.name.clone())) {
            return None;
        }
        desc = resolve_underlying(nref, source);
    }
    Some(desc)
}

fn interface_methods(
    embeds: &[TypeDescriptor],
    methods: Vec<MethodDescriptor>,
    source: &dyn TypeSource,
    visited: &mut HashSet<(SmolStr, SmolStr)>,
) -> Vec<MethodDescriptor> {
    let mut out = methods;
    for embed in embeds {
        match embed {
            TypeDescriptor::Named(nref) => {
                if !visited.insert((nref.pkg.path.clone(), nref.name.clone())) {
                    continue;
                }
                if let Some(TypeDescriptor::Interface { embeds, methods }) =
                    chase_named(resolve_underlying(nref, source), source, visited)
                {
                    out.extend(interface_methods(&embeds, methods, source, visited));
                }
            }
            TypeDescriptor::Interface { embeds, methods } => {
                out.extend(interface_methods(embeds, methods.clone(), source, visited));
            }
            // Constraint-style embeds (concrete types) carry no methods
            _ => {}
        }
    }
    out
}

/// The complete, flattened method set of an interface type (named or a
/// literal), deduplicated and sorted by name. Non-interfaces flatten to the
/// empty set.
pub fn flatten_interface(
    desc: &TypeDescriptor,
    source: &dyn TypeSource,
) -> Vec<MethodDescriptor> {
    let mut visited = HashSet::new();
    let mut out = match desc {
        TypeDescriptor::Named(nref) => {
            visited.insert((nref.pkg.path.clone(), nref.name.clone()));
            match chase_named(resolve_underlying(nref, source), source, &mut visited) {
                Some(TypeDescriptor::Interface { embeds, methods }) => {
                    interface_methods(&embeds, methods, source, &mut visited)
                }
                _ => Vec::new(),
            }
        }
        TypeDescriptor::Interface { embeds, methods } => {
            interface_methods(embeds, methods.clone(), source, &mut visited)
        }
        _ => Vec::new(),
    };
    let mut seen = HashSet::new();
    out.retain(|method| seen.insert(method.name.clone()));
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use test_log::test;

    use crate::types::promote::{flatten_interface, member_set};
    use crate::types::{
        Basic, FieldDescriptor, FunctionSignature, MethodDescriptor, PackageRef, TypeDecl,
        TypeDescriptor,
    };
    use crate::universe::{DeclBackend, MapLoader};

    fn int() -> TypeDescriptor {
        TypeDescriptor::basic(Basic::Int)
    }

    fn string() -> TypeDescriptor {
        TypeDescriptor::basic(Basic::String)
    }

    fn demo() -> PackageRef {
        PackageRef::new("demo")
    }

    fn named(name: &str) -> TypeDescriptor {
        TypeDescriptor::named(demo(), name)
    }

    fn backend() -> DeclBackend {
        let loader = Arc::new(MapLoader::new());
        // type Inner struct { ID int; Name string; hidden int }
        // func (Inner) Tag() string; func (*Inner) Bump()
        loader.add_decl(
            TypeDecl::new(
                demo(),
                "Inner",
                TypeDescriptor::Struct {
                    fields: vec![
                        FieldDescriptor::new("ID", int()),
                        FieldDescriptor::new("Name", string()),
                        FieldDescriptor::new("hidden", int()),
                    ],
                },
            )
            .with_methods(vec![
                MethodDescriptor::new("Tag", FunctionSignature::new(vec![], vec![string()])),
                MethodDescriptor::new("Bump", FunctionSignature::new(vec![], vec![]))
                    .with_pointer_recv(),
            ]),
        );
        // type Outer struct { Inner; Name string }
        loader.add_decl(TypeDecl::new(
            demo(),
            "Outer",
            TypeDescriptor::Struct {
                fields: vec![
                    FieldDescriptor::embedded(named("Inner")),
                    FieldDescriptor::new("Name", string()),
                ],
            },
        ));
        // type Twin struct { ID int }; type Both struct { Inner; Twin }
        loader.add_decl(TypeDecl::new(
            demo(),
            "Twin",
            TypeDescriptor::Struct {
                fields: vec![FieldDescriptor::new("ID", int())],
            },
        ));
        loader.add_decl(TypeDecl::new(
            demo(),
            "Both",
            TypeDescriptor::Struct {
                fields: vec![
                    FieldDescriptor::embedded(named("Inner")),
                    FieldDescriptor::embedded(named("Twin")),
                ],
            },
        ));
        // type PtrEmbed struct { *Inner }
        loader.add_decl(TypeDecl::new(
            demo(),
            "PtrEmbed",
            TypeDescriptor::Struct {
                fields: vec![FieldDescriptor::embedded(TypeDescriptor::pointer_to(
                    named("Inner"),
                ))],
            },
        ));
        // type Closer interface { Close() }
        // type ReadCloser interface { Closer; Read() int }
        loader.add_decl(TypeDecl::new(
            demo(),
            "Closer",
            TypeDescriptor::Interface {
                embeds: vec![],
                methods: vec![MethodDescriptor::new(
                    "Close",
                    FunctionSignature::new(vec![], vec![]),
                )],
            },
        ));
        loader.add_decl(TypeDecl::new(
            demo(),
            "ReadCloser",
            TypeDescriptor::Interface {
                embeds: vec![named("Closer")],
                methods: vec![MethodDescriptor::new(
                    "Read",
                    FunctionSignature::new(vec![], vec![int()]),
                )],
            },
        ));
        // type Wrapper struct { Closer; N int }
        loader.add_decl(TypeDecl::new(
            demo(),
            "Wrapper",
            TypeDescriptor::Struct {
                fields: vec![
                    FieldDescriptor::embedded(named("Closer")),
                    FieldDescriptor::new("N", int()),
                ],
            },
        ));
        // type Node struct { *Node; Value int }
        loader.add_decl(TypeDecl::new(
            demo(),
            "Node",
            TypeDescriptor::Struct {
                fields: vec![
                    FieldDescriptor::embedded(TypeDescriptor::pointer_to(named("Node"))),
                    FieldDescriptor::new("Value", int()),
                ],
            },
        ));
        // type Indirect Inner
        loader.add_decl(TypeDecl::new(demo(), "Indirect", named("Inner")));
        DeclBackend::new(loader)
    }

    #[test]
    pub fn test_shallow_members_shadow_deep_ones() {
        let source = backend();
        let set = member_set(&named("Outer"), &source);
        // Outer.Name (depth 0) hides Inner.Name (depth 1)
        let name = set.field("Name").unwrap();
        assert_eq!(name.depth, 0);
        assert_eq!(name.index.as_slice(), [1]);
        // ID promotes from Inner, through field index 0
        let id = set.field("ID").unwrap();
        assert_eq!(id.depth, 1);
        assert_eq!(id.index.as_slice(), [0, 0]);
        // The embedded field itself is a member too
        assert_eq!(set.field("Inner").unwrap().depth, 0);
    }

    #[test]
    pub fn test_equal_depth_collisions_are_absent() {
        let source = backend();
        let set = member_set(&named("Both"), &source);
        assert!(set.field("ID").is_none());
        // Unambiguous members at the same depth still promote
        assert!(set.field("Name").is_some());
        assert!(set.method("Tag").is_some());
    }

    #[test]
    pub fn test_unexported_members_do_not_promote() {
        let source = backend();
        let direct = member_set(&named("Inner"), &source);
        assert!(direct.field("hidden").is_some());
        let promoted = member_set(&named("Outer"), &source);
        assert!(promoted.field("hidden").is_none());
    }

    #[test]
    pub fn test_pointer_receiver_methods_need_an_addressable_chain() {
        let source = backend();
        let value = member_set(&named("Outer"), &source);
        assert!(value.method("Tag").is_some());
        assert!(value.method("Bump").is_none());

        let ptr = member_set(&TypeDescriptor::pointer_to(named("Outer")), &source);
        assert!(ptr.method("Bump").is_some());

        // A pointer embedding step makes the chain addressable by itself
        let ptr_embed = member_set(&named("PtrEmbed"), &source);
        assert!(ptr_embed.method("Bump").is_some());
    }

    #[test]
    pub fn test_embedded_interfaces_promote_their_methods() {
        let source = backend();
        let set = member_set(&named("Wrapper"), &source);
        let close = set.method("Close").unwrap();
        assert_eq!(close.depth, 1);
        assert!(set.field("N").is_some());
    }

    #[test]
    pub fn test_interface_flattening_follows_embeds() {
        let source = backend();
        let methods = flatten_interface(&named("ReadCloser"), &source);
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Close", "Read"]);
        assert!(flatten_interface(&named("Inner"), &source).is_empty());
    }

    #[test]
    pub fn test_named_underlyings_chase_to_the_struct() {
        let source = backend();
        let set = member_set(&named("Indirect"), &source);
        let name = set.field("Name").unwrap();
        assert_eq!(name.depth, 0);
        assert_eq!(name.index.as_slice(), [1]);
        // Methods stay with the declaring type, not the chain behind it
        assert!(set.method("Tag").is_none());
    }

    #[test]
    pub fn test_self_referential_embedding_terminates() {
        let source = backend();
        let set = member_set(&named("Node"), &source);
        assert!(set.field("Value").is_some());
        assert_eq!(set.field("Node").unwrap().depth, 0);
    }
}
