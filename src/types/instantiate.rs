use std::collections::HashSet;

use log::{debug, trace};
use smol_str::SmolStr;

use crate::types::{
    Constraint, FieldDescriptor, FunctionSignature, MethodDescriptor, NamedTypeRef, TypeDecl,
    TypeDescriptor,
};
use crate::universe::TypeSource;

/// Substitutes the free type parameters of `template` with `args`,
/// positionally, rebuilding the tree. Composites are rebuilt bottom-up; named
/// references keep their own argument lists, which are substituted in turn.
///
/// *Panics* if the template references a parameter index `args` does not
/// cover; templates and argument lists come from the same declaration, so a
/// mismatch is a caller bug.
pub fn instantiate(
    template: &TypeDescriptor,
    args: &[TypeDescriptor],
    source: &dyn TypeSource,
) -> TypeDescriptor {
    match template {
        TypeDescriptor::Invalid => TypeDescriptor::Invalid,
        TypeDescriptor::Basic(basic) => TypeDescriptor::Basic(*basic),
        TypeDescriptor::Param { index, name } => {
            args.get(*index).cloned().unwrap_or_else(|| {
                panic!(
                    "type parameter {} (index {}) has no bound argument (got {})",
                    name,
                    index,
                    args.len()
                )
            })
        }
        TypeDescriptor::Array { len, elem } => {
            TypeDescriptor::array_of(*len, instantiate(elem, args, source))
        }
        TypeDescriptor::Slice { elem } => {
            TypeDescriptor::slice_of(instantiate(elem, args, source))
        }
        TypeDescriptor::Map { key, value } => {
            let key = instantiate(key, args, source);
            // A map is unusable without a resolvable key type
            if key.is_invalid() {
                return TypeDescriptor::Invalid;
            }
            TypeDescriptor::map_of(key, instantiate(value, args, source))
        }
        TypeDescriptor::Chan { dir, elem } => {
            TypeDescriptor::chan_of(*dir, instantiate(elem, args, source))
        }
        TypeDescriptor::Pointer { elem } => {
            TypeDescriptor::pointer_to(instantiate(elem, args, source))
        }
        TypeDescriptor::Func(sig) => {
            TypeDescriptor::func(instantiate_sig(sig, args, source))
        }
        TypeDescriptor::Struct { fields } => TypeDescriptor::Struct {
            fields: fields
                .iter()
                .map(|field| FieldDescriptor {
                    name: field.name.clone(),
                    type_: instantiate(&field.type_, args, source),
                    tag: field.tag.clone(),
                    anonymous: field.anonymous,
                    pkg_path: field.pkg_path.clone(),
                })
                .collect(),
        },
        TypeDescriptor::Interface { embeds, methods } => TypeDescriptor::Interface {
            embeds: embeds
                .iter()
                .map(|embed| instantiate(embed, args, source))
                .collect(),
            methods: methods
                .iter()
                .map(|method| instantiate_method(method, args, source))
                .collect(),
        },
        TypeDescriptor::Named(nref) => {
            let mut bound: Vec<TypeDescriptor> = nref
                .args
                .iter()
                .map(|arg| instantiate(arg, args, source))
                .collect();
            // A reference with an unresolvable argument is itself unresolvable
            if bound.iter().any(TypeDescriptor::is_invalid) {
                return TypeDescriptor::Invalid;
            }
            // An unbound reference to a generic declaration of the same arity
            // inherits the enclosing arguments, so self-referential templates
            // stay bound
            if bound.is_empty() && !args.is_empty() {
                if let Some(decl) = source.lookup(&nref.pkg.path, &nref.name) {
                    if decl.params.len() == args.len() {
                        bound = args.to_vec();
                    }
                }
            }
            TypeDescriptor::Named(Box::new(NamedTypeRef {
                pkg: nref.pkg.clone(),
                name: nref.name.clone(),
                args: bound,
            }))
        }
    }
}

pub fn instantiate_sig(
    sig: &FunctionSignature,
    args: &[TypeDescriptor],
    source: &dyn TypeSource,
) -> FunctionSignature {
    FunctionSignature {
        params: sig
            .params
            .iter()
            .map(|param| instantiate(param, args, source))
            .collect(),
        results: sig
            .results
            .iter()
            .map(|result| instantiate(result, args, source))
            .collect(),
        variadic: sig.variadic,
    }
}

pub fn instantiate_method(
    method: &MethodDescriptor,
    args: &[TypeDescriptor],
    source: &dyn TypeSource,
) -> MethodDescriptor {
    MethodDescriptor {
        name: method.name.clone(),
        pkg_path: method.pkg_path.clone(),
        sig: instantiate_sig(&method.sig, args, source),
        pointer_recv: method.pointer_recv,
    }
}

/// The representative argument for an unbound parameter: the constraint's
/// first embedded member, chased through named interfaces. An unconstrained
/// parameter defaults to the empty interface.
pub fn constraint_default(constraint: &Constraint, source: &dyn TypeSource) -> TypeDescriptor {
    let mut visited = HashSet::new();
    match constraint.embeds.first() {
        Some(embed) => first_concrete(embed, source, &mut visited),
        None => TypeDescriptor::empty_interface(),
    }
}

fn first_concrete(
    desc: &TypeDescriptor,
    source: &dyn TypeSource,
    visited: &mut HashSet<(SmolStr, SmolStr)>,
) -> TypeDescriptor {
    match desc {
        TypeDescriptor::Named(nref) if nref.args.is_empty() => {
            if !visited.insert((nref.pkg.path.clone(), nref.name.clone())) {
                debug!(
                    "constraint cycle through {}.{}",
                    nref.pkg.path, nref.name
                );
                return TypeDescriptor::Invalid;
            }
            match source.lookup(&nref.pkg.path, &nref.name) {
                Some(decl) => match &decl.underlying {
                    TypeDescriptor::Interface { embeds, .. } => match embeds.first() {
                        Some(embed) => first_concrete(embed, source, visited),
                        None => desc.clone(),
                    },
                    _ => desc.clone(),
                },
                None => TypeDescriptor::Invalid,
            }
        }
        TypeDescriptor::Interface { embeds, .. } => match embeds.first() {
            Some(embed) => first_concrete(embed, source, visited),
            None => desc.clone(),
        },
        _ => desc.clone(),
    }
}

/// One representative argument per parameter, for inspecting a generic
/// declaration no arguments were supplied for.
pub fn default_args(decl: &TypeDecl, source: &dyn TypeSource) -> Vec<TypeDescriptor> {
    decl.params
        .iter()
        .map(|param| constraint_default(&param.constraint, source))
        .collect()
}

/// The underlying type of `decl` with `args` substituted. Empty `args` on a
/// generic declaration fall back to constraint defaults. *Panics* on an arity
/// mismatch; public entry points check arity before calling in.
pub fn instantiate_underlying(
    decl: &TypeDecl,
    args: &[TypeDescriptor],
    source: &dyn TypeSource,
) -> TypeDescriptor {
    if decl.params.is_empty() {
        assert!(
            args.is_empty(),
            "type {} is not generic but got {} type arguments",
            decl.name,
            args.len()
        );
        return decl.underlying.clone();
    }
    if args.is_empty() {
        trace!("instantiating {} with constraint defaults", decl.name);
        let defaults = default_args(decl, source);
        return instantiate(&decl.underlying, &defaults, source);
    }
    assert!(
        args.len() == decl.params.len(),
        "wrong number of type arguments for {}: got {}, want {}",
        decl.name,
        args.len(),
        decl.params.len()
    );
    instantiate(&decl.underlying, args, source)
}

/// The underlying type behind a named reference, or [TypeDescriptor::Invalid]
/// if the declaration is unknown or the argument count is wrong.
pub fn resolve_underlying(nref: &NamedTypeRef, source: &dyn TypeSource) -> TypeDescriptor {
    let decl = match source.lookup(&nref.pkg.path, &nref.name) {
        Some(decl) => decl,
        None => {
            debug!("unknown type {}.{}", nref.pkg.path, nref.name);
            return TypeDescriptor::Invalid;
        }
    };
    if !nref.args.is_empty() && nref.args.len() != decl.params.len() {
        debug!(
            "wrong number of type arguments for {}.{}: got {}, want {}",
            nref.pkg.path,
            nref.name,
            nref.args.len(),
            decl.params.len()
        );
        return TypeDescriptor::Invalid;
    }
    instantiate_underlying(&decl, &nref.args, source)
}

/// The method set declared directly on the named type behind `nref`, with
/// generic arguments substituted into every signature. Unknown declarations
/// and arity mismatches yield the empty set.
pub fn resolve_methods(nref: &NamedTypeRef, source: &dyn TypeSource) -> Vec<MethodDescriptor> {
    let decl = match source.lookup(&nref.pkg.path, &nref.name) {
        Some(decl) => decl,
        None => return Vec::new(),
    };
    if decl.params.is_empty() {
        return decl.methods.clone();
    }
    let defaults;
    let args: &[TypeDescriptor] = if nref.args.is_empty() {
        defaults = default_args(&decl, source);
        &defaults
    } else if nref.args.len() == decl.params.len() {
        &nref.args
    } else {
        return Vec::new();
    };
    decl.methods
        .iter()
        .map(|method| instantiate_method(method, args, source))
        .collect()
}
