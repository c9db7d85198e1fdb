/// Core descriptor model: type trees, declarations, fields and methods
mod data;
/// The [Type] facade over a universe backend
mod facade;
/// Generic substitution and declaration resolution
pub(crate) mod instantiate;
/// Kind and basic-type tables
mod kind;
/// Embedding-aware member promotion
pub(crate) mod promote;

pub use data::{
    is_exported, ChanDir, Constraint, FieldDescriptor, FunctionSignature, MethodDescriptor,
    NamedTypeRef, PackageRef, TypeDecl, TypeDescriptor, TypeParamDecl,
};
pub use facade::{Method, StructField, Type};
pub use kind::{Basic, Kind};
