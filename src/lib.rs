//! A structural model of a Go-style type algebra, viewed through two
//! backends: compiled package metadata ([universe::DeclBackend]) and
//! declarations observed at runtime ([universe::ReflectBackend]).
//!
//! Types print to a canonical ID grammar and parse back
//! ([ident::type_to_id], [universe::Universe::parse_id]); member lookup is
//! embedding-aware with Go's shadowing and ambiguity rules; generic
//! declarations instantiate on demand, falling back to constraint defaults.
//! A [universe::Universe] owns both backends plus the print/parse/member
//! caches, and [universe::Universe::global] is the shared process-wide one.
//!
//! ```
//! use typeverse::types::{Basic, Kind};
//! use typeverse::universe::{SourceKind, Universe};
//!
//! let u = Universe::global();
//! let t = u.parse_id(SourceKind::Decl, "map[string][]int");
//! assert_eq!(t.kind(), Kind::Map);
//! assert_eq!(t.key().unwrap(), u.basic(Basic::String));
//! assert_eq!(t.to_string(), "map[string][]int");
//! ```

pub mod ident;
pub mod misc;
pub mod types;
pub mod universe;

pub use types::{Basic, Kind, Method, StructField, Type};
pub use universe::{SourceKind, Universe};
