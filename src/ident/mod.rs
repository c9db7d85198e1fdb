/// Canonical-ID parsing (recursive descent over a small token stream)
mod parse;
/// Canonical-ID printing
mod print;
/// Struct-tag quoting
mod tag;
/// The reversible package-path codec
mod wrap;

pub(crate) use parse::id_to_type;
pub use print::{type_to_id, IdCtx};
pub use tag::{quote_tag, unquote_tag};
pub use wrap::{unwrap, wrap, ESCAPE};
