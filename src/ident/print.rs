use std::fmt::{Display, Formatter};

use crate::ident::{quote_tag, wrap};
use crate::misc::DisplayWithCtx;
use crate::types::{
    ChanDir, FieldDescriptor, FunctionSignature, MethodDescriptor, NamedTypeRef, TypeDescriptor,
};

/// Context which affects how a descriptor is printed. With `wrap` set, every
/// package-qualified name passes through the path codec so the output stays
/// reparsable by the canonical-ID grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdCtx {
    pub wrap: bool,
}

/// Renders the canonical ID of a descriptor. Pure; the per-universe memo
/// lives on [Universe](crate::universe::Universe).
pub fn type_to_id(desc: &TypeDescriptor, wrap: bool) -> String {
    desc.with_ctx(&IdCtx { wrap }).to_string()
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        DisplayWithCtx::fmt(self, f, &IdCtx::default())
    }
}

impl DisplayWithCtx<IdCtx> for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>, ctx: &IdCtx) -> std::fmt::Result {
        match self {
            TypeDescriptor::Invalid => write!(f, "invalid"),
            TypeDescriptor::Basic(basic) => write!(f, "{}", basic),
            TypeDescriptor::Array { len, elem } => {
                write!(f, "[{}]{}", len, elem.with_ctx(ctx))
            }
            TypeDescriptor::Slice { elem } => write!(f, "[]{}", elem.with_ctx(ctx)),
            TypeDescriptor::Map { key, value } => {
                write!(f, "map[{}]{}", key.with_ctx(ctx), value.with_ctx(ctx))
            }
            TypeDescriptor::Chan { dir, elem } => {
                let prefix = match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                };
                write!(f, "{}{}", prefix, elem.with_ctx(ctx))
            }
            TypeDescriptor::Pointer { elem } => write!(f, "*{}", elem.with_ctx(ctx)),
            TypeDescriptor::Func(sig) => {
                write!(f, "func")?;
                sig.fmt(f, ctx)
            }
            TypeDescriptor::Struct { fields } => {
                if fields.is_empty() {
                    return write!(f, "struct {{}}");
                }
                write!(f, "struct {{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    field.fmt(f, ctx)?;
                }
                write!(f, " }}")
            }
            TypeDescriptor::Interface { embeds, methods } => {
                if embeds.is_empty() && methods.is_empty() {
                    return write!(f, "interface {{}}");
                }
                write!(f, "interface {{ ")?;
                let mut wrote = false;
                for embed in embeds {
                    if wrote {
                        write!(f, "; ")?;
                    }
                    wrote = true;
                    write!(f, "{}", embed.with_ctx(ctx))?;
                }
                for method in methods {
                    if wrote {
                        write!(f, "; ")?;
                    }
                    wrote = true;
                    method.fmt(f, ctx)?;
                }
                write!(f, " }}")
            }
            TypeDescriptor::Named(nref) => nref.fmt(f, ctx),
            TypeDescriptor::Param { name, .. } => write!(f, "{}", name),
        }
    }
}

impl DisplayWithCtx<IdCtx> for NamedTypeRef {
    fn fmt(&self, f: &mut Formatter<'_>, ctx: &IdCtx) -> std::fmt::Result {
        if !self.pkg.path.is_empty() {
            if ctx.wrap {
                write!(f, "{}.", wrap(&self.pkg.path))?;
            } else {
                write!(f, "{}.", self.pkg.path)?;
            }
        }
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "[")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", arg.with_ctx(ctx))?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl DisplayWithCtx<IdCtx> for FunctionSignature {
    fn fmt(&self, f: &mut Formatter<'_>, ctx: &IdCtx) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.variadic && i + 1 == self.params.len() {
                write!(f, "...")?;
                match param {
                    TypeDescriptor::Slice { elem } => write!(f, "{}", elem.with_ctx(ctx))?,
                    // Variadic non-slice is a malformed signature; print the
                    // type as-is so the breakage is visible in the ID
                    other => write!(f, "{}", other.with_ctx(ctx))?,
                }
            } else {
                write!(f, "{}", param.with_ctx(ctx))?;
            }
        }
        write!(f, ")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [result] => {
                write!(f, " {}", result.with_ctx(ctx))
            }
            results => {
                write!(f, " (")?;
                for (i, result) in results.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", result.with_ctx(ctx))?;
                }
                write!(f, ")")
            }
        }
    }
}

impl DisplayWithCtx<IdCtx> for FieldDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>, ctx: &IdCtx) -> std::fmt::Result {
        if !self.anonymous {
            write!(f, "{} ", self.name)?;
        }
        write!(f, "{}", self.type_.with_ctx(ctx))?;
        if !self.tag.is_empty() {
            write!(f, " {}", quote_tag(&self.tag))?;
        }
        Ok(())
    }
}

impl DisplayWithCtx<IdCtx> for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>, ctx: &IdCtx) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        self.sig.fmt(f, ctx)
    }
}
