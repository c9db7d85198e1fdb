use std::fmt::{Display, Formatter};

/// Pairs a value with its display context so the combination implements [Display].
pub struct ValueAndCtx<'a, 'b, T: DisplayWithCtx<Ctx> + ?Sized, Ctx: ?Sized> {
    value: &'a T,
    ctx: &'b Ctx
}

/// [Display] which takes extra context. Printing a type tree needs to thread
/// flags (e.g. whether qualified names get escaped) through every recursive
/// call, which a plain [Display] impl can't do.
pub trait DisplayWithCtx<Ctx: ?Sized> {
    fn fmt(&self, f: &mut Formatter<'_>, ctx: &Ctx) -> std::fmt::Result;

    fn with_ctx<'a, 'b>(&'a self, ctx: &'b Ctx) -> ValueAndCtx<'a, 'b, Self, Ctx> where Self: Sized {
        ValueAndCtx {
            value: self,
            ctx
        }
    }
}

impl<T: DisplayWithCtx<Ctx>, Ctx: ?Sized> DisplayWithCtx<Ctx> for Box<T> {
    fn fmt(&self, f: &mut Formatter<'_>, ctx: &Ctx) -> std::fmt::Result {
        self.as_ref().fmt(f, ctx)
    }
}

impl<'a, 'b, T: DisplayWithCtx<Ctx> + ?Sized, Ctx: ?Sized> Display for ValueAndCtx<'a, 'b, T, Ctx> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f, self.ctx)
    }
}
