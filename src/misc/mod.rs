/// [Display](std::fmt::Display) with threaded context
mod fmt_with_ctx;

pub use fmt_with_ctx::{DisplayWithCtx, ValueAndCtx};
