use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use derive_more::Display;
use once_cell::sync::Lazy;

/// The shape category a descriptor reduces to. Named types report the kind of
/// their underlying shape, so consumers (marshalers, URL codecs) can switch on
/// this without caring whether a type was declared or literal.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    #[display(fmt = "invalid")]
    Invalid,
    #[display(fmt = "bool")]
    Bool,
    #[display(fmt = "int")]
    Int,
    #[display(fmt = "int8")]
    Int8,
    #[display(fmt = "int16")]
    Int16,
    #[display(fmt = "int32")]
    Int32,
    #[display(fmt = "int64")]
    Int64,
    #[display(fmt = "uint")]
    Uint,
    #[display(fmt = "uint8")]
    Uint8,
    #[display(fmt = "uint16")]
    Uint16,
    #[display(fmt = "uint32")]
    Uint32,
    #[display(fmt = "uint64")]
    Uint64,
    #[display(fmt = "uintptr")]
    Uintptr,
    #[display(fmt = "float32")]
    Float32,
    #[display(fmt = "float64")]
    Float64,
    #[display(fmt = "complex64")]
    Complex64,
    #[display(fmt = "complex128")]
    Complex128,
    #[display(fmt = "string")]
    String,
    #[display(fmt = "array")]
    Array,
    #[display(fmt = "chan")]
    Chan,
    #[display(fmt = "func")]
    Func,
    #[display(fmt = "interface")]
    Interface,
    #[display(fmt = "map")]
    Map,
    #[display(fmt = "ptr")]
    Pointer,
    #[display(fmt = "slice")]
    Slice,
    #[display(fmt = "struct")]
    Struct,
}

/// A predeclared leaf type. These print as their own name and are the only
/// identifiers the canonical-ID parser accepts without a declaration behind
/// them (besides the `invalid` sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basic {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
}

static BASIC_BY_NAME: Lazy<HashMap<&'static str, Basic>> =
    Lazy::new(|| Basic::ALL.iter().map(|basic| (basic.name(), *basic)).collect());

impl Basic {
    pub const ALL: [Basic; 17] = [
        Basic::Bool,
        Basic::Int,
        Basic::Int8,
        Basic::Int16,
        Basic::Int32,
        Basic::Int64,
        Basic::Uint,
        Basic::Uint8,
        Basic::Uint16,
        Basic::Uint32,
        Basic::Uint64,
        Basic::Uintptr,
        Basic::Float32,
        Basic::Float64,
        Basic::Complex64,
        Basic::Complex128,
        Basic::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Basic::Bool => "bool",
            Basic::Int => "int",
            Basic::Int8 => "int8",
            Basic::Int16 => "int16",
            Basic::Int32 => "int32",
            Basic::Int64 => "int64",
            Basic::Uint => "uint",
            Basic::Uint8 => "uint8",
            Basic::Uint16 => "uint16",
            Basic::Uint32 => "uint32",
            Basic::Uint64 => "uint64",
            Basic::Uintptr => "uintptr",
            Basic::Float32 => "float32",
            Basic::Float64 => "float64",
            Basic::Complex64 => "complex64",
            Basic::Complex128 => "complex128",
            Basic::String => "string",
        }
    }

    pub fn from_name(name: &str) -> Option<Basic> {
        BASIC_BY_NAME.get(name).copied()
    }

    pub fn kind(self) -> Kind {
        match self {
            Basic::Bool => Kind::Bool,
            Basic::Int => Kind::Int,
            Basic::Int8 => Kind::Int8,
            Basic::Int16 => Kind::Int16,
            Basic::Int32 => Kind::Int32,
            Basic::Int64 => Kind::Int64,
            Basic::Uint => Kind::Uint,
            Basic::Uint8 => Kind::Uint8,
            Basic::Uint16 => Kind::Uint16,
            Basic::Uint32 => Kind::Uint32,
            Basic::Uint64 => Kind::Uint64,
            Basic::Uintptr => Kind::Uintptr,
            Basic::Float32 => Kind::Float32,
            Basic::Float64 => Kind::Float64,
            Basic::Complex64 => Kind::Complex64,
            Basic::Complex128 => Kind::Complex128,
            Basic::String => Kind::String,
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Basic::Bool | Basic::String)
    }
}

impl Display for Basic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::types::{Basic, Kind};

    #[test]
    pub fn test_basic_name_table_is_bidirectional() {
        for basic in Basic::ALL {
            assert_eq!(Basic::from_name(basic.name()), Some(basic));
        }
        assert_eq!(Basic::from_name("rune"), None);
        assert_eq!(Basic::from_name("Invalid"), None);
    }

    #[test]
    pub fn test_kind_display_matches_basic_name() {
        for basic in Basic::ALL {
            assert_eq!(basic.kind().to_string(), basic.name());
        }
        assert_eq!(Kind::Pointer.to_string(), "ptr");
        assert_eq!(Kind::Struct.to_string(), "struct");
    }
}
