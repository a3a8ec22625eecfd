// kinds of values seen by the mapper
use std::fmt;

/// Coarse structural category of a value.
///
/// Source and target must agree on the kind at every depth of a mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Named-field struct.
    Record,
    /// Vec, array, tuple, set.
    Sequence,
    /// Key-value map.
    Mapping,
    /// Enum variant.
    Variant,
    /// `Option<T>`.
    Indirection,
    /// `()` and unit structs.
    Unit,
    /// Leaf value, see [`Scalar`].
    Scalar(Scalar),
}

impl Kind {
    /// Record, sequence, mapping and variant. Everything else is a leaf.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            Kind::Record | Kind::Sequence | Kind::Mapping | Kind::Variant
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Record => f.write_str("record"),
            Kind::Sequence => f.write_str("sequence"),
            Kind::Mapping => f.write_str("mapping"),
            Kind::Variant => f.write_str("enum variant"),
            Kind::Indirection => f.write_str("option"),
            Kind::Unit => f.write_str("unit"),
            Kind::Scalar(scalar) => write!(f, "{scalar}"),
        }
    }
}

/// Leaf value types. Matched exactly, there is no numeric widening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// `bool`.
    Bool,
    /// `i8`.
    I8,
    /// `i16`.
    I16,
    /// `i32`.
    I32,
    /// `i64`.
    I64,
    /// `i128`.
    I128,
    /// `u8`.
    U8,
    /// `u16`.
    U16,
    /// `u32`.
    U32,
    /// `u64`.
    U64,
    /// `u128`.
    U128,
    /// `f32`.
    F32,
    /// `f64`.
    F64,
    /// `char`.
    Char,
    /// `String` and `str`.
    String,
    /// Byte buffers serialized as bytes, not as a sequence of `u8`.
    Bytes,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scalar::Bool => "bool",
            Scalar::I8 => "i8",
            Scalar::I16 => "i16",
            Scalar::I32 => "i32",
            Scalar::I64 => "i64",
            Scalar::I128 => "i128",
            Scalar::U8 => "u8",
            Scalar::U16 => "u16",
            Scalar::U32 => "u32",
            Scalar::U64 => "u64",
            Scalar::U128 => "u128",
            Scalar::F32 => "f32",
            Scalar::F64 => "f64",
            Scalar::Char => "char",
            Scalar::String => "string",
            Scalar::Bytes => "bytes",
        };
        f.write_str(name)
    }
}
