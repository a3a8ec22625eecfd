// captured shape of a source value
use std::any::Any;
use std::fmt;

use crate::core::error::{MapError, Path};
use crate::core::types::{Kind, Scalar};

/// Owned, type-erased copy of a source value.
///
/// Produced on the source side (by [`Shape`](crate::Shape) or the capture
/// serializer) and consumed on the target side. Field and variant names are
/// `'static` because they come from derives. The lifetime ties
/// [`Value::Shared`] leaves to the source they were taken from.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<'a> {
    Unit,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Indirect(Option<Box<Value<'a>>>),
    Sequence(Vec<Value<'a>>),
    Mapping(Vec<(Value<'a>, Value<'a>)>),
    Record(Vec<(&'static str, Value<'a>)>),
    Variant(Variant<'a>),
    /// A record field that a target of the very same type may take as is.
    Shared(Shared<'a>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variant<'a> {
    pub name: &'static str,
    /// `Unit` for unit variants, a `Sequence` for tuple variants and a
    /// `Record` for struct variants.
    pub payload: Box<Value<'a>>,
}

/// Borrowed source field next to its captured shape.
#[derive(Clone)]
pub struct Shared<'a> {
    source: &'a (dyn Any + 'static),
    shape: Box<Value<'a>>,
}

impl<'a> Shared<'a> {
    pub fn new(source: &'a (dyn Any + 'static), shape: Value<'a>) -> Self {
        Self {
            source,
            shape: Box::new(shape),
        }
    }

    /// The source field, if it is a `T`.
    pub fn source<T: Any>(&self) -> Option<&'a T> {
        self.source.downcast_ref::<T>()
    }
}

impl fmt::Debug for Shared<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.shape).finish()
    }
}

impl PartialEq for Shared<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Unit => Kind::Unit,
            Value::Bool(_) => Kind::Scalar(Scalar::Bool),
            Value::I8(_) => Kind::Scalar(Scalar::I8),
            Value::I16(_) => Kind::Scalar(Scalar::I16),
            Value::I32(_) => Kind::Scalar(Scalar::I32),
            Value::I64(_) => Kind::Scalar(Scalar::I64),
            Value::I128(_) => Kind::Scalar(Scalar::I128),
            Value::U8(_) => Kind::Scalar(Scalar::U8),
            Value::U16(_) => Kind::Scalar(Scalar::U16),
            Value::U32(_) => Kind::Scalar(Scalar::U32),
            Value::U64(_) => Kind::Scalar(Scalar::U64),
            Value::U128(_) => Kind::Scalar(Scalar::U128),
            Value::F32(_) => Kind::Scalar(Scalar::F32),
            Value::F64(_) => Kind::Scalar(Scalar::F64),
            Value::Char(_) => Kind::Scalar(Scalar::Char),
            Value::String(_) => Kind::Scalar(Scalar::String),
            Value::Bytes(_) => Kind::Scalar(Scalar::Bytes),
            Value::Indirect(_) => Kind::Indirection,
            Value::Sequence(_) => Kind::Sequence,
            Value::Mapping(_) => Kind::Mapping,
            Value::Record(_) => Kind::Record,
            Value::Variant(_) => Kind::Variant,
            Value::Shared(shared) => shared.shape.kind(),
        }
    }

    /// Drop the borrowed source and keep the captured shape.
    pub fn unshared(self) -> Value<'a> {
        match self {
            Value::Shared(shared) => *shared.shape,
            other => other,
        }
    }

    /// Source side of a composite target: one indirection level is unwrapped,
    /// a second one is left for the kind check to reject.
    pub(crate) fn into_composite(self) -> Result<Value<'a>, MapError> {
        match self.unshared() {
            Value::Indirect(Some(inner)) => Ok(inner.unshared()),
            Value::Indirect(None) => Err(MapError::EmptyIndirection { path: Path::root() }),
            other => Ok(other),
        }
    }

    /// Same scalar type, zero content. Composites are returned untouched.
    pub(crate) fn zeroed(self) -> Value<'a> {
        match self.unshared() {
            Value::Bool(_) => Value::Bool(false),
            Value::I8(_) => Value::I8(0),
            Value::I16(_) => Value::I16(0),
            Value::I32(_) => Value::I32(0),
            Value::I64(_) => Value::I64(0),
            Value::I128(_) => Value::I128(0),
            Value::U8(_) => Value::U8(0),
            Value::U16(_) => Value::U16(0),
            Value::U32(_) => Value::U32(0),
            Value::U64(_) => Value::U64(0),
            Value::U128(_) => Value::U128(0),
            Value::F32(_) => Value::F32(0.0),
            Value::F64(_) => Value::F64(0.0),
            Value::Char(_) => Value::Char('\0'),
            Value::String(_) => Value::String(String::new()),
            Value::Bytes(_) => Value::Bytes(Vec::new()),
            other => other,
        }
    }

    /// Render a mapping key for error paths.
    pub(crate) fn key_label(&self) -> String {
        match self {
            Value::String(s) => format!("{s:?}"),
            Value::Char(c) => format!("{c:?}"),
            Value::Bool(v) => v.to_string(),
            Value::I8(v) => v.to_string(),
            Value::I16(v) => v.to_string(),
            Value::I32(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::I128(v) => v.to_string(),
            Value::U8(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
            Value::U128(v) => v.to_string(),
            Value::F32(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::Variant(variant) => variant.name.to_owned(),
            Value::Shared(shared) => shared.shape.key_label(),
            other => format!("<{}>", other.kind()),
        }
    }
}

/// Remove the field called `name` from a captured record.
pub(crate) fn take_field<'a>(
    fields: &mut Vec<(&'static str, Value<'a>)>,
    name: &str,
) -> Option<Value<'a>> {
    let idx = fields.iter().position(|(field, _)| *field == name)?;
    Some(fields.swap_remove(idx).1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_keeps_scalar_type() {
        assert_eq!(Value::String("Ada".into()).zeroed(), Value::String(String::new()));
        assert_eq!(Value::U32(7).zeroed(), Value::U32(0));
        assert_eq!(Value::Char('x').zeroed().kind(), Kind::Scalar(Scalar::Char));
    }

    #[test]
    fn zeroed_leaves_composites_alone() {
        let seq = Value::Sequence(vec![Value::I32(1)]);
        assert_eq!(seq.clone().zeroed(), seq);
    }

    #[test]
    fn take_field_removes_by_exact_name() {
        let mut fields = vec![("Name", Value::String("Ada".into())), ("Age", Value::U8(36))];

        assert_eq!(take_field(&mut fields, "name"), None);
        assert_eq!(take_field(&mut fields, "Name"), Some(Value::String("Ada".into())));
        assert_eq!(fields.len(), 1);
        assert_eq!(take_field(&mut fields, "Name"), None);
    }

    #[test]
    fn key_labels() {
        assert_eq!(Value::String("foo".into()).key_label(), "\"foo\"");
        assert_eq!(Value::U64(3).key_label(), "3");
        assert_eq!(Value::Sequence(vec![]).key_label(), "<sequence>");
    }

    #[test]
    fn composite_unwraps_a_single_indirection() {
        let once = Value::Indirect(Some(Box::new(Value::Record(vec![]))));
        assert_eq!(once.into_composite().unwrap(), Value::Record(vec![]));

        let twice = Value::Indirect(Some(Box::new(Value::Indirect(None))));
        assert_eq!(twice.into_composite().unwrap().kind(), Kind::Indirection);

        assert!(matches!(
            Value::Indirect(None).into_composite().unwrap_err(),
            MapError::EmptyIndirection { .. }
        ));
    }

    #[test]
    fn shared_reports_the_shape_kind_and_source() {
        let name = String::from("Ada");
        let shared = Shared::new(&name, Value::String(name.clone()));

        assert_eq!(shared.source::<String>().map(String::as_str), Some("Ada"));
        assert!(shared.source::<u8>().is_none());

        let value = Value::Shared(shared);
        assert_eq!(value.kind(), Kind::Scalar(Scalar::String));
        assert_eq!(value.unshared(), Value::String("Ada".into()));
    }
}
