// support code for `#[derive(Shape)]` and `#[derive(Assemble)]` expansions
//
// A derived record does not know whether each field type implements the
// crate traits, serde's traits, or `Clone`. The expansion asks through a
// `Tag` of the field type: a method on `&Tag<T>` is picked when its bound
// holds, otherwise auto-deref falls through to the method on `Tag<T>`.
use std::any::Any;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::types::Kind;
use crate::mapping::capture::Capture;
use crate::mapping::construct::Construct;
use crate::mapping::zero::{Zero, ZeroGuard};

pub use crate::core::error::{MapError, Segment};
pub use crate::core::value::{Shared, Value};
pub use crate::mapping::structural::{Assemble, Shape};

/// Stand-in for a field type during method resolution.
pub struct Tag<T: ?Sized>(PhantomData<fn() -> T>);

impl<T: ?Sized> Tag<T> {
    pub const fn new() -> Self {
        Tag(PhantomData)
    }
}

impl<T: ?Sized> Default for Tag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Tag<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Tag<T> {}

pub fn shape_serialize<T: Serialize + ?Sized>(source: &T) -> Result<Value<'_>, MapError> {
    source.serialize(Capture)
}

pub fn assemble_deserialize<T: DeserializeOwned>(value: Value<'_>) -> Result<T, MapError> {
    T::deserialize(Construct::new(value))
}

pub fn zero_deserialize<T: DeserializeOwned>() -> Result<T, MapError> {
    T::deserialize(Zero)
}

pub trait ShapeField {
    type Field: ?Sized;
    fn shape_field<'a>(self, field: &'a Self::Field) -> Result<Value<'a>, MapError>;
}

impl<T: Shape + ?Sized> ShapeField for &Tag<T> {
    type Field = T;

    fn shape_field<'a>(self, field: &'a T) -> Result<Value<'a>, MapError> {
        field.shape()
    }
}

pub trait SerializeField {
    type Field: ?Sized;
    fn shape_field<'a>(self, field: &'a Self::Field) -> Result<Value<'a>, MapError>;
}

impl<T: Serialize + ?Sized> SerializeField for Tag<T> {
    type Field = T;

    fn shape_field<'a>(self, field: &'a T) -> Result<Value<'a>, MapError> {
        shape_serialize(field)
    }
}

/// Record field: its shape plus the field itself for same-type targets.
pub fn shared<'a, T: Any>(field: &'a T, shape: Value<'a>) -> Value<'a> {
    Value::Shared(Shared::new(field, shape))
}

pub trait ReuseField {
    type Field;
    fn reuse_field<'a>(self, value: Value<'a>) -> Result<Self::Field, Value<'a>>;
}

// identical source and target field types: copy, sharing what `Clone` shares
impl<T: Clone + Any> ReuseField for &Tag<T> {
    type Field = T;

    fn reuse_field<'a>(self, value: Value<'a>) -> Result<T, Value<'a>> {
        match value {
            Value::Shared(shared) => match shared.source::<T>() {
                Some(source) => Ok(source.clone()),
                None => Err(Value::Shared(shared)),
            },
            other => Err(other),
        }
    }
}

pub trait RebuildField {
    type Field;
    fn reuse_field<'a>(self, value: Value<'a>) -> Result<Self::Field, Value<'a>>;
}

impl<T> RebuildField for Tag<T> {
    type Field = T;

    fn reuse_field<'a>(self, value: Value<'a>) -> Result<T, Value<'a>> {
        Err(value)
    }
}

pub trait AssembleField {
    type Field;
    fn assemble_field(self, value: Value<'_>) -> Result<Self::Field, MapError>;
    fn zero_field(self) -> Result<Self::Field, MapError>;
}

impl<T: Assemble> AssembleField for &Tag<T> {
    type Field = T;

    fn assemble_field(self, value: Value<'_>) -> Result<T, MapError> {
        T::assemble(value)
    }

    fn zero_field(self) -> Result<T, MapError> {
        T::zero()
    }
}

pub trait DeserializeField {
    type Field;
    fn assemble_field(self, value: Value<'_>) -> Result<Self::Field, MapError>;
    fn zero_field(self) -> Result<Self::Field, MapError>;
}

impl<T: DeserializeOwned> DeserializeField for Tag<T> {
    type Field = T;

    fn assemble_field(self, value: Value<'_>) -> Result<T, MapError> {
        assemble_deserialize(value)
    }

    fn zero_field(self) -> Result<T, MapError> {
        zero_deserialize()
    }
}

/// Fields of a source record, one indirection level unwrapped.
pub fn record(value: Value<'_>) -> Result<Vec<(&'static str, Value<'_>)>, MapError> {
    match value.into_composite()? {
        Value::Record(fields) => Ok(fields),
        other => Err(MapError::kind_mismatch(Kind::Record, other.kind())),
    }
}

pub fn take_field<'a>(
    fields: &mut Vec<(&'static str, Value<'a>)>,
    name: &str,
) -> Option<Value<'a>> {
    crate::core::value::take_field(fields, name)
}

/// Held while a derived record builds its zero value.
pub struct Building(#[allow(dead_code)] ZeroGuard);

pub fn building(type_name: &'static str) -> Result<Building, MapError> {
    ZeroGuard::enter(type_name).map(Building)
}
