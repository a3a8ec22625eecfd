// target side: drive the target's `Deserialize` impl from a captured source
//
// The target decides what it wants through the `deserialize_*` hint it calls.
// Each hint is checked against the kind of the captured source value:
//  - struct hint: walk the target's field list, pull same-named source fields,
//    zero-fill the rest, drop whatever the source has in excess
//  - seq/tuple hint: element by element, in order
//  - map hint: entry by entry, keys untouched
//  - option hint: only an option source may fill an option target
//  - scalar hint: exact scalar type, no coercion, no option unwrapping
// Composite hints accept a source behind one option level.
// Anything else is a kind or type mismatch and aborts the whole mapping.
use serde::de::value::StrDeserializer;
use serde::de::{self, DeserializeSeed, Deserializer as _, Visitor};

use crate::core::error::{MapError, Path, Segment};
use crate::core::types::{Kind, Scalar};
use crate::core::value::{Value, Variant, take_field};
use crate::mapping::zero::Zero;

/// Deserializer over one captured source value.
pub(crate) struct Construct<'a> {
    value: Value<'a>,
}

impl<'a> Construct<'a> {
    pub(crate) fn new(value: Value<'a>) -> Self {
        Self {
            value: value.unshared(),
        }
    }

    fn composite(self) -> Result<Value<'a>, MapError> {
        self.value.into_composite()
    }
}

macro_rules! construct_scalar {
    ($($method:ident => $variant:ident . $visit:ident,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
                match self.value {
                    Value::$variant(v) => visitor.$visit(v),
                    other => Err(MapError::type_mismatch(
                        Kind::Scalar(Scalar::$variant),
                        other.kind(),
                    )),
                }
            }
        )*
    };
}

impl<'de, 'a> de::Deserializer<'de> for Construct<'a> {
    type Error = MapError;

    construct_scalar! {
        deserialize_bool => Bool.visit_bool,
        deserialize_i8 => I8.visit_i8,
        deserialize_i16 => I16.visit_i16,
        deserialize_i32 => I32.visit_i32,
        deserialize_i64 => I64.visit_i64,
        deserialize_i128 => I128.visit_i128,
        deserialize_u8 => U8.visit_u8,
        deserialize_u16 => U16.visit_u16,
        deserialize_u32 => U32.visit_u32,
        deserialize_u64 => U64.visit_u64,
        deserialize_u128 => U128.visit_u128,
        deserialize_f32 => F32.visit_f32,
        deserialize_f64 => F64.visit_f64,
        deserialize_char => Char.visit_char,
        deserialize_str => String.visit_string,
        deserialize_string => String.visit_string,
        deserialize_identifier => String.visit_string,
        deserialize_bytes => Bytes.visit_byte_buf,
        deserialize_byte_buf => Bytes.visit_byte_buf,
    }

    // self-describing targets get the source as it is
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        match self.value {
            Value::Unit => visitor.visit_unit(),
            Value::Bool(v) => visitor.visit_bool(v),
            Value::I8(v) => visitor.visit_i8(v),
            Value::I16(v) => visitor.visit_i16(v),
            Value::I32(v) => visitor.visit_i32(v),
            Value::I64(v) => visitor.visit_i64(v),
            Value::I128(v) => visitor.visit_i128(v),
            Value::U8(v) => visitor.visit_u8(v),
            Value::U16(v) => visitor.visit_u16(v),
            Value::U32(v) => visitor.visit_u32(v),
            Value::U64(v) => visitor.visit_u64(v),
            Value::U128(v) => visitor.visit_u128(v),
            Value::F32(v) => visitor.visit_f32(v),
            Value::F64(v) => visitor.visit_f64(v),
            Value::Char(v) => visitor.visit_char(v),
            Value::String(v) => visitor.visit_string(v),
            Value::Bytes(v) => visitor.visit_byte_buf(v),
            Value::Indirect(None) => visitor.visit_none(),
            Value::Indirect(Some(inner)) => visitor.visit_some(Construct::new(*inner)),
            Value::Sequence(items) => visitor.visit_seq(Elements::new(items)),
            Value::Mapping(entries) => visitor.visit_map(Entries::new(entries)),
            Value::Record(fields) => visitor.visit_map(SourceFields::new(fields)),
            Value::Variant(variant) => visitor.visit_enum(VariantSource(variant)),
            Value::Shared(shared) => Construct::new(Value::Shared(shared)).deserialize_any(visitor),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        visitor.visit_unit()
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        match self.value {
            Value::Indirect(None) => visitor.visit_none(),
            Value::Indirect(Some(inner)) => visitor.visit_some(Construct::new(*inner)),
            other => Err(MapError::IndirectTarget {
                path: Path::root(),
                found: other.kind(),
            }),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        match self.value {
            Value::Unit => visitor.visit_unit(),
            other => Err(MapError::type_mismatch(Kind::Unit, other.kind())),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, MapError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, MapError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        match self.composite()? {
            Value::Sequence(items) => visitor.visit_seq(Elements::new(items)),
            other => Err(MapError::kind_mismatch(Kind::Sequence, other.kind())),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, MapError> {
        match self.composite()? {
            Value::Sequence(items) if items.len() == len => visitor.visit_seq(Elements::new(items)),
            Value::Sequence(items) => Err(MapError::LengthMismatch {
                path: Path::root(),
                expected: len,
                found: items.len(),
            }),
            other => Err(MapError::kind_mismatch(Kind::Sequence, other.kind())),
        }
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, MapError> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        match self.composite()? {
            Value::Mapping(entries) => visitor.visit_map(Entries::new(entries)),
            other => Err(MapError::kind_mismatch(Kind::Mapping, other.kind())),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, MapError> {
        match self.composite()? {
            Value::Record(source) => visitor.visit_map(TargetFields {
                source,
                fields: fields.iter(),
                pending: None,
            }),
            other => Err(MapError::kind_mismatch(Kind::Record, other.kind())),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, MapError> {
        match self.composite()? {
            Value::Variant(variant) if variants.contains(&variant.name) => {
                visitor.visit_enum(VariantSource(variant))
            }
            Value::Variant(variant) => Err(MapError::UnknownVariant {
                path: Path::root(),
                variant: variant.name,
            }),
            other => Err(MapError::kind_mismatch(Kind::Variant, other.kind())),
        }
    }
}

/// Source sequence elements, index for index.
struct Elements<'a> {
    items: std::iter::Enumerate<std::vec::IntoIter<Value<'a>>>,
}

impl<'a> Elements<'a> {
    fn new(items: Vec<Value<'a>>) -> Self {
        Self {
            items: items.into_iter().enumerate(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for Elements<'_> {
    type Error = MapError;

    fn next_element_seed<S>(&mut self, seed: S) -> Result<Option<S::Value>, MapError>
    where
        S: DeserializeSeed<'de>,
    {
        let Some((idx, item)) = self.items.next() else {
            return Ok(None);
        };
        seed.deserialize(Construct::new(item))
            .map(Some)
            .map_err(|e| e.within(Segment::Index(idx)))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Source mapping entries. Order is whatever the source produced.
struct Entries<'a> {
    entries: std::vec::IntoIter<(Value<'a>, Value<'a>)>,
    pending: Option<(String, Value<'a>)>,
}

impl<'a> Entries<'a> {
    fn new(entries: Vec<(Value<'a>, Value<'a>)>) -> Self {
        Self {
            entries: entries.into_iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for Entries<'_> {
    type Error = MapError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, MapError>
    where
        K: DeserializeSeed<'de>,
    {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        let label = key.key_label();
        let key = seed
            .deserialize(Construct::new(key))
            .map_err(|e| e.within(Segment::Key(label.clone())))?;
        self.pending = Some((label, value));
        Ok(Some(key))
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, MapError>
    where
        V: DeserializeSeed<'de>,
    {
        let Some((label, value)) = self.pending.take() else {
            return Err(de::Error::custom("map value requested before its key"));
        };
        seed.deserialize(Construct::new(value))
            .map_err(|e| e.within(Segment::Key(label)))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Target record fields in declared order, filled from the source by name.
struct TargetFields<'a> {
    source: Vec<(&'static str, Value<'a>)>,
    fields: std::slice::Iter<'static, &'static str>,
    pending: Option<(&'static str, Option<Value<'a>>)>,
}

impl<'de> de::MapAccess<'de> for TargetFields<'_> {
    type Error = MapError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, MapError>
    where
        K: DeserializeSeed<'de>,
    {
        let Some(&name) = self.fields.next() else {
            return Ok(None);
        };
        let value = take_field(&mut self.source, name);
        self.pending = Some((name, value));
        seed.deserialize(StrDeserializer::<MapError>::new(name)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, MapError>
    where
        V: DeserializeSeed<'de>,
    {
        let Some((name, value)) = self.pending.take() else {
            return Err(de::Error::custom("field value requested before its name"));
        };
        let result = match value {
            Some(value) => seed.deserialize(Construct::new(value)),
            None => seed.deserialize(Zero),
        };
        result.map_err(|e| e.within(Segment::Field(name)))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// Source record fields as they are, for self-describing targets.
struct SourceFields<'a> {
    fields: std::vec::IntoIter<(&'static str, Value<'a>)>,
    pending: Option<(&'static str, Value<'a>)>,
}

impl<'a> SourceFields<'a> {
    fn new(fields: Vec<(&'static str, Value<'a>)>) -> Self {
        Self {
            fields: fields.into_iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for SourceFields<'_> {
    type Error = MapError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, MapError>
    where
        K: DeserializeSeed<'de>,
    {
        let Some((name, value)) = self.fields.next() else {
            return Ok(None);
        };
        self.pending = Some((name, value));
        seed.deserialize(StrDeserializer::<MapError>::new(name)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, MapError>
    where
        V: DeserializeSeed<'de>,
    {
        let Some((name, value)) = self.pending.take() else {
            return Err(de::Error::custom("field value requested before its name"));
        };
        seed.deserialize(Construct::new(value))
            .map_err(|e| e.within(Segment::Field(name)))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// A captured enum variant, matched on the target by variant name.
struct VariantSource<'a>(Variant<'a>);

impl<'de, 'a> de::EnumAccess<'de> for VariantSource<'a> {
    type Error = MapError;
    type Variant = Self;

    fn variant_seed<S>(self, seed: S) -> Result<(S::Value, Self), MapError>
    where
        S: DeserializeSeed<'de>,
    {
        let tag = seed.deserialize(StrDeserializer::<MapError>::new(self.0.name))?;
        Ok((tag, self))
    }
}

impl<'de> de::VariantAccess<'de> for VariantSource<'_> {
    type Error = MapError;

    fn unit_variant(self) -> Result<(), MapError> {
        let Variant { name, payload } = self.0;
        match *payload {
            Value::Unit => Ok(()),
            other => Err(
                MapError::kind_mismatch(Kind::Unit, other.kind()).within(Segment::Variant(name)),
            ),
        }
    }

    fn newtype_variant_seed<S>(self, seed: S) -> Result<S::Value, MapError>
    where
        S: DeserializeSeed<'de>,
    {
        let Variant { name, payload } = self.0;
        seed.deserialize(Construct::new(*payload))
            .map_err(|e| e.within(Segment::Variant(name)))
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, MapError> {
        let Variant { name, payload } = self.0;
        de::Deserializer::deserialize_tuple(Construct::new(*payload), len, visitor)
            .map_err(|e| e.within(Segment::Variant(name)))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, MapError> {
        let Variant { name, payload } = self.0;
        de::Deserializer::deserialize_struct(Construct::new(*payload), name, fields, visitor)
            .map_err(|e| e.within(Segment::Variant(name)))
    }
}
