// zero values for target fields that have no source counterpart
use std::cell::RefCell;

use serde::de::value::StrDeserializer;
use serde::de::{self, DeserializeSeed, Deserializer as _, Visitor};

use crate::core::error::{MapError, Path, Segment};

const NO_FIELDS: &[&str] = &[];

thread_local! {
    // named types whose zero value is being built on this thread, outermost first
    static BUILDING: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

/// Marks a named type as under construction until dropped.
///
/// A type that is already under construction would have to contain its own
/// zero value, which never terminates (`enum Expr { Not(Box<Expr>), .. }`).
pub(crate) struct ZeroGuard(());

impl ZeroGuard {
    pub(crate) fn enter(type_name: &'static str) -> Result<Self, MapError> {
        BUILDING.with_borrow_mut(|building| {
            if building.contains(&type_name) {
                return Err(MapError::RecursiveZero {
                    path: Path::root(),
                    type_name,
                });
            }
            building.push(type_name);
            Ok(ZeroGuard(()))
        })
    }
}

impl Drop for ZeroGuard {
    fn drop(&mut self) {
        BUILDING.with_borrow_mut(|building| {
            building.pop();
        });
    }
}

/// Deserializer that builds the zero value of whatever the target asks for.
pub(crate) struct Zero;

macro_rules! zero_scalar {
    ($($method:ident => $visit:ident($zero:expr),)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
                visitor.$visit($zero)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Zero {
    type Error = MapError;

    zero_scalar! {
        deserialize_bool => visit_bool(false),
        deserialize_i8 => visit_i8(0),
        deserialize_i16 => visit_i16(0),
        deserialize_i32 => visit_i32(0),
        deserialize_i64 => visit_i64(0),
        deserialize_i128 => visit_i128(0),
        deserialize_u8 => visit_u8(0),
        deserialize_u16 => visit_u16(0),
        deserialize_u32 => visit_u32(0),
        deserialize_u64 => visit_u64(0),
        deserialize_u128 => visit_u128(0),
        deserialize_f32 => visit_f32(0.0),
        deserialize_f64 => visit_f64(0.0),
        deserialize_char => visit_char('\0'),
        deserialize_str => visit_str(""),
        deserialize_string => visit_str(""),
        deserialize_identifier => visit_str(""),
        deserialize_bytes => visit_bytes(&[]),
        deserialize_byte_buf => visit_bytes(&[]),
    }

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        visitor.visit_unit()
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        visitor.visit_unit()
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        visitor.visit_none()
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, MapError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, MapError> {
        let _guard = ZeroGuard::enter(name)?;
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        visitor.visit_seq(ZeroElements { remaining: 0, next: 0 })
    }

    // fixed length: one zero per slot
    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, MapError> {
        visitor.visit_seq(ZeroElements { remaining: len, next: 0 })
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, MapError> {
        let _guard = ZeroGuard::enter(name)?;
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, MapError> {
        visitor.visit_map(ZeroFields {
            fields: NO_FIELDS.iter(),
            pending: None,
        })
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, MapError> {
        let _guard = ZeroGuard::enter(name)?;
        visitor.visit_map(ZeroFields {
            fields: fields.iter(),
            pending: None,
        })
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, MapError> {
        let _guard = ZeroGuard::enter(name)?;
        match variants.first() {
            Some(&variant) => visitor.visit_enum(ZeroVariant { variant }),
            None => Err(de::Error::custom(format_args!(
                "enum `{name}` has no variants to build a zero value from"
            ))),
        }
    }
}

struct ZeroElements {
    remaining: usize,
    next: usize,
}

impl<'de> de::SeqAccess<'de> for ZeroElements {
    type Error = MapError;

    fn next_element_seed<S>(&mut self, seed: S) -> Result<Option<S::Value>, MapError>
    where
        S: DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let idx = self.next;
        self.next += 1;
        seed.deserialize(Zero)
            .map(Some)
            .map_err(|e| e.within(Segment::Index(idx)))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct ZeroFields {
    fields: std::slice::Iter<'static, &'static str>,
    pending: Option<&'static str>,
}

impl<'de> de::MapAccess<'de> for ZeroFields {
    type Error = MapError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, MapError>
    where
        K: DeserializeSeed<'de>,
    {
        let Some(&name) = self.fields.next() else {
            return Ok(None);
        };
        self.pending = Some(name);
        seed.deserialize(StrDeserializer::<MapError>::new(name)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, MapError>
    where
        V: DeserializeSeed<'de>,
    {
        let Some(name) = self.pending.take() else {
            return Err(de::Error::custom("field value requested before its name"));
        };
        seed.deserialize(Zero).map_err(|e| e.within(Segment::Field(name)))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// First declared variant with a zero payload.
struct ZeroVariant {
    variant: &'static str,
}

impl<'de> de::EnumAccess<'de> for ZeroVariant {
    type Error = MapError;
    type Variant = Self;

    fn variant_seed<S>(self, seed: S) -> Result<(S::Value, Self), MapError>
    where
        S: DeserializeSeed<'de>,
    {
        let tag = seed.deserialize(StrDeserializer::<MapError>::new(self.variant))?;
        Ok((tag, self))
    }
}

impl<'de> de::VariantAccess<'de> for ZeroVariant {
    type Error = MapError;

    fn unit_variant(self) -> Result<(), MapError> {
        Ok(())
    }

    fn newtype_variant_seed<S>(self, seed: S) -> Result<S::Value, MapError>
    where
        S: DeserializeSeed<'de>,
    {
        seed.deserialize(Zero)
            .map_err(|e| e.within(Segment::Variant(self.variant)))
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, MapError> {
        de::Deserializer::deserialize_tuple(Zero, len, visitor)
            .map_err(|e| e.within(Segment::Variant(self.variant)))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, MapError> {
        visitor
            .visit_map(ZeroFields {
                fields: fields.iter(),
                pending: None,
            })
            .map_err(|e| e.within(Segment::Variant(self.variant)))
    }
}
