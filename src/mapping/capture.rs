// source side: serialize anything into a `Value` tree
use serde::ser::{self, Serialize, Serializer as _};

use crate::core::error::{MapError, Segment};
use crate::core::value::{Value, Variant};

/// Serializer that records the shape and content of a source value.
pub(crate) struct Capture;

impl ser::Serializer for Capture {
    type Ok = Value<'static>;
    type Error = MapError;

    type SerializeSeq = CaptureSeq;
    type SerializeTuple = CaptureSeq;
    type SerializeTupleStruct = CaptureSeq;
    type SerializeTupleVariant = CaptureTupleVariant;
    type SerializeMap = CaptureMap;
    type SerializeStruct = CaptureRecord;
    type SerializeStructVariant = CaptureStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value<'static>, MapError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value<'static>, MapError> {
        Ok(Value::I8(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value<'static>, MapError> {
        Ok(Value::I16(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value<'static>, MapError> {
        Ok(Value::I32(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value<'static>, MapError> {
        Ok(Value::I64(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value<'static>, MapError> {
        Ok(Value::I128(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value<'static>, MapError> {
        Ok(Value::U8(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value<'static>, MapError> {
        Ok(Value::U16(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value<'static>, MapError> {
        Ok(Value::U32(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value<'static>, MapError> {
        Ok(Value::U64(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value<'static>, MapError> {
        Ok(Value::U128(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value<'static>, MapError> {
        Ok(Value::F32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value<'static>, MapError> {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value<'static>, MapError> {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value<'static>, MapError> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value<'static>, MapError> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Indirect(None))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value<'static>, MapError>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(Capture)?;
        Ok(Value::Indirect(Some(Box::new(inner))))
    }

    fn serialize_unit(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Unit)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value<'static>, MapError> {
        Ok(Value::Unit)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value<'static>, MapError> {
        Ok(Value::Variant(Variant {
            name: variant,
            payload: Box::new(Value::Unit),
        }))
    }

    // newtypes are transparent
    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value<'static>, MapError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value<'static>, MapError>
    where
        T: ?Sized + Serialize,
    {
        let payload = value
            .serialize(Capture)
            .map_err(|e| e.within(Segment::Variant(variant)))?;
        Ok(Value::Variant(Variant {
            name: variant,
            payload: Box::new(payload),
        }))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<CaptureSeq, MapError> {
        Ok(CaptureSeq {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<CaptureSeq, MapError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<CaptureSeq, MapError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<CaptureTupleVariant, MapError> {
        Ok(CaptureTupleVariant {
            variant,
            items: CaptureSeq {
                items: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<CaptureMap, MapError> {
        Ok(CaptureMap {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<CaptureRecord, MapError> {
        Ok(CaptureRecord {
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<CaptureStructVariant, MapError> {
        Ok(CaptureStructVariant {
            variant,
            record: CaptureRecord {
                fields: Vec::with_capacity(len),
            },
        })
    }
}

pub(crate) struct CaptureSeq {
    items: Vec<Value<'static>>,
}

impl CaptureSeq {
    fn push<T>(&mut self, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        let idx = self.items.len();
        let item = value
            .serialize(Capture)
            .map_err(|e| e.within(Segment::Index(idx)))?;
        self.items.push(item);
        Ok(())
    }
}

impl ser::SerializeSeq for CaptureSeq {
    type Ok = Value<'static>;
    type Error = MapError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Sequence(self.items))
    }
}

impl ser::SerializeTuple for CaptureSeq {
    type Ok = Value<'static>;
    type Error = MapError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Sequence(self.items))
    }
}

impl ser::SerializeTupleStruct for CaptureSeq {
    type Ok = Value<'static>;
    type Error = MapError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Sequence(self.items))
    }
}

pub(crate) struct CaptureTupleVariant {
    variant: &'static str,
    items: CaptureSeq,
}

impl ser::SerializeTupleVariant for CaptureTupleVariant {
    type Ok = Value<'static>;
    type Error = MapError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        let variant = self.variant;
        self.items
            .push(value)
            .map_err(|e| e.within(Segment::Variant(variant)))
    }

    fn end(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Variant(Variant {
            name: self.variant,
            payload: Box::new(Value::Sequence(self.items.items)),
        }))
    }
}

pub(crate) struct CaptureMap {
    entries: Vec<(Value<'static>, Value<'static>)>,
    pending_key: Option<Value<'static>>,
}

impl ser::SerializeMap for CaptureMap {
    type Ok = Value<'static>;
    type Error = MapError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        // the key has no rendering of its own yet, name it by position
        let idx = self.entries.len();
        let key = key
            .serialize(Capture)
            .map_err(|e| e.within(Segment::Key(format!("<key #{idx}>"))))?;
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        let Some(key) = self.pending_key.take() else {
            return Err(ser::Error::custom("map value serialized before its key"));
        };
        let value = value
            .serialize(Capture)
            .map_err(|e| e.within(Segment::Key(key.key_label())))?;
        self.entries.push((key, value));
        Ok(())
    }

    fn end(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Mapping(self.entries))
    }
}

pub(crate) struct CaptureRecord {
    fields: Vec<(&'static str, Value<'static>)>,
}

impl CaptureRecord {
    fn push<T>(&mut self, key: &'static str, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        let value = value
            .serialize(Capture)
            .map_err(|e| e.within(Segment::Field(key)))?;
        self.fields.push((key, value));
        Ok(())
    }
}

impl ser::SerializeStruct for CaptureRecord {
    type Ok = Value<'static>;
    type Error = MapError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        self.push(key, value)
    }

    fn end(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Record(self.fields))
    }
}

pub(crate) struct CaptureStructVariant {
    variant: &'static str,
    record: CaptureRecord,
}

impl ser::SerializeStructVariant for CaptureStructVariant {
    type Ok = Value<'static>;
    type Error = MapError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), MapError>
    where
        T: ?Sized + Serialize,
    {
        let variant = self.variant;
        self.record
            .push(key, value)
            .map_err(|e| e.within(Segment::Variant(variant)))
    }

    fn end(self) -> Result<Value<'static>, MapError> {
        Ok(Value::Variant(Variant {
            name: self.variant,
            payload: Box::new(Value::Record(self.record.fields)),
        }))
    }
}
