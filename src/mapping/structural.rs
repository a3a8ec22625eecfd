// the two sides of a mapping, keyed by Rust field identifiers
//
// Records get their impls from `#[derive(Shape)]` and `#[derive(Assemble)]`.
// Containers recurse into their elements through these traits, so a derived
// record nested in a `Vec`, `HashMap` or `Option` still matches by
// identifier. Leaves go through serde.
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::core::error::{MapError, Path, Segment};
use crate::core::types::Kind;
use crate::core::value::Value;
use crate::mapping::dispatch::{assemble_deserialize, shape_serialize, zero_deserialize};
use crate::mapping::map;

/// Source side of a mapping: capture `self` as a [`Value`].
pub trait Shape {
    fn shape(&self) -> Result<Value<'_>, MapError>;

    /// Method form of [`map`].
    fn map_into<T: Assemble>(&self) -> Result<T, MapError> {
        map(self)
    }
}

/// Target side of a mapping: build `Self` from a captured source.
pub trait Assemble: Sized {
    fn assemble(value: Value<'_>) -> Result<Self, MapError>;

    /// Value of a target field that has no source counterpart.
    fn zero() -> Result<Self, MapError>;
}

macro_rules! through_serde {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Shape for $ty {
                fn shape(&self) -> Result<Value<'_>, MapError> {
                    shape_serialize(self)
                }
            }

            impl Assemble for $ty {
                fn assemble(value: Value<'_>) -> Result<Self, MapError> {
                    assemble_deserialize(value)
                }

                fn zero() -> Result<Self, MapError> {
                    zero_deserialize()
                }
            }
        )*
    };
}

through_serde!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    char,
    String,
    SystemTime,
    Duration,
);

impl Shape for str {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        shape_serialize(self)
    }
}

// ownership wrappers are transparent

impl<T: Shape + ?Sized> Shape for &T {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        (**self).shape()
    }
}

impl<T: Shape + ?Sized> Shape for &mut T {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        (**self).shape()
    }
}

macro_rules! transparent {
    ($($wrapper:ident),*) => {
        $(
            impl<T: Shape + ?Sized> Shape for $wrapper<T> {
                fn shape(&self) -> Result<Value<'_>, MapError> {
                    (**self).shape()
                }
            }

            impl<T: Assemble> Assemble for $wrapper<T> {
                fn assemble(value: Value<'_>) -> Result<Self, MapError> {
                    T::assemble(value).map($wrapper::new)
                }

                fn zero() -> Result<Self, MapError> {
                    T::zero().map($wrapper::new)
                }
            }
        )*
    };
}

transparent!(Box, Rc, Arc);

impl<T: Shape> Shape for Option<T> {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        match self {
            None => Ok(Value::Indirect(None)),
            Some(inner) => Ok(Value::Indirect(Some(Box::new(inner.shape()?)))),
        }
    }
}

impl<T: Assemble> Assemble for Option<T> {
    fn assemble(value: Value<'_>) -> Result<Self, MapError> {
        match value.unshared() {
            Value::Indirect(None) => Ok(None),
            Value::Indirect(Some(inner)) => T::assemble(*inner).map(Some),
            other => Err(MapError::IndirectTarget {
                path: Path::root(),
                found: other.kind(),
            }),
        }
    }

    fn zero() -> Result<Self, MapError> {
        Ok(None)
    }
}

fn shape_elements<'a, T: Shape + 'a>(
    items: impl IntoIterator<Item = &'a T>,
) -> Result<Value<'a>, MapError> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| item.shape().map_err(|e| e.within(Segment::Index(idx))))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Sequence)
}

fn elements(value: Value<'_>) -> Result<Vec<Value<'_>>, MapError> {
    match value.into_composite()? {
        Value::Sequence(items) => Ok(items),
        other => Err(MapError::kind_mismatch(Kind::Sequence, other.kind())),
    }
}

fn assemble_elements<T, C>(value: Value<'_>) -> Result<C, MapError>
where
    T: Assemble,
    C: FromIterator<T>,
{
    elements(value)?
        .into_iter()
        .enumerate()
        .map(|(idx, item)| T::assemble(item).map_err(|e| e.within(Segment::Index(idx))))
        .collect()
}

macro_rules! sequence {
    ($($seq:ident<T $(: $($bound:path),+)?>),*) => {
        $(
            impl<T: Shape> Shape for $seq<T> {
                fn shape(&self) -> Result<Value<'_>, MapError> {
                    shape_elements(self)
                }
            }

            impl<T: Assemble $($(+ $bound)+)?> Assemble for $seq<T> {
                fn assemble(value: Value<'_>) -> Result<Self, MapError> {
                    assemble_elements(value)
                }

                fn zero() -> Result<Self, MapError> {
                    Ok($seq::new())
                }
            }
        )*
    };
}

sequence!(Vec<T>, VecDeque<T>, BTreeSet<T: Ord>);

impl<T: Shape> Shape for [T] {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        shape_elements(self)
    }
}

impl<T: Shape, H> Shape for HashSet<T, H> {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        shape_elements(self)
    }
}

impl<T, H> Assemble for HashSet<T, H>
where
    T: Assemble + Eq + Hash,
    H: BuildHasher + Default,
{
    fn assemble(value: Value<'_>) -> Result<Self, MapError> {
        assemble_elements(value)
    }

    fn zero() -> Result<Self, MapError> {
        Ok(HashSet::default())
    }
}

impl<T: Shape, const N: usize> Shape for [T; N] {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        shape_elements(self)
    }
}

impl<T: Assemble, const N: usize> Assemble for [T; N] {
    fn assemble(value: Value<'_>) -> Result<Self, MapError> {
        let items = elements(value)?;
        if items.len() != N {
            return Err(MapError::LengthMismatch {
                path: Path::root(),
                expected: N,
                found: items.len(),
            });
        }
        let items = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| T::assemble(item).map_err(|e| e.within(Segment::Index(idx))))
            .collect::<Result<Vec<T>, _>>()?;
        fixed(items)
    }

    fn zero() -> Result<Self, MapError> {
        let items = (0..N)
            .map(|idx| T::zero().map_err(|e| e.within(Segment::Index(idx))))
            .collect::<Result<Vec<T>, _>>()?;
        fixed(items)
    }
}

fn fixed<T, const N: usize>(items: Vec<T>) -> Result<[T; N], MapError> {
    <[T; N]>::try_from(items).map_err(|items| MapError::LengthMismatch {
        path: Path::root(),
        expected: N,
        found: items.len(),
    })
}

macro_rules! tuple {
    ($($len:literal => ($($idx:tt $ty:ident $var:ident),+))*) => {
        $(
            impl<$($ty: Shape),+> Shape for ($($ty,)+) {
                fn shape(&self) -> Result<Value<'_>, MapError> {
                    Ok(Value::Sequence(vec![$(
                        self.$idx.shape().map_err(|e| e.within(Segment::Index($idx)))?,
                    )+]))
                }
            }

            impl<$($ty: Assemble),+> Assemble for ($($ty,)+) {
                fn assemble(value: Value<'_>) -> Result<Self, MapError> {
                    let [$($var),+]: [Value<'_>; $len] =
                        elements(value)?.try_into().map_err(|items: Vec<Value<'_>>| {
                            MapError::LengthMismatch {
                                path: Path::root(),
                                expected: $len,
                                found: items.len(),
                            }
                        })?;
                    Ok(($(
                        $ty::assemble($var).map_err(|e| e.within(Segment::Index($idx)))?,
                    )+))
                }

                fn zero() -> Result<Self, MapError> {
                    Ok(($(
                        $ty::zero().map_err(|e| e.within(Segment::Index($idx)))?,
                    )+))
                }
            }
        )*
    };
}

tuple! {
    1 => (0 A a)
    2 => (0 A a, 1 B b)
    3 => (0 A a, 1 B b, 2 C c)
    4 => (0 A a, 1 B b, 2 C c, 3 D d)
}

fn shape_entries<'a, K, V>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
) -> Result<Value<'a>, MapError>
where
    K: Shape + 'a,
    V: Shape + 'a,
{
    let mut out = Vec::new();
    for (idx, (key, value)) in entries.enumerate() {
        let key = key
            .shape()
            .map_err(|e| e.within(Segment::Key(format!("<key #{idx}>"))))?;
        let value = value
            .shape()
            .map_err(|e| e.within(Segment::Key(key.key_label())))?;
        out.push((key, value));
    }
    Ok(Value::Mapping(out))
}

fn assemble_entries<K, V, C>(value: Value<'_>) -> Result<C, MapError>
where
    K: Assemble,
    V: Assemble,
    C: FromIterator<(K, V)>,
{
    let entries = match value.into_composite()? {
        Value::Mapping(entries) => entries,
        other => return Err(MapError::kind_mismatch(Kind::Mapping, other.kind())),
    };
    entries
        .into_iter()
        .map(|(key, value)| {
            let label = key.key_label();
            let key = K::assemble(key).map_err(|e| e.within(Segment::Key(label.clone())))?;
            let value = V::assemble(value).map_err(|e| e.within(Segment::Key(label)))?;
            Ok((key, value))
        })
        .collect()
}

impl<K: Shape, V: Shape, H> Shape for HashMap<K, V, H> {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        shape_entries(self.iter())
    }
}

impl<K, V, H> Assemble for HashMap<K, V, H>
where
    K: Assemble + Eq + Hash,
    V: Assemble,
    H: BuildHasher + Default,
{
    fn assemble(value: Value<'_>) -> Result<Self, MapError> {
        assemble_entries(value)
    }

    fn zero() -> Result<Self, MapError> {
        Ok(HashMap::default())
    }
}

impl<K: Shape, V: Shape> Shape for BTreeMap<K, V> {
    fn shape(&self) -> Result<Value<'_>, MapError> {
        shape_entries(self.iter())
    }
}

impl<K: Assemble + Ord, V: Assemble> Assemble for BTreeMap<K, V> {
    fn assemble(value: Value<'_>) -> Result<Self, MapError> {
        assemble_entries(value)
    }

    fn zero() -> Result<Self, MapError> {
        Ok(BTreeMap::new())
    }
}
