// the single public operation: map a source value onto a target type
mod capture;
mod construct;
pub(crate) mod dispatch;
pub(crate) mod structural;
mod zero;

use crate::core::error::{MapError, Path};
use crate::core::value::Value;
use structural::{Assemble, Shape};

/// Build a new `T` from `source`, copying fields that share an identifier.
///
/// Records take part through `#[derive(Shape)]` on the source and
/// `#[derive(Assemble)]` on the target, which read the field
/// identifiers from the Rust declaration; serde attributes play no role in
/// which fields correspond. Field types without [`Shape`] or [`Assemble`]
/// are carried by their serde impls. Passing `source` or `&source` is the
/// same.
///
/// - records are matched field by field on the exact identifier; target
///   fields without a counterpart get their zero value, extra source fields
///   are dropped
/// - a record field whose source and target types are identical and `Clone`
///   is cloned as is, so `Rc`/`Arc` leaves keep pointing at the source data
/// - sequences are mapped index for index, mappings entry by entry
/// - an `Option` source is unwrapped once in front of a record, sequence,
///   mapping or enum target, but a direct source never fills an `Option`
///   target and a scalar target never accepts an `Option`
/// - a scalar at the top level yields the zero value of that scalar
///
/// The first incompatibility aborts the whole call.
pub fn map<T, S>(source: S) -> Result<T, MapError>
where
    T: Assemble,
    S: Shape,
{
    log::trace!(
        "mapping {} into {}",
        std::any::type_name::<S>(),
        std::any::type_name::<T>()
    );

    let result = source
        .shape()
        .and_then(top_level)
        .and_then(|value| T::assemble(value));

    if let Err(err) = &result {
        log::debug!(
            "mapping {} into {} failed: {err}",
            std::any::type_name::<S>(),
            std::any::type_name::<T>()
        );
    }

    result
}

// one level of source indirection is allowed at the top; bare scalars map to zero
fn top_level(value: Value<'_>) -> Result<Value<'_>, MapError> {
    let value = match value.unshared() {
        Value::Indirect(Some(inner)) => inner.unshared(),
        Value::Indirect(None) => return Err(MapError::EmptyIndirection { path: Path::root() }),
        other => other,
    };

    if value.kind().is_composite() {
        Ok(value)
    } else {
        Ok(value.zeroed())
    }
}
