//! Type-directed structural copy between two independently defined types.
//!
//! A source type derives [`Shape`], a target type derives [`Assemble`], and
//! [`map`] builds a new target value from the fields that share a Rust
//! identifier, recursing through nested records, sequences, mappings and
//! enum variants. Serde attributes such as `rename` only affect the wire
//! format, never which fields correspond.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use structural_mapper::{Assemble, Shape};
//!
//! #[derive(Serialize, Shape)]
//! struct WirePerson {
//!     #[serde(rename = "fullName")]
//!     name: String,
//!     middle_names: Vec<String>,
//! }
//!
//! #[derive(Deserialize, Assemble, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//! }
//!
//! let wire = WirePerson {
//!     name: "Ada".to_owned(),
//!     middle_names: vec!["Augusta".to_owned()],
//! };
//! let person: Person = structural_mapper::map(&wire).unwrap();
//! assert_eq!(person, Person { name: "Ada".to_owned() });
//! ```

// derive expansions name this crate by its absolute path
extern crate self as structural_mapper;

pub mod core;
mod mapping;

pub use crate::core::error::{MapError, Path, Segment};
pub use crate::core::types::{Kind, Scalar};
pub use crate::core::value::Value;
pub use crate::mapping::map;
pub use crate::mapping::structural::{Assemble, Shape};
pub use structural_mapper_derive::{Assemble, Shape};

#[doc(hidden)]
pub mod __private {
    pub use crate::mapping::dispatch::*;
}
