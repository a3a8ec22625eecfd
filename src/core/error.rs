use std::fmt;

use crate::core::types::Kind;

/// One step from a parent value into a child value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Field(&'static str),
    Index(usize),
    /// Already rendered mapping key.
    Key(String),
    Variant(&'static str),
}

/// Location of a failure inside the target, rendered as `$.spec.ingress[0]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    // errors are built at the leaf and grow towards the root
    fn prepend(&mut self, segment: Segment) {
        self.0.insert(0, segment);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
                Segment::Key(key) => write!(f, "[{key}]")?,
                Segment::Variant(name) => write!(f, "::{name}")?,
            }
        }
        Ok(())
    }
}

/// Reasons a mapping aborts. Any of these fails the whole call.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum MapError {
    #[error("{path}: source and target must be the same kind, target expects a {expected} but source is a {found}")]
    KindMismatch {
        path: Path,
        expected: Kind,
        found: Kind,
    },

    #[error("{path}: target field is {expected} but source field is {found}")]
    TypeMismatch {
        path: Path,
        expected: Kind,
        found: Kind,
    },

    #[error("{path}: a direct {found} cannot populate an option target")]
    IndirectTarget { path: Path, found: Kind },

    #[error("{path}: source option is empty but the target is not an option")]
    EmptyIndirection { path: Path },

    #[error("{path}: target expects exactly {expected} elements but source has {found}")]
    LengthMismatch {
        path: Path,
        expected: usize,
        found: usize,
    },

    #[error("{path}: variant `{variant}` does not exist on the target enum")]
    UnknownVariant { path: Path, variant: &'static str },

    #[error("{path}: `{type_name}` has no finite zero value, it would contain itself")]
    RecursiveZero {
        path: Path,
        type_name: &'static str,
    },

    #[error("{path}: {message}")]
    Custom { path: Path, message: String },
}

impl MapError {
    pub(crate) fn kind_mismatch(expected: Kind, found: Kind) -> Self {
        MapError::KindMismatch {
            path: Path::root(),
            expected,
            found,
        }
    }

    pub(crate) fn type_mismatch(expected: Kind, found: Kind) -> Self {
        MapError::TypeMismatch {
            path: Path::root(),
            expected,
            found,
        }
    }

    /// Where in the target the mapping failed.
    pub fn path(&self) -> &Path {
        match self {
            MapError::KindMismatch { path, .. }
            | MapError::TypeMismatch { path, .. }
            | MapError::IndirectTarget { path, .. }
            | MapError::EmptyIndirection { path }
            | MapError::LengthMismatch { path, .. }
            | MapError::UnknownVariant { path, .. }
            | MapError::RecursiveZero { path, .. }
            | MapError::Custom { path, .. } => path,
        }
    }

    fn path_mut(&mut self) -> &mut Path {
        match self {
            MapError::KindMismatch { path, .. }
            | MapError::TypeMismatch { path, .. }
            | MapError::IndirectTarget { path, .. }
            | MapError::EmptyIndirection { path }
            | MapError::LengthMismatch { path, .. }
            | MapError::UnknownVariant { path, .. }
            | MapError::RecursiveZero { path, .. }
            | MapError::Custom { path, .. } => path,
        }
    }

    /// Record that this error happened below `segment`.
    pub fn within(mut self, segment: Segment) -> Self {
        self.path_mut().prepend(segment);
        self
    }
}

impl serde::ser::Error for MapError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        MapError::Custom {
            path: Path::root(),
            message: msg.to_string(),
        }
    }
}

impl serde::de::Error for MapError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        MapError::Custom {
            path: Path::root(),
            message: msg.to_string(),
        }
    }
}
