use core::fmt::Display;

use ar_node::Value;
use thiserror::Error;

use crate::{Reflect, short_type_name};

// -----------------------------------------------------------------------------
// ScalarError

/// A value that could not be converted to a scalar type.
///
/// ```
/// use ar_node::Value;
/// use ar_reflect::Scalar;
///
/// let err = u8::from_value(Value::from("300")).unwrap_err();
/// assert_eq!(err.expected, "u8");
/// assert_eq!(err.to_string(), "cannot convert \"300\" to `u8`: number too large to fit in target type");
/// ```
#[derive(Debug, Clone, Error)]
#[error("cannot convert {found} to `{expected}`: {reason}")]
pub struct ScalarError {
    pub expected: String,
    pub found: Value,
    pub reason: String,
}

impl ScalarError {
    pub fn new<T: ?Sized>(found: Value, reason: impl Display) -> Self {
        Self {
            expected: short_type_name(core::any::type_name::<T>()),
            found,
            reason: reason.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// ReflectError

/// Failures of descriptor operations: accessors, constructors, builders.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReflectError {
    #[error("expected a value of type `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },
    #[error(transparent)]
    Scalar(#[from] ScalarError),
    #[error("`{type_name}` holds exactly {expected} items, found {found}")]
    Length {
        type_name: String,
        expected: usize,
        found: usize,
    },
    #[error("constructor of `{type_name}` takes {expected} arguments, found {found}")]
    Arity {
        type_name: String,
        expected: usize,
        found: usize,
    },
    #[error("missing constructor argument `{0}`")]
    MissingArgument(&'static str),
    #[error("member `{member}` of `{type_name}` is not writable")]
    NotWritable {
        type_name: String,
        member: &'static str,
    },
}

impl ReflectError {
    /// `found` was handed where a `T` was expected.
    pub fn mismatch<T: ?Sized>(found: &dyn Reflect) -> Self {
        ReflectError::TypeMismatch {
            expected: short_type_name(core::any::type_name::<T>()),
            found: short_type_name(found.type_path()),
        }
    }
}
