use core::any::Any;
use core::fmt;

use ar_node::Value;

use crate::{Reflect, ScalarError, Typed};

// -----------------------------------------------------------------------------
// ScalarFamily

/// The family of a scalar type, used to pick default friendly messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFamily {
    Text,
    Boolean,
    Integer,
    Float,
    Character,
    DateTime,
    Uuid,
    Enumeration,
    Other,
}

// -----------------------------------------------------------------------------
// Scalar

/// A type that maps to a single [`Value`].
///
/// Conversions are lenient on input: integers parse from text and from
/// integral floats, text accepts any non-null scalar. Output is the natural
/// value variant.
///
/// ```
/// use ar_node::Value;
/// use ar_reflect::Scalar;
///
/// assert_eq!(i16::from_value(Value::from(" -12 ")).unwrap(), -12);
/// assert_eq!(u32::from_value(Value::F64(4.0)).unwrap(), 4);
/// assert!(u32::from_value(Value::I64(-1)).is_err());
/// assert!(bool::from_value(Value::from("TRUE")).unwrap());
/// assert_eq!(String::from_value(Value::U64(9)).unwrap(), "9");
/// assert_eq!('x'.to_value(), Value::from("x"));
/// ```
pub trait Scalar: Sized {
    const FAMILY: ScalarFamily;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ScalarError>;
}

// -----------------------------------------------------------------------------
// ScalarOps

/// Type-erased [`Scalar`] conversions stored in a descriptor.
#[derive(Clone, Copy)]
pub struct ScalarOps {
    family: ScalarFamily,
    to_value: fn(&dyn Any) -> Option<Value>,
    from_value: fn(Value) -> Result<Box<dyn Reflect>, ScalarError>,
}

impl ScalarOps {
    pub fn of<T: Scalar + Typed>() -> Self {
        Self {
            family: T::FAMILY,
            to_value: |any| any.downcast_ref::<T>().map(T::to_value),
            from_value: |value| T::from_value(value).map(|v| Box::new(v) as Box<dyn Reflect>),
        }
    }

    #[inline]
    pub fn family(&self) -> ScalarFamily {
        self.family
    }

    /// `None` if `value` is not of the described type.
    #[inline]
    pub fn to_value(&self, value: &dyn Reflect) -> Option<Value> {
        (self.to_value)(value.as_any())
    }

    #[inline]
    pub fn from_value(&self, value: Value) -> Result<Box<dyn Reflect>, ScalarError> {
        (self.from_value)(value)
    }
}

impl fmt::Debug for ScalarOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarOps")
            .field("family", &self.family)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Parsing helpers

pub(crate) fn parse_integer<T>(value: Value) -> Result<T, ScalarError>
where
    T: TryFrom<i64> + TryFrom<u64> + core::str::FromStr,
    <T as core::str::FromStr>::Err: fmt::Display,
{
    const OUT_OF_RANGE: &str = "out of range";
    let result = match &value {
        Value::I64(n) => <T as TryFrom<i64>>::try_from(*n).map_err(|_| OUT_OF_RANGE.to_owned()),
        Value::U64(n) => <T as TryFrom<u64>>::try_from(*n).map_err(|_| OUT_OF_RANGE.to_owned()),
        Value::F64(n) if n.fract() != 0.0 => Err("not a whole number".to_owned()),
        // `MAX as f64` rounds up to 2^63 and 2^64, so both bounds are exclusive.
        Value::F64(n) if *n >= i64::MIN as f64 && *n < i64::MAX as f64 => {
            <T as TryFrom<i64>>::try_from(*n as i64).map_err(|_| OUT_OF_RANGE.to_owned())
        }
        Value::F64(n) if *n >= 0.0 && *n < u64::MAX as f64 => {
            <T as TryFrom<u64>>::try_from(*n as u64).map_err(|_| OUT_OF_RANGE.to_owned())
        }
        Value::F64(_) => Err(OUT_OF_RANGE.to_owned()),
        Value::String(s) => s.trim().parse::<T>().map_err(|e| e.to_string()),
        Value::Bool(_) | Value::Null => Err("expected an integer".to_owned()),
    };
    result.map_err(|reason| ScalarError::new::<T>(value, reason))
}

pub(crate) fn parse_float<T>(value: Value, from_f64: fn(f64) -> T) -> Result<T, ScalarError>
where
    T: core::str::FromStr,
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let result = match &value {
        Value::I64(n) => Ok(from_f64(*n as f64)),
        Value::U64(n) => Ok(from_f64(*n as f64)),
        Value::F64(n) => Ok(from_f64(*n)),
        Value::String(s) => s.trim().parse::<T>().map_err(|e| e.to_string()),
        Value::Bool(_) | Value::Null => Err("expected a number".to_owned()),
    };
    result.map_err(|reason| ScalarError::new::<T>(value, reason))
}

/// Parses text through [`FromStr`](core::str::FromStr); non-text scalars are
/// rendered as text first.
pub fn parse_text<T>(value: Value) -> Result<T, ScalarError>
where
    T: core::str::FromStr,
    <T as core::str::FromStr>::Err: fmt::Display,
{
    if value.is_null() {
        return Err(ScalarError::new::<T>(value, "expected a value"));
    }
    let result = value.to_text().trim().parse::<T>();
    result.map_err(|e| ScalarError::new::<T>(value, e))
}

// -----------------------------------------------------------------------------
// impl_text_scalar

/// Implements [`Scalar`] and [`Typed`] for a type through its
/// [`Display`](core::fmt::Display) and [`FromStr`](core::str::FromStr) impls.
///
/// Append `default` to register the [`Default`] impl as zero-argument
/// constructor, which enables empty-value defaulting.
///
/// ```
/// use ar_reflect::{ScalarFamily, TypeKind, impl_text_scalar};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Celsius(f32);
///
/// impl core::fmt::Display for Celsius {
///     fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
///         write!(f, "{}C", self.0)
///     }
/// }
///
/// impl core::str::FromStr for Celsius {
///     type Err = core::num::ParseFloatError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.trim_end_matches('C').parse().map(Celsius)
///     }
/// }
///
/// impl_text_scalar!(Celsius, ScalarFamily::Other, default);
///
/// let ty = ar_reflect::resolve::<Celsius>();
/// assert_eq!(ty.kind(), TypeKind::Scalar);
/// assert!(ty.default_constructor().is_some());
/// ```
#[macro_export]
macro_rules! impl_text_scalar {
    ($ty:ty, $family:expr) => {
        $crate::impl_text_scalar!(@scalar $ty, $family);

        impl $crate::Typed for $ty {
            fn build_type() -> $crate::CachedType {
                $crate::TypeBuilder::<Self>::new().scalar().build()
            }
        }
    };
    ($ty:ty, $family:expr, default) => {
        $crate::impl_text_scalar!(@scalar $ty, $family);

        impl $crate::Typed for $ty {
            fn build_type() -> $crate::CachedType {
                $crate::TypeBuilder::<Self>::new()
                    .scalar()
                    .default_constructor()
                    .build()
            }
        }
    };
    (@scalar $ty:ty, $family:expr) => {
        impl $crate::Scalar for $ty {
            const FAMILY: $crate::ScalarFamily = $family;

            fn to_value(&self) -> $crate::__macro_exports::Value {
                $crate::__macro_exports::Value::String(::std::string::ToString::to_string(self))
            }

            fn from_value(
                value: $crate::__macro_exports::Value,
            ) -> ::core::result::Result<Self, $crate::ScalarError> {
                $crate::__macro_exports::parse_text::<Self>(value)
            }
        }
    };
}
