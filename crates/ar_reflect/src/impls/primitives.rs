use ar_node::Value;

use crate::scalar::{parse_float, parse_integer};
use crate::{CachedType, Scalar, ScalarError, ScalarFamily, TypeBuilder, Typed};

macro_rules! impl_scalar_typed {
    ($($ty:ty),* $(,)?) => {$(
        impl Typed for $ty {
            fn build_type() -> CachedType {
                TypeBuilder::<Self>::new().scalar().default_constructor().build()
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            const FAMILY: ScalarFamily = ScalarFamily::Integer;

            #[inline]
            fn to_value(&self) -> Value {
                Value::I64(*self as i64)
            }

            #[inline]
            fn from_value(value: Value) -> Result<Self, ScalarError> {
                parse_integer::<Self>(value)
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            const FAMILY: ScalarFamily = ScalarFamily::Integer;

            #[inline]
            fn to_value(&self) -> Value {
                Value::U64(*self as u64)
            }

            #[inline]
            fn from_value(value: Value) -> Result<Self, ScalarError> {
                parse_integer::<Self>(value)
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Scalar for f64 {
    const FAMILY: ScalarFamily = ScalarFamily::Float;

    #[inline]
    fn to_value(&self) -> Value {
        Value::F64(*self)
    }

    #[inline]
    fn from_value(value: Value) -> Result<Self, ScalarError> {
        parse_float(value, |n| n)
    }
}

impl Scalar for f32 {
    const FAMILY: ScalarFamily = ScalarFamily::Float;

    #[inline]
    fn to_value(&self) -> Value {
        Value::F64(f64::from(*self))
    }

    #[inline]
    fn from_value(value: Value) -> Result<Self, ScalarError> {
        parse_float(value, |n| n as f32)
    }
}

impl Scalar for bool {
    const FAMILY: ScalarFamily = ScalarFamily::Boolean;

    #[inline]
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ScalarError> {
        match &value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(ScalarError::new::<bool>(value, "expected true or false")),
        }
    }
}

impl Scalar for char {
    const FAMILY: ScalarFamily = ScalarFamily::Character;

    #[inline]
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }

    fn from_value(value: Value) -> Result<Self, ScalarError> {
        if let Value::String(s) = &value {
            let mut chars = s.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                return Ok(ch);
            }
        }
        Err(ScalarError::new::<char>(value, "expected a single character"))
    }
}

impl Scalar for String {
    const FAMILY: ScalarFamily = ScalarFamily::Text;

    #[inline]
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ScalarError> {
        match value {
            Value::String(s) => Ok(s),
            Value::Null => Err(ScalarError::new::<String>(Value::Null, "expected text")),
            other => Ok(other.to_text().into_owned()),
        }
    }
}

impl_scalar_typed!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, char, String,
);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use ar_node::Value;

    use crate::{Scalar, ScalarFamily, TypeKind};

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(i8::from_value(Value::I64(-128)).unwrap(), -128);
        assert!(i8::from_value(Value::I64(128)).is_err());
        assert!(u64::from_value(Value::F64(1.5)).is_err());
        assert_eq!(u64::from_value(Value::U64(u64::MAX)).unwrap(), u64::MAX);
        assert_eq!(usize::from_value(Value::from("42")).unwrap(), 42);
        assert!(i32::from_value(Value::Bool(true)).is_err());
    }

    #[test]
    fn whole_floats_at_the_edges() {
        let two_to_63 = 9_223_372_036_854_775_808.0_f64;
        let err = i64::from_value(Value::F64(two_to_63)).unwrap_err();
        assert_eq!(err.reason, "out of range");
        assert_eq!(u64::from_value(Value::F64(two_to_63)).unwrap(), 1 << 63);
        assert_eq!(i64::from_value(Value::F64(-two_to_63)).unwrap(), i64::MIN);
        assert_eq!(u64::from_value(Value::F64(2.0 * two_to_63)).unwrap_err().reason, "out of range");
        assert!(u8::from_value(Value::F64(f64::NAN)).is_err());
    }

    #[test]
    fn floats_accept_integers_and_text() {
        assert_eq!(f64::from_value(Value::I64(3)).unwrap(), 3.0);
        assert_eq!(f32::from_value(Value::from("0.5")).unwrap(), 0.5);
        assert!(f64::from_value(Value::Null).is_err());
        assert_eq!(2.5_f32.to_value(), Value::F64(2.5));
    }

    #[test]
    fn text_like_scalars() {
        assert!(!bool::from_value(Value::from(" False ")).unwrap());
        assert!(bool::from_value(Value::from("yes")).is_err());
        assert!(char::from_value(Value::from("ab")).is_err());
        assert!(char::from_value(Value::from("")).is_err());
        assert_eq!(String::from_value(Value::Bool(true)).unwrap(), "true");
        assert!(String::from_value(Value::Null).is_err());
    }

    #[test]
    fn primitives_are_default_constructible_scalars() {
        let ty = crate::resolve::<u8>();
        assert_eq!(ty.kind(), TypeKind::Scalar);
        assert_eq!(ty.scalar().unwrap().family(), ScalarFamily::Integer);

        let zero = ty.construct_default().unwrap().unwrap();
        assert_eq!(zero.downcast_ref::<u8>(), Some(&0));

        let parsed = ty.scalar().unwrap().from_value(Value::from("7")).unwrap();
        assert_eq!(ty.scalar().unwrap().to_value(&*parsed), Some(Value::U64(7)));
    }
}
