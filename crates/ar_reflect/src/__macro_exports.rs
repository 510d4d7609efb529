//! Items used by code generated from `#[derive(Reflect)]` and the exported
//! macros. Not part of the public API.

pub use ar_node::Value;
pub use core::any::Any;

use crate::{Reflect, ReflectError, ScalarError, Typed};

pub use crate::scalar::parse_text;

#[inline]
pub fn downcast_ref<T: Any>(any: &dyn Any) -> Option<&T> {
    any.downcast_ref::<T>()
}

/// Accesses the owner inside a setter.
#[inline]
pub fn downcast_mut<T: Any>(any: &mut dyn Any) -> Result<&mut T, ReflectError> {
    match any.downcast_mut::<T>() {
        Some(value) => Ok(value),
        None => Err(ReflectError::TypeMismatch {
            expected: crate::short_type_name(core::any::type_name::<T>()),
            found: String::from("a different owner"),
        }),
    }
}

/// Moves a member or argument value out of its box.
#[inline]
pub fn take<T: Typed>(value: Box<dyn Reflect>) -> Result<T, ReflectError> {
    value
        .take::<T>()
        .map_err(|value| ReflectError::mismatch::<T>(&*value))
}

/// Takes the next constructor argument.
pub fn next_arg<T: Typed>(
    args: &mut std::vec::IntoIter<Box<dyn Reflect>>,
    name: &'static str,
) -> Result<T, ReflectError> {
    let value = args.next().ok_or(ReflectError::MissingArgument(name))?;
    take::<T>(value)
}

/// The error for text that names no variant of `T`.
pub fn unknown_variant<T>(found: Value, variants: &[&str]) -> ScalarError {
    ScalarError::new::<T>(found, format_args!("expected one of {}", variants.join(", ")))
}

/// Finds the variant named by `value` (case-insensitively) or by its index.
pub fn variant_index(value: &Value, variants: &[&str]) -> Option<usize> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            variants
                .iter()
                .position(|variant| variant.eq_ignore_ascii_case(text))
        }
        Value::I64(n) => usize::try_from(*n).ok().filter(|n| *n < variants.len()),
        Value::U64(n) => usize::try_from(*n).ok().filter(|n| *n < variants.len()),
        _ => None,
    }
}
