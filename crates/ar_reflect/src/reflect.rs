use core::any::Any;
use core::fmt;
use std::sync::Arc;

use crate::{CachedType, TypeCache};

// -----------------------------------------------------------------------------
// Typed

/// A type that can describe itself as a [`CachedType`].
///
/// Implemented by [`#[derive(Reflect)]`](crate::derive::Reflect) for structs
/// and fieldless enums, and in [`impls`](crate::impls) for scalars,
/// collections and wrappers. Call [`resolve`](crate::resolve) rather than
/// `build_type` directly: the cache guarantees the descriptor is built once.
///
/// `build_type` must not resolve its own type, directly or through a member.
/// Member and element types are referenced lazily through
/// [`TypeRef`](crate::TypeRef), which keeps recursive types safe.
pub trait Typed: Reflect + Sized {
    fn build_type() -> CachedType;
}

// -----------------------------------------------------------------------------
// Reflect

/// Object-safe view of a [`Typed`] value.
///
/// Every `Typed` type implements `Reflect` through a blanket impl. The trait
/// is the currency of the object adapter: member getters return
/// `&dyn Reflect`, setters and constructors take `Box<dyn Reflect>`.
///
/// Note that `Box<dyn Reflect>` is itself `Typed` (a dynamic wrapper). Call
/// methods on the inner value through `&*boxed`, otherwise they describe the
/// box.
///
/// ```
/// use ar_reflect::Reflect;
///
/// let boxed: Box<dyn Reflect> = Box::new(7_u16);
/// assert!(boxed.is::<u16>());
/// assert_eq!((*boxed).reflect_type().name(), "u16");
/// assert_eq!(boxed.take::<u16>().ok(), Some(7));
/// ```
pub trait Reflect: Any + Send + Sync {
    /// The descriptor of the concrete type.
    fn reflect_type(&self) -> Arc<CachedType>;

    /// The full type name of the concrete type.
    fn type_path(&self) -> &'static str;
}

impl<T: Typed> Reflect for T {
    #[inline]
    fn reflect_type(&self) -> Arc<CachedType> {
        TypeCache::global().resolve::<T>()
    }

    #[inline]
    fn type_path(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

impl dyn Reflect {
    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    pub fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Moves the value out as `T`, handing the box back on a type mismatch.
    pub fn take<T: Any>(self: Box<Self>) -> Result<T, Box<dyn Reflect>> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type checked above"),
        }
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Reflect({})", self.type_path())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::Reflect;

    #[test]
    fn take_returns_box_on_mismatch() {
        let boxed: Box<dyn Reflect> = Box::new(String::from("x"));
        let boxed = boxed.take::<i32>().unwrap_err();
        assert_eq!((*boxed).type_path(), "alloc::string::String");
        assert_eq!(boxed.take::<String>().unwrap(), "x");
    }

    #[test]
    fn downcast_through_dyn() {
        let mut value = 3_i64;
        let dynamic: &mut dyn Reflect = &mut value;
        *dynamic.downcast_mut::<i64>().unwrap() += 1;
        assert_eq!(dynamic.downcast_ref::<i64>(), Some(&4));
        assert!(dynamic.downcast_ref::<u64>().is_none());
        assert_eq!(format!("{:?}", &*dynamic), "dyn Reflect(i64)");
    }
}
