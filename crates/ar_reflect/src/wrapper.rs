use core::any::Any;
use core::fmt;

use crate::{Reflect, ReflectError, TypeRef, Typed};

/// Reads the wrapped value; `None` for the empty state.
pub type UnwrapFn = for<'a> fn(&'a dyn Any) -> Option<&'a dyn Reflect>;

/// Wraps a value of the inner type.
pub type WrapFn = fn(Box<dyn Reflect>) -> Result<Box<dyn Reflect>, ReflectError>;

/// What a wrapper adds around its inner value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    /// Has a null state: `Option<T>`, `OnceLock<T>`.
    Nullable,
    /// Has an absent state distinct from null: [`Optional<T>`](crate::Optional).
    Optional,
    /// Shared pointer, always present: `Arc<T>`.
    Shared,
    /// `Box<dyn Reflect>`: the inner type is only known at runtime.
    Dynamic,
}

/// Describes a type that wraps one inner value.
///
/// The object adapter looks through wrappers: a member of type
/// `Option<Arc<T>>` maps like a `T` that may be null.
#[derive(Clone)]
pub struct WrapperInfo {
    kind: WrapperKind,
    inner: Option<TypeRef>,
    unwrap: UnwrapFn,
    wrap: WrapFn,
    empty: Option<fn() -> Box<dyn Reflect>>,
}

impl WrapperInfo {
    /// A wrapper around the statically known type `T`.
    #[inline]
    pub fn new<T: Typed>(kind: WrapperKind, unwrap: UnwrapFn, wrap: WrapFn) -> Self {
        Self {
            kind,
            inner: Some(TypeRef::of::<T>()),
            unwrap,
            wrap,
            empty: None,
        }
    }

    /// A wrapper whose inner type is only known per value.
    #[inline]
    pub fn dynamic(unwrap: UnwrapFn, wrap: WrapFn) -> Self {
        Self {
            kind: WrapperKind::Dynamic,
            inner: None,
            unwrap,
            wrap,
            empty: None,
        }
    }

    /// Sets the constructor of the null state.
    #[inline]
    pub fn with_empty(mut self, empty: fn() -> Box<dyn Reflect>) -> Self {
        self.empty = Some(empty);
        self
    }

    #[inline]
    pub fn kind(&self) -> WrapperKind {
        self.kind
    }

    /// The inner type, `None` for dynamic wrappers.
    #[inline]
    pub fn inner(&self) -> Option<TypeRef> {
        self.inner
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.empty.is_some()
    }

    #[inline]
    pub fn unwrap<'a>(&self, value: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        (self.unwrap)(value.as_any())
    }

    #[inline]
    pub fn wrap(&self, inner: Box<dyn Reflect>) -> Result<Box<dyn Reflect>, ReflectError> {
        (self.wrap)(inner)
    }

    /// A new value in the null state, for nullable wrappers.
    #[inline]
    pub fn empty(&self) -> Option<Box<dyn Reflect>> {
        self.empty.map(|empty| empty())
    }
}

impl fmt::Debug for WrapperInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperInfo")
            .field("kind", &self.kind)
            .field("inner", &self.inner)
            .field("nullable", &self.is_nullable())
            .finish()
    }
}
