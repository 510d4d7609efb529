use crate::{Reflect, TypeBuilder, Typed, WrapperInfo, WrapperKind};

// -----------------------------------------------------------------------------
// Optional

/// A member that can be absent, as opposed to present-but-null.
///
/// `Optional<Option<T>>` distinguishes all three states. Absent members are
/// skipped when serializing and left untouched when deserializing.
///
/// ```
/// use ar_reflect::Optional;
///
/// let name: Optional<Option<String>> = Optional::Present(None);
/// assert!(name.is_present());
/// assert_eq!(Optional::<u8>::default(), Optional::Absent);
/// assert_eq!(Optional::from(Some(3)).into_option(), Some(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Optional<T> {
    Absent,
    Present(T),
}

impl<T> Optional<T> {
    #[inline]
    pub const fn is_present(&self) -> bool {
        matches!(self, Optional::Present(_))
    }

    #[inline]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Optional::Absent)
    }

    #[inline]
    pub fn as_ref(&self) -> Optional<&T> {
        match self {
            Optional::Absent => Optional::Absent,
            Optional::Present(value) => Optional::Present(value),
        }
    }

    #[inline]
    pub fn into_option(self) -> Option<T> {
        match self {
            Optional::Absent => None,
            Optional::Present(value) => Some(value),
        }
    }
}

impl<T> Default for Optional<T> {
    #[inline]
    fn default() -> Self {
        Optional::Absent
    }
}

impl<T> From<Option<T>> for Optional<T> {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Optional::Absent, Optional::Present)
    }
}

impl<T: Typed> Typed for Optional<T> {
    fn build_type() -> crate::CachedType {
        TypeBuilder::<Self>::new()
            .wrapper(WrapperInfo::new::<T>(
                WrapperKind::Optional,
                |any| match any.downcast_ref::<Optional<T>>()? {
                    Optional::Present(value) => Some(value as &dyn Reflect),
                    Optional::Absent => None,
                },
                |inner| {
                    let value = crate::__macro_exports::take::<T>(inner)?;
                    Ok(Box::new(Optional::Present(value)) as Box<dyn Reflect>)
                },
            ))
            .default_constructor()
            .build()
    }
}
