use std::sync::{Arc, OnceLock};

use crate::__macro_exports::take;
use crate::{CachedType, Reflect, TypeBuilder, Typed, WrapperInfo, WrapperKind};

impl<T: Typed> Typed for Option<T> {
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new()
            .wrapper(
                WrapperInfo::new::<T>(
                    WrapperKind::Nullable,
                    |any| {
                        any.downcast_ref::<Option<T>>()?
                            .as_ref()
                            .map(|value| value as &dyn Reflect)
                    },
                    |inner| Ok(Box::new(Some(take::<T>(inner)?)) as Box<dyn Reflect>),
                )
                .with_empty(|| Box::new(None::<T>) as Box<dyn Reflect>),
            )
            .default_constructor()
            .build()
    }
}

impl<T: Typed> Typed for OnceLock<T> {
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new()
            .wrapper(
                WrapperInfo::new::<T>(
                    WrapperKind::Nullable,
                    |any| {
                        any.downcast_ref::<OnceLock<T>>()?
                            .get()
                            .map(|value| value as &dyn Reflect)
                    },
                    |inner| Ok(Box::new(OnceLock::from(take::<T>(inner)?)) as Box<dyn Reflect>),
                )
                .with_empty(|| Box::new(OnceLock::<T>::new()) as Box<dyn Reflect>),
            )
            .default_constructor()
            .build()
    }
}

impl<T: Typed> Typed for Arc<T> {
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new()
            .wrapper(WrapperInfo::new::<T>(
                WrapperKind::Shared,
                |any| {
                    any.downcast_ref::<Arc<T>>()
                        .map(|value| &**value as &dyn Reflect)
                },
                |inner| Ok(Box::new(Arc::new(take::<T>(inner)?)) as Box<dyn Reflect>),
            ))
            .build()
    }
}

impl Typed for Box<dyn Reflect> {
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new()
            .wrapper(WrapperInfo::dynamic(
                |any| {
                    any.downcast_ref::<Box<dyn Reflect>>()
                        .map(|value| &**value)
                },
                |inner| Ok(Box::new(inner) as Box<dyn Reflect>),
            ))
            .build()
    }
}

// -----------------------------------------------------------------------------
// Tests
