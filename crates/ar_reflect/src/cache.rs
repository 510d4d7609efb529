use core::any::TypeId;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use ar_utils::TypeIdMap;

use crate::{CachedType, Typed};

type Slot = Arc<OnceLock<Arc<CachedType>>>;

// -----------------------------------------------------------------------------
// TypeCache

/// Memoizes type descriptors by [`TypeId`].
///
/// Each type gets one slot. The map lock is only held to find or insert the
/// slot; the descriptor is built outside of it, in the slot's `OnceLock`, so
/// concurrent resolution of one type builds it exactly once while other types
/// stay available.
///
/// Descriptors are never evicted.
///
/// ```
/// use std::sync::Arc;
///
/// let a = ar_reflect::resolve::<Vec<String>>();
/// let b = ar_reflect::TypeCache::global().resolve::<Vec<String>>();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct TypeCache {
    slots: RwLock<TypeIdMap<Slot>>,
}

static GLOBAL: TypeCache = TypeCache::new();

impl TypeCache {
    /// Creates an empty cache.
    ///
    /// Most code should use the process-wide [`TypeCache::global`] instead.
    #[inline]
    pub const fn new() -> Self {
        Self {
            slots: RwLock::new(TypeIdMap::new()),
        }
    }

    #[inline]
    pub fn global() -> &'static TypeCache {
        &GLOBAL
    }

    /// Returns the descriptor of `T`, building it on first use.
    pub fn resolve<T: Typed>(&self) -> Arc<CachedType> {
        let slot = self.slot(TypeId::of::<T>());
        Arc::clone(slot.get_or_init(|| {
            let ty = T::build_type();
            log::debug!("cached `{}` as {}", ty.name(), ty.kind());
            Arc::new(ty)
        }))
    }

    /// Returns an already built descriptor.
    pub fn get(&self, type_id: TypeId) -> Option<Arc<CachedType>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(&type_id)?.get().cloned()
    }

    /// Number of types seen, including those still being built.
    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, type_id: TypeId) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.get_or_insert(type_id, Default::default))
    }
}

impl Default for TypeCache {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the descriptor of `T` from the global cache.
///
/// ```
/// use ar_reflect::TypeKind;
///
/// assert_eq!(ar_reflect::resolve::<[u8; 4]>().kind(), TypeKind::Array);
/// assert_eq!(ar_reflect::resolve::<String>().kind(), TypeKind::Scalar);
/// ```
#[inline]
pub fn resolve<T: Typed>() -> Arc<CachedType> {
    GLOBAL.resolve::<T>()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    use super::TypeCache;
    use crate::{CachedType, TypeBuilder, TypeKind, Typed};

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Typed for Counted {
        fn build_type() -> CachedType {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(10));
            TypeBuilder::<Self>::new().build()
        }
    }

    #[test]
    fn concurrent_resolve_builds_once() {
        let cache = Arc::new(TypeCache::new());
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    cache.resolve::<Counted>()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(results[0].kind(), TypeKind::Complex);
    }

    #[test]
    fn get_only_sees_built_types() {
        let cache = TypeCache::new();
        assert!(cache.is_empty());
        assert!(cache.get(TypeId::of::<u32>()).is_none());

        cache.resolve::<u32>();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(TypeId::of::<u32>()).unwrap().name(), "u32");
    }
}
