use core::any::Any;
use core::fmt;

use crate::{Reflect, ReflectError, TypeRef, Typed};

/// Lists the items of a sequence.
pub type ItemsFn = for<'a> fn(&'a dyn Any) -> Vec<&'a dyn Reflect>;

/// Builds a sequence from its items, in order.
pub type FromItemsFn = fn(Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>, ReflectError>;

/// Lists the entries of a dictionary.
pub type EntriesFn = for<'a> fn(&'a dyn Any) -> Vec<(&'a dyn Reflect, &'a dyn Reflect)>;

/// Builds a dictionary from its entries; later duplicates win.
pub type FromEntriesFn =
    fn(Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>) -> Result<Box<dyn Reflect>, ReflectError>;

// -----------------------------------------------------------------------------
// SequenceInfo

/// The enumerable surface of a type.
#[derive(Clone)]
pub struct SequenceInfo {
    element: TypeRef,
    fixed_len: Option<usize>,
    items: ItemsFn,
    from_items: FromItemsFn,
}

impl SequenceInfo {
    #[inline]
    pub fn new<E: Typed>(items: ItemsFn, from_items: FromItemsFn) -> Self {
        Self {
            element: TypeRef::of::<E>(),
            fixed_len: None,
            items,
            from_items,
        }
    }

    /// Marks the sequence as a true array of exactly `len` items.
    #[inline]
    pub fn fixed(mut self, len: usize) -> Self {
        self.fixed_len = Some(len);
        self
    }

    #[inline]
    pub fn element(&self) -> TypeRef {
        self.element
    }

    #[inline]
    pub fn fixed_len(&self) -> Option<usize> {
        self.fixed_len
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.fixed_len.is_some()
    }

    #[inline]
    pub fn items<'a>(&self, value: &'a dyn Reflect) -> Vec<&'a dyn Reflect> {
        (self.items)(value.as_any())
    }

    #[inline]
    pub fn build(&self, items: Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>, ReflectError> {
        (self.from_items)(items)
    }
}

impl fmt::Debug for SequenceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceInfo")
            .field("element", &self.element)
            .field("fixed_len", &self.fixed_len)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// DictionaryInfo

/// The keyed surface of a type. Keys must be scalars to map as node names.
#[derive(Clone)]
pub struct DictionaryInfo {
    key: TypeRef,
    value: TypeRef,
    entries: EntriesFn,
    from_entries: FromEntriesFn,
}

impl DictionaryInfo {
    #[inline]
    pub fn new<K: Typed, V: Typed>(entries: EntriesFn, from_entries: FromEntriesFn) -> Self {
        Self {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
            entries,
            from_entries,
        }
    }

    #[inline]
    pub fn key(&self) -> TypeRef {
        self.key
    }

    #[inline]
    pub fn value(&self) -> TypeRef {
        self.value
    }

    #[inline]
    pub fn entries<'a>(&self, value: &'a dyn Reflect) -> Vec<(&'a dyn Reflect, &'a dyn Reflect)> {
        (self.entries)(value.as_any())
    }

    #[inline]
    pub fn build(
        &self,
        entries: Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>,
    ) -> Result<Box<dyn Reflect>, ReflectError> {
        (self.from_entries)(entries)
    }
}

impl fmt::Debug for DictionaryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryInfo")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}
