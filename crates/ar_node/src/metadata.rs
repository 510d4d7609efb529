use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use ar_utils::TypeIdMap;

// -----------------------------------------------------------------------------
// Metadata

/// An opaque, type-keyed side channel attached to every node.
///
/// Entries are stored by their concrete type, so there is at most one entry
/// per type. Entries are shared (`Arc`), which keeps cloning cheap when the
/// mapper propagates a source node's metadata to the target node it inserts.
///
/// # Example
///
/// ```
/// use ar_node::Metadata;
///
/// struct Declaring(&'static str);
///
/// let meta = Metadata::new().with(Declaring("Person"));
/// assert_eq!(meta.get::<Declaring>().map(|d| d.0), Some("Person"));
/// assert!(!meta.contains::<u32>());
///
/// let copy = meta.clone().with(7_u32);
/// assert_eq!(copy.len(), 2);
/// assert_eq!(meta.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Metadata {
    entries: TypeIdMap<Arc<dyn Any + Send + Sync>>,
}

impl Metadata {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: TypeIdMap::new(),
        }
    }

    /// Adds an entry, replacing an existing entry of the same type.
    #[inline]
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    #[inline]
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(value));
    }

    #[inline]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| (**entry).downcast_ref::<T>())
    }

    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains(&TypeId::of::<T>())
    }

    #[inline]
    pub fn remove<T: Any>(&mut self) -> bool {
        self.entries.remove(&TypeId::of::<T>()).is_some()
    }

    /// Copies every entry of `other` into `self`; entries of `other` win.
    pub fn extend_from(&mut self, other: &Metadata) {
        for (id, entry) in other.entries.iter() {
            self.entries.insert(*id, Arc::clone(entry));
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("len", &self.entries.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Attribute

/// Marks a node as attribute-equivalent (an XML attribute, a header cell).
///
/// The object adapter applies the attribute policy instead of the element
/// policy to unmatched nodes carrying this marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attribute;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Attribute, Metadata};

    #[test]
    fn later_entries_replace_earlier() {
        let mut meta = Metadata::new().with(1_u8);
        meta.insert(2_u8);
        assert_eq!(meta.get::<u8>(), Some(&2));
        assert_eq!(meta.len(), 1);
        assert!(meta.remove::<u8>());
        assert!(meta.is_empty());
    }

    #[test]
    fn extend_prefers_other() {
        let mut target = Metadata::new().with(1_u8).with(Attribute);
        let source = Metadata::new().with(5_u8).with("name");
        target.extend_from(&source);
        assert_eq!(target.get::<u8>(), Some(&5));
        assert_eq!(target.get::<&str>(), Some(&"name"));
        assert!(target.contains::<Attribute>());
    }
}
