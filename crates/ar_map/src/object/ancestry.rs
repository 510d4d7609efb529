use core::any::TypeId;

use ar_reflect::Reflect;

/// Where a value lives and what it is.
///
/// The type is part of the identity because a struct and its first field
/// share an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Identity {
    address: usize,
    type_id: TypeId,
}

impl Identity {
    pub fn of(value: &dyn Reflect) -> Self {
        Self {
            address: core::ptr::from_ref(value).cast::<()>().addr(),
            type_id: value.as_any().type_id(),
        }
    }
}

/// The identities of the container values from the root to a node.
#[derive(Debug, Clone, Default)]
pub(crate) struct Ancestry {
    path: Vec<Identity>,
}

impl Ancestry {
    #[inline]
    pub fn contains(&self, identity: Identity) -> bool {
        self.path.contains(&identity)
    }

    /// The ancestry of a child of the node owning `self`.
    pub fn with(&self, identity: Identity) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(identity);
        Self { path }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Ancestry, Identity};

    #[test]
    fn identity_tells_an_array_from_its_first_item() {
        let items = [7_u32, 8];
        let whole = Identity::of(&items);
        let first = Identity::of(&items[0]);
        assert_ne!(whole, first);
        assert_eq!(first, Identity::of(&items[0]));

        let ancestry = Ancestry::default().with(whole);
        assert!(ancestry.contains(Identity::of(&items)));
        assert!(!ancestry.contains(first));
        assert_eq!(ancestry.with(first).depth(), 2);
    }
}
