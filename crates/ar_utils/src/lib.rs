//! Small shared containers for the `arbor` crates.
//!
//! - [`hash`]: fixed-seed hashing and the map alias built on it.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId), used by the
//!   metadata capsule, the type cache and the mapping options.

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
