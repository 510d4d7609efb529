//! Mapping between object graphs and node trees.
//!
//! A mapping always runs between two [`Node`] trees. On the object side,
//! [`ObjectReader`] presents a live value as nodes and [`ObjectWriter`]
//! builds a value from the nodes mapped into it. Format crates supply the
//! other side.
//!
//! [`NodeMapper`] walks the source tree and fills the target, consulting the
//! [`Conventions`] of the direction it runs in. Everything that shapes a
//! mapping lives in [`Options`], which is shared read-only once built.
//!
//! # Example
//!
//! ```
//! use ar_map::{ObjectReader, Options};
//! use ar_reflect::derive::Reflect;
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! #[reflect(default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let options = Options::default();
//! let point = Point { x: 3, y: -1 };
//!
//! let copy: Point = ar_map::deserialize(&ObjectReader::new(&point, &options), &options).unwrap();
//! assert_eq!(copy, point);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod conventions;
mod mapper;
mod naming;
mod object;
mod options;

#[cfg(test)]
mod mock;

// -----------------------------------------------------------------------------
// Exports

pub use conventions::{
    Action, Convention, Conventions, ErrorFactory, MapConventions, Predicate, VisitConventions,
};
pub use mapper::{NodeMapper, is_legal};
pub use naming::{NamingConventions, NamingRule};
pub use object::{MemberInfo, ObjectReader, ObjectType, ObjectWriter};
pub use options::{Options, Unmatched};

use ar_node::{Mode, Node, Result};
use ar_reflect::{Reflect, Typed};

// -----------------------------------------------------------------------------
// Facades

/// Builds a `T` from the tree rooted at `source`.
pub fn deserialize<T: Typed>(source: &dyn Node, options: &Options) -> Result<T> {
    let mut target = ObjectWriter::for_source::<T>(options, source.node_type());
    NodeMapper::new(options, Mode::Deserialize).map(source, &mut target)?;
    target.into_value()
}

/// Writes `value` into the tree rooted at `target`.
pub fn serialize(value: &dyn Reflect, target: &mut dyn Node, options: &Options) -> Result<()> {
    let source = ObjectReader::new(value, options);
    NodeMapper::new(options, Mode::Serialize).map(&source, target)
}

// -----------------------------------------------------------------------------
// Tests
