//! The uniform tree contract shared by object graphs and wire formats.
//!
//! Every format and the object adapter expose their data as [`Node`]s. A node
//! is one of four [`NodeType`]s, carries an optional [`Value`] payload, an
//! opaque [`Metadata`] capsule and its [`NodePath`] from the root.
//!
//! Errors for the whole mapping pipeline live here as [`Error`], because both
//! node implementations and the mapper raise them.

// -----------------------------------------------------------------------------
// Modules

mod error;
mod metadata;
mod node;
mod path;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use error::{BoxError, Error, NodeDescription, Result};
pub use metadata::{Attribute, Metadata};
pub use node::{Configure, Mode, Node, NodeType};
pub use path::{NodePath, PathSegment};
pub use value::Value;
