//! Format collaborators: wire formats presented as node trees.
//!
//! Each module pairs a reader node over parsed input with a writer node
//! producing output, plus facades that run the whole mapping:
//!
//! - [`json`]: JSON documents through `serde_json`;
//! - [`form`]: `application/x-www-form-urlencoded` bodies through `url`.

pub mod form;
pub mod json;

pub use form::{FormNode, FormTree, FormWriter};
pub use json::{JsonNode, JsonWriter};
