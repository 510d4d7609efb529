//! The object adapter: live values presented as nodes.
//!
//! [`ObjectReader`] walks an existing value for serialization,
//! [`ObjectWriter`] builds a new one during deserialization. Both attach an
//! [`ObjectType`] to every node's metadata, and a [`MemberInfo`] to nodes
//! that stand for a member.

mod ancestry;
mod meta;
mod reader;
mod writer;

pub use meta::{MemberInfo, ObjectType};
pub use reader::ObjectReader;
pub use writer::ObjectWriter;

use ar_reflect::{CachedType, TypeKind};

use crate::Options;

/// Format name reported by object nodes.
pub(crate) const FORMAT: &str = "object";

/// The kind of `ty` once the options' treat-as-object flags are applied.
pub(crate) fn kind_of(ty: &CachedType, options: &Options) -> TypeKind {
    ty.effective_kind(
        options.treat_enumerable_impls_as_objects,
        options.treat_dictionary_impls_as_objects,
    )
}
