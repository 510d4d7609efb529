use std::sync::Arc;

use ar_reflect::{CachedMember, CachedType};

/// The types behind an object-backed node, attached to its metadata.
///
/// `specified` is the declared type of the member or element, `actual` the
/// type that was mapped. They differ for dynamic members and after wrappers
/// are looked through: a member declared `Option<Arc<Tag>>` has `Tag` as its
/// actual type.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub specified: Arc<CachedType>,
    pub actual: Arc<CachedType>,
}

/// The member behind an object-backed node, attached to its metadata.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub member: Arc<CachedMember>,
    pub declaring: Arc<CachedType>,
}
