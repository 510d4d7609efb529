use std::sync::Arc;

use ar_node::{Configure, Error, Metadata, Node, NodePath, NodeType, Result, Value};
use ar_reflect::{CachedType, Reflect, TypeKind, WrapperKind};

use super::ancestry::{Ancestry, Identity};
use super::meta::{MemberInfo, ObjectType};
use super::{FORMAT, kind_of};
use crate::Options;

// -----------------------------------------------------------------------------
// Resolved

/// A value with its wrappers looked through.
struct Resolved<'a> {
    ty: Arc<CachedType>,
    value: Option<&'a dyn Reflect>,
    /// An [`Optional`](ar_reflect::Optional) in the absent state.
    absent: bool,
}

/// Unwraps `value`, declared as `specified`, down to the type to map.
///
/// Dynamic wrappers are only opened when `open_dynamic` is set.
fn look_through<'a>(specified: Arc<CachedType>, value: &'a dyn Reflect, open_dynamic: bool) -> Resolved<'a> {
    let mut ty = specified;
    let mut value = value;
    while let Some(wrapper) = ty.wrapper() {
        if wrapper.kind() == WrapperKind::Dynamic && !open_dynamic {
            break;
        }
        let Some(inner) = wrapper.unwrap(value) else {
            let absent = wrapper.kind() == WrapperKind::Optional;
            return Resolved {
                ty,
                value: None,
                absent,
            };
        };
        let next = match wrapper.inner() {
            Some(inner_ty) => inner_ty.resolve(),
            None => inner.reflect_type(),
        };
        value = inner;
        ty = next;
    }
    Resolved {
        ty,
        value: Some(value),
        absent: false,
    }
}

// -----------------------------------------------------------------------------
// Content

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    Null,
    Custom,
    Scalar,
    Complex,
    Sequence,
    Dictionary,
}

impl Content {
    const fn node_type(self) -> NodeType {
        match self {
            Content::Null | Content::Custom | Content::Scalar => NodeType::Value,
            Content::Complex | Content::Dictionary => NodeType::Object,
            Content::Sequence => NodeType::Array,
        }
    }
}

// -----------------------------------------------------------------------------
// ObjectReader

/// The read side of the object adapter: exposes a value as a node tree.
///
/// Complex values are Object nodes with one child per readable member,
/// sequences are Array nodes and dictionaries are Object nodes keyed by
/// their keys rendered as text. Scalars, nulls and types with a custom
/// writer are Value nodes.
///
/// Wrappers are transparent. Absent [`Optional`](ar_reflect::Optional)
/// members are skipped, and so are null members unless
/// [`Options::include_null_members`] is set.
///
/// A value met again below itself (through `Arc` and `OnceLock`, say) is read
/// as an empty node, which keeps cyclic graphs finite.
///
/// Every write operation fails with [`Error::ReadOnly`].
pub struct ObjectReader<'a> {
    options: &'a Options,
    path: NodePath,
    name: Option<String>,
    metadata: Metadata,
    ancestry: Ancestry,
    ty: Arc<CachedType>,
    value: Option<&'a dyn Reflect>,
    content: Content,
    truncated: bool,
}

impl<'a> ObjectReader<'a> {
    /// A root reader over `value`.
    ///
    /// The root is read as its runtime type, so a boxed `dyn Reflect` is read
    /// as the value inside.
    pub fn new(value: &'a dyn Reflect, options: &'a Options) -> Self {
        let specified = value.reflect_type();
        let resolved = look_through(Arc::clone(&specified), value, true);
        Self::create(
            options,
            NodePath::root(),
            None,
            Metadata::new(),
            specified,
            resolved,
            &Ancestry::default(),
        )
    }

    fn create(
        options: &'a Options,
        path: NodePath,
        name: Option<String>,
        mut metadata: Metadata,
        specified: Arc<CachedType>,
        resolved: Resolved<'a>,
        parent: &Ancestry,
    ) -> Self {
        let Resolved { ty, value, .. } = resolved;

        let content = match value {
            None => Content::Null,
            Some(_) if options.has_writer(ty.id()) => Content::Custom,
            Some(_) => match kind_of(&ty, options) {
                TypeKind::Scalar => Content::Scalar,
                TypeKind::Complex => Content::Complex,
                TypeKind::Dictionary => Content::Dictionary,
                TypeKind::Enumerable | TypeKind::Array => Content::Sequence,
            },
        };

        let mut truncated = false;
        let mut ancestry = Ancestry::default();
        if let Some(value) = value
            && content.node_type() != NodeType::Value
        {
            let identity = Identity::of(value);
            if parent.contains(identity) {
                log::trace!("{path}: `{}` already on the path, reading it as empty", ty.name());
                truncated = true;
            } else {
                ancestry = parent.with(identity);
            }
        }

        let actual = match value {
            Some(value) if ty.wrapper().is_some() => look_through(Arc::clone(&ty), value, true).ty,
            _ => Arc::clone(&ty),
        };
        metadata.insert(ObjectType { specified, actual });

        Self {
            options,
            path,
            name,
            metadata,
            ancestry,
            ty,
            value,
            content,
            truncated,
        }
    }

    /// The value behind the node; `None` when it is null.
    #[inline]
    pub fn get(&self) -> Option<&'a dyn Reflect> {
        self.value
    }

    /// The type the node is read as.
    #[inline]
    pub fn cached_type(&self) -> &Arc<CachedType> {
        &self.ty
    }

    fn child(
        &self,
        path: NodePath,
        name: Option<String>,
        metadata: Metadata,
        specified: Arc<CachedType>,
        resolved: Resolved<'a>,
    ) -> Box<dyn Node + 'a> {
        Box::new(Self::create(
            self.options,
            path,
            name,
            metadata,
            specified,
            resolved,
            &self.ancestry,
        ))
    }

    fn members(&self, instance: &'a dyn Reflect) -> Vec<Box<dyn Node + 'a>> {
        let options = self.options;
        let mut children = Vec::with_capacity(self.ty.members().len());
        for member in self.ty.members() {
            if !member.is_readable() || !(member.is_public() || options.include_non_public) {
                continue;
            }
            let Some(value) = member.get(instance) else {
                continue;
            };
            let specified = member.ty().resolve();
            let resolved = look_through(Arc::clone(&specified), value, options.use_actual_type);
            if resolved.absent || (resolved.value.is_none() && !options.include_null_members) {
                continue;
            }

            let name = options.naming.apply(member);
            let metadata = Metadata::new().with(MemberInfo {
                member: Arc::clone(member),
                declaring: Arc::clone(&self.ty),
            });
            children.push(self.child(self.path.child(&name), Some(name), metadata, specified, resolved));
        }
        children
    }

    fn items(&self, instance: &'a dyn Reflect) -> Vec<Box<dyn Node + 'a>> {
        let Some(sequence) = self.ty.sequence() else {
            return Vec::new();
        };
        let element = sequence.element().resolve();
        sequence
            .items(instance)
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let resolved = look_through(Arc::clone(&element), item, self.options.use_actual_type);
                self.child(
                    self.path.index(index),
                    None,
                    Metadata::new(),
                    Arc::clone(&element),
                    resolved,
                )
            })
            .collect()
    }

    fn entries(&self, instance: &'a dyn Reflect) -> Result<Vec<Box<dyn Node + 'a>>> {
        let Some(dictionary) = self.ty.dictionary() else {
            return Ok(Vec::new());
        };
        let key_ty = dictionary.key().resolve();
        let value_ty = dictionary.value().resolve();

        let mut children = Vec::new();
        for (key, value) in dictionary.entries(instance) {
            let key = key_ty
                .scalar()
                .and_then(|ops| ops.to_value(key))
                .ok_or_else(|| Error::ValueParse {
                    path: self.path.clone(),
                    value: key.type_path().to_owned(),
                    type_name: key_ty.name().to_owned(),
                    reason: "dictionary keys must be scalars".into(),
                    friendly: None,
                })?
                .to_text()
                .into_owned();
            let resolved = look_through(Arc::clone(&value_ty), value, self.options.use_actual_type);
            children.push(self.child(
                self.path.child(&key),
                Some(key),
                Metadata::new(),
                Arc::clone(&value_ty),
                resolved,
            ));
        }
        Ok(children)
    }
}

impl Node for ObjectReader<'_> {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn node_type(&self) -> NodeType {
        self.content.node_type()
    }

    fn path(&self) -> &NodePath {
        &self.path
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn type_name(&self) -> Option<&str> {
        Some(self.ty.name())
    }

    fn name(&self) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| Error::naming_not_supported(&self.path, FORMAT, self.node_type()))
    }

    fn set_name(&mut self, _: &str) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    fn value(&self) -> Result<Value> {
        let not_supported = || Error::value_not_supported(&self.path, FORMAT, self.node_type());
        let Some(value) = self.value else {
            return Ok(Value::Null);
        };
        match self.content {
            Content::Scalar => self
                .ty
                .scalar()
                .and_then(|ops| ops.to_value(value))
                .ok_or_else(not_supported),
            Content::Custom => {
                let write = self.options.writer(self.ty.id()).ok_or_else(not_supported)?;
                write(value, self).map_err(|cause| Error::Convention {
                    path: self.path.clone(),
                    message: format!("custom writer for `{}` failed", self.ty.name()),
                    cause,
                })
            }
            Content::Null => Ok(Value::Null),
            Content::Complex | Content::Sequence | Content::Dictionary => Err(not_supported()),
        }
    }

    fn set_value(&mut self, _: Value) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    fn children(&self) -> Result<Vec<Box<dyn Node + '_>>> {
        let Some(value) = self.value else {
            return Err(Error::children_not_supported(&self.path, FORMAT));
        };
        if self.truncated {
            return Ok(Vec::new());
        }
        match self.content {
            Content::Complex => Ok(self.members(value)),
            Content::Sequence => Ok(self.items(value)),
            Content::Dictionary => self.entries(value),
            Content::Null | Content::Custom | Content::Scalar => {
                Err(Error::children_not_supported(&self.path, FORMAT))
            }
        }
    }

    fn add(&mut self, _: NodeType, _: &Metadata, _: Configure<'_>) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    fn add_named(&mut self, _: &str, _: NodeType, _: &Metadata, _: Configure<'_>) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    fn object(&self) -> Option<&dyn core::any::Any> {
        self.value.map(|value| value.as_any())
    }
}

// -----------------------------------------------------------------------------
// Tests
