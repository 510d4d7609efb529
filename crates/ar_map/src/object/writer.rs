use core::any::Any;
use core::fmt::Display;
use std::sync::Arc;

use ar_node::{Attribute, Configure, Error, Metadata, Node, NodePath, NodeType, Result, Value};
use ar_reflect::{CachedMember, CachedType, Constructor, CtorParam, Reflect, ScalarFamily, TypeKind, Typed};

use super::meta::{MemberInfo, ObjectType};
use super::{FORMAT, kind_of};
use crate::{Options, Unmatched};

// -----------------------------------------------------------------------------
// Target

/// What the writer builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// A type with a registered custom reader.
    Custom,
    Scalar,
    /// A nullable non-scalar fed by a Value node: only null is accepted.
    NullOnly,
    Complex,
    Sequence,
    Dictionary,
}

impl Target {
    const fn node_type(self) -> NodeType {
        match self {
            Target::Custom | Target::Scalar | Target::NullOnly => NodeType::Value,
            Target::Complex | Target::Dictionary => NodeType::Object,
            Target::Sequence => NodeType::Array,
        }
    }
}

type Pending = Vec<(Arc<CachedMember>, Box<dyn Reflect>)>;

enum State {
    Unset,
    Null,
    /// A value of the unwrapped type.
    Ready(Box<dyn Reflect>),
    /// A value of the declared type, handed over through `set_object`.
    Assigned(Box<dyn Reflect>),
    Object {
        instance: Option<Box<dyn Reflect>>,
        /// Members mapped before a deferred constructor could run.
        pending: Pending,
        deferred: Option<Constructor>,
    },
    Items(Vec<Box<dyn Reflect>>),
    Entries(Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>),
}

// -----------------------------------------------------------------------------
// ObjectWriter

/// The write side of the object adapter: builds a value from the nodes
/// mapped into it.
///
/// The writer looks through the wrappers of its declared type and builds
/// the type inside, then wraps the result again in [`finish`]. Null
/// becomes the empty state of the outermost nullable wrapper.
///
/// Complex types are instantiated in [`initialize`](Node::initialize)
/// through their zero-argument constructor. A type with a single
/// parameterized constructor is built as soon as every parameter has a
/// matching sibling, and [`validate`](Node::validate) fails if one never
/// arrived. Members mapped before that are applied right after
/// construction.
///
/// [`finish`]: ObjectWriter::finish
///
/// # Example
///
/// ```
/// use ar_map::{ObjectWriter, Options};
/// use ar_node::{Metadata, Node, NodeType, Value};
///
/// let options = Options::default();
/// let mut writer = ObjectWriter::new::<Vec<Option<u8>>>(&options);
/// assert_eq!(writer.node_type(), NodeType::Array);
///
/// for value in [Value::from(1), Value::Null] {
///     writer
///         .add(NodeType::Value, &Metadata::new(), &mut |item: &mut dyn Node| {
///             item.set_value(value.clone())
///         })
///         .unwrap();
/// }
/// assert_eq!(writer.into_value::<Vec<Option<u8>>>().unwrap(), [Some(1), None]);
/// ```
pub struct ObjectWriter<'o> {
    options: &'o Options,
    path: NodePath,
    name: Option<String>,
    metadata: Metadata,
    specified: Arc<CachedType>,
    /// Wrapper types around `ty`, outermost first.
    wrappers: Vec<Arc<CachedType>>,
    ty: Arc<CachedType>,
    target: Target,
    state: State,
}

impl<'o> ObjectWriter<'o> {
    /// A root writer building a `T`, shaped after `T`.
    pub fn new<T: Typed>(options: &'o Options) -> Self {
        Self::create(
            options,
            NodePath::root(),
            None,
            Metadata::new(),
            ar_reflect::resolve::<T>(),
            None,
        )
    }

    /// A root writer building a `T` from a source root of shape `source`.
    ///
    /// Only matters for nullable non-scalars: fed by a Value node, they
    /// present as a Value node accepting null.
    pub fn for_source<T: Typed>(options: &'o Options, source: NodeType) -> Self {
        Self::create(
            options,
            NodePath::root(),
            None,
            Metadata::new(),
            ar_reflect::resolve::<T>(),
            Some(source),
        )
    }

    fn create(
        options: &'o Options,
        path: NodePath,
        name: Option<String>,
        mut metadata: Metadata,
        specified: Arc<CachedType>,
        requested: Option<NodeType>,
    ) -> Self {
        let mut wrappers = Vec::new();
        let mut ty = Arc::clone(&specified);
        while let Some(inner) = ty.underlying() {
            wrappers.push(ty);
            ty = inner;
        }
        let nullable = wrappers.iter().any(|wrapper| wrapper.is_nullable());

        let target = match kind_of(&ty, options) {
            _ if options.has_reader(ty.id()) => Target::Custom,
            TypeKind::Scalar => Target::Scalar,
            _ if nullable && requested == Some(NodeType::Value) => Target::NullOnly,
            TypeKind::Complex => Target::Complex,
            TypeKind::Enumerable | TypeKind::Array => Target::Sequence,
            TypeKind::Dictionary => Target::Dictionary,
        };
        let state = match target {
            Target::Complex => State::Object {
                instance: None,
                pending: Vec::new(),
                deferred: None,
            },
            Target::Sequence => State::Items(Vec::new()),
            Target::Dictionary => State::Entries(Vec::new()),
            Target::Custom | Target::Scalar | Target::NullOnly => State::Unset,
        };

        metadata.insert(ObjectType {
            specified: Arc::clone(&specified),
            actual: Arc::clone(&ty),
        });

        Self {
            options,
            path,
            name,
            metadata,
            specified,
            wrappers,
            ty,
            target,
            state,
        }
    }

    fn child(
        &self,
        path: NodePath,
        name: Option<&str>,
        metadata: &Metadata,
        specified: Arc<CachedType>,
        requested: NodeType,
    ) -> ObjectWriter<'o> {
        Self::create(
            self.options,
            path,
            name.map(str::to_owned),
            metadata.clone(),
            specified,
            Some(requested),
        )
    }

    /// The type being built, wrappers looked through.
    #[inline]
    pub fn cached_type(&self) -> &Arc<CachedType> {
        &self.ty
    }

    /// Consumes the writer, returning a value of the declared type.
    ///
    /// `None` when nothing was mapped into it.
    pub fn finish(self) -> Result<Option<Box<dyn Reflect>>> {
        let Self {
            path,
            ty,
            wrappers,
            state,
            ..
        } = self;

        let inner = match state {
            State::Unset => return Ok(None),
            State::Assigned(value) => return Ok(Some(value)),
            State::Null => return wrap_null(&path, &ty, &wrappers).map(Some),
            State::Ready(value) => value,
            State::Object {
                instance: Some(instance),
                ..
            } => instance,
            State::Object { pending, .. } if pending.is_empty() => return Ok(None),
            State::Object { .. } => {
                return Err(construction_error(&path, &ty, "constructor arguments are incomplete"));
            }
            State::Items(items) => {
                let sequence = ty
                    .sequence()
                    .ok_or_else(|| construction_error(&path, &ty, "not a sequence"))?;
                sequence
                    .build(items)
                    .map_err(|err| construction_error(&path, &ty, err))?
            }
            State::Entries(entries) => {
                let dictionary = ty
                    .dictionary()
                    .ok_or_else(|| construction_error(&path, &ty, "not a dictionary"))?;
                dictionary
                    .build(entries)
                    .map_err(|err| construction_error(&path, &ty, err))?
            }
        };
        wrap(&path, &wrappers, inner).map(Some)
    }

    /// Consumes the writer, returning the built `T`.
    ///
    /// When nothing was mapped, falls back to `T`'s zero-argument
    /// constructor.
    pub fn into_value<T: Typed>(self) -> Result<T> {
        let path = self.path.clone();
        let specified = Arc::clone(&self.specified);
        let value = match self.finish()? {
            Some(value) => value,
            None => specified
                .construct_default()
                .ok_or_else(|| construction_error(&path, &specified, "nothing was mapped"))?
                .map_err(|err| construction_error(&path, &specified, err))?,
        };
        value.take::<T>().map_err(|value| {
            construction_error(
                &path,
                &specified,
                format_args!("built a `{}` instead", (*value).type_path()),
            )
        })
    }

    fn is_nullable(&self) -> bool {
        self.wrappers.iter().any(|wrapper| wrapper.is_nullable())
    }

    /// Empty input for a scalar that has no empty text form.
    fn is_blank(&self, value: &Value) -> bool {
        value.is_empty()
            && self
                .ty
                .scalar()
                .is_some_and(|ops| ops.family() != ScalarFamily::Text)
    }

    fn parse_error(&self, value: &Value, reason: impl Display) -> Error {
        parse_error(self.options, &self.path, self.name.as_deref(), &self.ty, value, reason)
    }

    fn set_scalar(&mut self, value: Value) -> Result<()> {
        let Some(ops) = self.ty.scalar() else {
            return Err(Error::value_not_supported(&self.path, FORMAT, NodeType::Value));
        };
        let empty = value.is_null() || (value.is_empty() && ops.family() != ScalarFamily::Text);
        if empty
            && self.options.default_empty_values
            && let Some(default) = self.ty.construct_default()
        {
            let default = default.map_err(|err| construction_error(&self.path, &self.ty, err))?;
            self.state = State::Ready(default);
            return Ok(());
        }

        let parsed = ops
            .from_value(value.clone())
            .map_err(|err| self.parse_error(&value, err.reason))?;
        self.state = State::Ready(parsed);
        Ok(())
    }

    fn set_custom(&mut self, value: Value) -> Result<()> {
        let options = self.options;
        let Some(read) = options.reader(self.ty.id()) else {
            return self.set_scalar(value);
        };
        let parsed = read(&value, &*self).map_err(|cause| Error::Convention {
            path: self.path.clone(),
            message: format!("custom reader for `{}` failed", self.ty.name()),
            cause,
        })?;
        self.state = State::Ready(parsed);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Members

    fn names_match(&self, member_name: &str, node_name: &str) -> bool {
        if self.options.case_sensitive {
            member_name == node_name
        } else {
            eq_ignore_case(member_name, node_name)
        }
    }

    /// Finds the member a child named `name` maps to.
    ///
    /// Read-only members only count when a deferred constructor takes them.
    fn find_member(&self, name: &str) -> Option<Arc<CachedMember>> {
        let params: &[CtorParam] = match &self.state {
            State::Object {
                deferred: Some(ctor),
                ..
            } => ctor.params(),
            _ => &[],
        };
        let naming = &self.options.naming;
        self.ty
            .members()
            .iter()
            .filter(|member| member.is_public() || self.options.include_non_public)
            .filter(|member| {
                member.is_writable() || params.iter().any(|param| takes(param, member, naming))
            })
            .find(|member| self.names_match(&naming.apply(member), name))
            .cloned()
    }

    fn add_member(
        &mut self,
        name: &str,
        node_type: NodeType,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()> {
        let Some(member) = self.find_member(name) else {
            return self.unmatched(name, metadata);
        };

        let mut child = self.child(
            self.path.child(name),
            Some(name),
            metadata,
            member.ty().resolve(),
            node_type,
        );
        child.metadata.insert(MemberInfo {
            member: Arc::clone(&member),
            declaring: Arc::clone(&self.ty),
        });
        configure(&mut child)?;

        match child.finish()? {
            Some(value) => self.assign(member, value),
            None => Ok(()),
        }
    }

    fn unmatched(&self, name: &str, metadata: &Metadata) -> Result<()> {
        let policy = if metadata.contains::<Attribute>() {
            self.options.unmatched_attributes
        } else {
            self.options.unmatched_elements
        };
        match policy {
            Unmatched::Ignore => {
                log::debug!("{}: ignoring `{name}`, no member of `{}` matches", self.path, self.ty.name());
                Ok(())
            }
            Unmatched::Fail => Err(Error::UnrecognizedNode {
                path: self.path.child(name),
                name: name.to_owned(),
                type_name: self.ty.name().to_owned(),
            }),
        }
    }

    fn assign(&mut self, member: Arc<CachedMember>, value: Box<dyn Reflect>) -> Result<()> {
        if matches!(
            self.state,
            State::Object {
                instance: None,
                deferred: None,
                ..
            }
        ) {
            self.initialize()?;
        }

        match &mut self.state {
            State::Object {
                instance: Some(instance),
                ..
            } => member
                .set(&mut **instance, value)
                .map_err(|err| construction_error(&self.path, &self.ty, err)),
            State::Object { pending, .. } => {
                pending.push((member, value));
                self.construct(false)
            }
            _ => Err(construction_error(&self.path, &self.ty, "members can only be set on objects")),
        }
    }

    /// Runs the deferred constructor once every parameter has a value.
    ///
    /// With `required`, a missing parameter is an error.
    fn construct(&mut self, required: bool) -> Result<()> {
        let State::Object {
            instance,
            pending,
            deferred,
        } = &mut self.state
        else {
            return Ok(());
        };
        let Some(ctor) = deferred.as_ref() else {
            return Ok(());
        };
        if instance.is_some() {
            return Ok(());
        }

        let naming = &self.options.naming;
        let missing = ctor
            .params()
            .iter()
            .find(|param| !pending.iter().any(|(member, _)| takes(param, member, naming)));
        if let Some(param) = missing {
            if required {
                return Err(construction_error(
                    &self.path,
                    &self.ty,
                    format_args!("no value for constructor parameter `{}`", param.name()),
                ));
            }
            return Ok(());
        }

        let mut args = Vec::with_capacity(ctor.params().len());
        for param in ctor.params() {
            let Some(position) = pending.iter().position(|(member, _)| takes(param, member, naming)) else {
                return Err(construction_error(
                    &self.path,
                    &self.ty,
                    format_args!("constructor parameter `{}` reuses a member", param.name()),
                ));
            };
            args.push(pending.remove(position).1);
        }

        let mut built = ctor
            .invoke(self.ty.name(), args)
            .map_err(|err| construction_error(&self.path, &self.ty, err))?;
        for (member, value) in pending.drain(..) {
            member
                .set(&mut *built, value)
                .map_err(|err| construction_error(&self.path, &self.ty, err))?;
        }
        log::trace!("{}: constructed `{}`", self.path, self.ty.name());
        *instance = Some(built);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Collections

    fn add_item(&mut self, node_type: NodeType, metadata: &Metadata, configure: Configure<'_>) -> Result<()> {
        let Some(sequence) = self.ty.sequence() else {
            return Err(Error::unnamed_children_not_supported(&self.path, FORMAT));
        };
        let index = match &self.state {
            State::Items(items) => items.len(),
            _ => 0,
        };

        let mut child = self.child(
            self.path.index(index),
            None,
            metadata,
            sequence.element().resolve(),
            node_type,
        );
        configure(&mut child)?;

        if let Some(item) = child.finish()?
            && let State::Items(items) = &mut self.state
        {
            items.push(item);
        }
        Ok(())
    }

    fn add_entry(
        &mut self,
        name: &str,
        node_type: NodeType,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()> {
        let Some(dictionary) = self.ty.dictionary() else {
            return Err(Error::children_not_supported(&self.path, FORMAT));
        };
        let path = self.path.child(name);
        let key_ty = dictionary.key().resolve();
        let key_ops = key_ty
            .scalar()
            .ok_or_else(|| construction_error(&self.path, &self.ty, "dictionary keys must be scalars"))?;
        let text = Value::String(name.to_owned());
        let key = key_ops
            .from_value(text.clone())
            .map_err(|err| parse_error(self.options, &path, Some(name), &key_ty, &text, err.reason))?;

        let mut child = self.child(path, Some(name), metadata, dictionary.value().resolve(), node_type);
        configure(&mut child)?;

        if let Some(value) = child.finish()?
            && let State::Entries(entries) = &mut self.state
        {
            entries.push((key, value));
        }
        Ok(())
    }
}

impl Node for ObjectWriter<'_> {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn node_type(&self) -> NodeType {
        self.target.node_type()
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

    /// The scalar assigned so far; null before assignment.
    fn value(&self) -> Result<Value> {
        if self.node_type() != NodeType::Value {
            return Err(Error::value_not_supported(&self.path, FORMAT, self.node_type()));
        }
        Ok(match &self.state {
            State::Ready(value) => self
                .ty
                .scalar()
                .and_then(|ops| ops.to_value(&**value))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        })
    }

    fn set_value(&mut self, value: Value) -> Result<()> {
        if self.node_type() != NodeType::Value {
            return Err(Error::value_not_supported(&self.path, FORMAT, self.node_type()));
        }
        if self.is_nullable() && (value.is_null() || self.is_blank(&value)) {
            self.state = State::Null;
            return Ok(());
        }
        match self.target {
            Target::Custom => self.set_custom(value),
            Target::NullOnly => Err(self.parse_error(&value, "only null can be assigned here")),
            _ => self.set_scalar(value),
        }
    }

    fn children(&self) -> Result<Vec<Box<dyn Node + '_>>> {
        match self.node_type() {
            NodeType::Value => Err(Error::children_not_supported(&self.path, FORMAT)),
            _ => Ok(Vec::new()),
        }
    }

    fn add(&mut self, node_type: NodeType, metadata: &Metadata, configure: Configure<'_>) -> Result<()> {
        match self.target {
            Target::Sequence => self.add_item(node_type, metadata, configure),
            Target::Complex | Target::Dictionary => {
                Err(Error::unnamed_children_not_supported(&self.path, FORMAT))
            }
            Target::Custom | Target::Scalar | Target::NullOnly => {
                Err(Error::children_not_supported(&self.path, FORMAT))
            }
        }
    }

    fn add_named(
        &mut self,
        name: &str,
        node_type: NodeType,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()> {
        match self.target {
            Target::Complex => self.add_member(name, node_type, metadata, configure),
            Target::Dictionary => self.add_entry(name, node_type, metadata, configure),
            Target::Sequence => Err(Error::naming_not_supported(&self.path, FORMAT, NodeType::Array)),
            Target::Custom | Target::Scalar | Target::NullOnly => {
                Err(Error::children_not_supported(&self.path, FORMAT))
            }
        }
    }

    fn object(&self) -> Option<&dyn Any> {
        match &self.state {
            State::Ready(value)
            | State::Assigned(value)
            | State::Object {
                instance: Some(value),
                ..
            } => Some((**value).as_any()),
            _ => None,
        }
    }

    /// Accepts a value of the declared type or of the type inside its
    /// wrappers.
    fn set_object(&mut self, value: Box<dyn Any + Send>) -> Result<()> {
        let value = match self.specified.from_any(value) {
            Ok(value) => {
                self.state = State::Assigned(value);
                return Ok(());
            }
            Err(value) => value,
        };
        let value = self
            .ty
            .from_any(value)
            .map_err(|_| construction_error(&self.path, &self.ty, "the value has another type"))?;
        self.state = match self.target {
            Target::Complex => State::Object {
                instance: Some(value),
                pending: Vec::new(),
                deferred: None,
            },
            _ => State::Ready(value),
        };
        Ok(())
    }

    /// Instantiates complex types that have a zero-argument constructor, or
    /// prepares the deferred one.
    fn initialize(&mut self) -> Result<()> {
        let State::Object {
            instance, deferred, ..
        } = &mut self.state
        else {
            return Ok(());
        };
        if instance.is_some() || deferred.is_some() {
            return Ok(());
        }

        if let Some(built) = self.ty.construct_default() {
            *instance = Some(built.map_err(|err| construction_error(&self.path, &self.ty, err))?);
            return Ok(());
        }
        match self.ty.constructors() {
            [ctor] => {
                *deferred = Some(ctor.clone());
                Ok(())
            }
            [] => Err(construction_error(&self.path, &self.ty, "it has no constructor")),
            _ => Err(construction_error(
                &self.path,
                &self.ty,
                "it has no zero-argument constructor and several parameterized ones",
            )),
        }
    }

    fn validate(&mut self) -> Result<()> {
        self.construct(true)
    }
}

// -----------------------------------------------------------------------------
// Helpers

/// `true` when `param` takes the value of `member`: the types are equal and
/// the names match case-insensitively.
fn takes(param: &CtorParam, member: &CachedMember, naming: &crate::NamingConventions) -> bool {
    param.ty().id() == member.ty().id()
        && (eq_ignore_case(param.name(), member.name())
            || eq_ignore_case(param.name(), &naming.apply(member)))
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

fn construction_error(path: &NodePath, ty: &CachedType, reason: impl Display) -> Error {
    Error::ObjectConstruction {
        path: path.clone(),
        type_name: ty.name().to_owned(),
        reason: reason.to_string(),
    }
}

fn parse_error(
    options: &Options,
    path: &NodePath,
    name: Option<&str>,
    ty: &CachedType,
    value: &Value,
    reason: impl Display,
) -> Error {
    let name = match name {
        Some(name) => name.to_owned(),
        None => path.to_string(),
    };
    Error::ValueParse {
        path: path.clone(),
        value: value.to_string(),
        type_name: ty.name().to_owned(),
        reason: reason.to_string(),
        friendly: Some(options.render_friendly(ty, value, &name)),
    }
}

fn wrap(path: &NodePath, wrappers: &[Arc<CachedType>], inner: Box<dyn Reflect>) -> Result<Box<dyn Reflect>> {
    let mut value = inner;
    for ty in wrappers.iter().rev() {
        if let Some(wrapper) = ty.wrapper() {
            value = wrapper
                .wrap(value)
                .map_err(|err| construction_error(path, ty, err))?;
        }
    }
    Ok(value)
}

/// The empty state of the outermost nullable wrapper, wrapped by the
/// wrappers around it.
fn wrap_null(path: &NodePath, ty: &CachedType, wrappers: &[Arc<CachedType>]) -> Result<Box<dyn Reflect>> {
    let empty = wrappers.iter().enumerate().find_map(|(position, wrapper)| {
        let info = wrapper.wrapper().filter(|info| info.is_nullable())?;
        Some((position, info.empty()?))
    });
    let Some((position, empty)) = empty else {
        return Err(construction_error(path, ty, "null is not allowed"));
    };
    wrap(path, &wrappers[..position], empty)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use ar_node::{Attribute, Error, Metadata, Node, NodeType, Value};
    use ar_reflect::Optional;
    use ar_reflect::derive::Reflect;

    use super::ObjectWriter;
    use crate::{Options, Unmatched};

    fn set(writer: &mut ObjectWriter<'_>, name: &str, value: impl Into<Value>) -> ar_node::Result<()> {
        let value = value.into();
        writer.add_named(name, NodeType::Value, &Metadata::new(), &mut |node: &mut dyn Node| {
            node.set_value(value.clone())
        })
    }

    #[derive(Reflect, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Settings {
        pub retries: u8,
        pub label: Option<Arc<String>>,
        pub note: Optional<Option<String>>,
        #[reflect(read_only)]
        pub version: u32,
    }

    #[test]
    fn default_constructed_objects() {
        let options = Options::default();
        let mut writer = ObjectWriter::new::<Settings>(&options);
        writer.initialize().unwrap();
        set(&mut writer, "RETRIES", 3).unwrap();
        set(&mut writer, "label", "main").unwrap();
        set(&mut writer, "note", Value::Null).unwrap();
        writer.validate().unwrap();

        let settings = writer.into_value::<Settings>().unwrap();
        assert_eq!(settings.retries, 3);
        assert_eq!(settings.label.as_deref().map(String::as_str), Some("main"));
        assert_eq!(settings.note, Optional::Present(None));
    }

    #[test]
    fn read_only_and_unknown_members() {
        let mut options = Options::default();
        let mut writer = ObjectWriter::new::<Settings>(&options);
        writer.initialize().unwrap();
        let err = set(&mut writer, "version", 2).unwrap_err();
        assert_eq!(err.to_string(), "/version: `version` does not match any member of `Settings`");

        let attribute = Metadata::new().with(Attribute);
        let ignored = writer.add_named("xmlns", NodeType::Value, &attribute, &mut |_: &mut dyn Node| {
            panic!("ignored nodes are not configured")
        });
        assert!(ignored.is_ok());

        options.unmatched_elements = Unmatched::Ignore;
        let mut writer = ObjectWriter::new::<Settings>(&options);
        writer.initialize().unwrap();
        assert!(set(&mut writer, "version", 2).is_ok());
        assert_eq!(writer.into_value::<Settings>().unwrap().version, 0);
    }

    #[test]
    fn case_sensitive_names() {
        let options = Options {
            case_sensitive: true,
            ..Options::default()
        };
        let mut writer = ObjectWriter::new::<Settings>(&options);
        writer.initialize().unwrap();
        assert!(matches!(
            set(&mut writer, "Retries", 1),
            Err(Error::UnrecognizedNode { .. })
        ));
        assert!(set(&mut writer, "retries", 1).is_ok());
    }

    #[test]
    fn parse_failures_are_friendly() {
        let mut options = Options::default();
        let mut writer = ObjectWriter::new::<Settings>(&options);
        writer.initialize().unwrap();
        let err = set(&mut writer, "retries", "many").unwrap_err();
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("/retries"));
        assert_eq!(err.friendly_message(), "'retries' must be a whole number but was 'many'.");

        options.friendly_message::<u8>("Pick a smaller {name}.");
        let mut writer = ObjectWriter::new::<Settings>(&options);
        writer.initialize().unwrap();
        let err = set(&mut writer, "retries", 300).unwrap_err();
        assert_eq!(err.friendly_message(), "Pick a smaller retries.");
    }

    #[test]
    fn empty_values() {
        let mut options = Options::default();
        let mut writer = ObjectWriter::new::<Settings>(&options);
        writer.initialize().unwrap();
        assert!(set(&mut writer, "retries", "").is_err());
        assert!(set(&mut writer, "retries", Value::Null).is_err());

        options.default_empty_values = true;
        let mut writer = ObjectWriter::new::<Settings>(&options);
        writer.initialize().unwrap();
        set(&mut writer, "retries", "").unwrap();
        assert_eq!(writer.into_value::<Settings>().unwrap().retries, 0);
    }

    #[test]
    fn blank_input_clears_nullable_scalars() {
        #[derive(Reflect, Debug, Default, PartialEq)]
        #[reflect(default)]
        struct Limits {
            pub max: Option<u32>,
            pub name: Option<String>,
        }

        let options = Options::default();
        let mut writer = ObjectWriter::new::<Limits>(&options);
        writer.initialize().unwrap();
        set(&mut writer, "max", "").unwrap();
        set(&mut writer, "name", "").unwrap();

        let limits = writer.into_value::<Limits>().unwrap();
        assert_eq!(limits.max, None);
        assert_eq!(limits.name.as_deref(), Some(""));
    }

    #[derive(Reflect, Debug, PartialEq)]
    #[reflect(constructor(new, id, kind))]
    struct Ticket {
        #[reflect(read_only)]
        pub id: u64,
        #[reflect(read_only)]
        pub kind: String,
        pub title: String,
    }

    impl Ticket {
        fn new(id: u64, kind: String) -> Self {
            Self {
                id,
                kind,
                title: String::new(),
            }
        }
    }

    #[test]
    fn deferred_construction_waits_for_parameters() {
        let options = Options::default();
        let mut writer = ObjectWriter::new::<Ticket>(&options);
        writer.initialize().unwrap();
        set(&mut writer, "title", "Broken build").unwrap();
        set(&mut writer, "ID", 7).unwrap();
        assert!(writer.object().is_none());
        set(&mut writer, "kind", "bug").unwrap();
        assert!(writer.object().is_some());
        writer.validate().unwrap();

        let ticket = writer.into_value::<Ticket>().unwrap();
        assert_eq!(
            ticket,
            Ticket {
                id: 7,
                kind: "bug".into(),
                title: "Broken build".into()
            }
        );
    }

    #[test]
    fn missing_parameter_fails_validation() {
        let options = Options::default();
        let mut writer = ObjectWriter::new::<Ticket>(&options);
        writer.initialize().unwrap();
        set(&mut writer, "id", 7).unwrap();
        let err = writer.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "/: cannot construct `Ticket`: no value for constructor parameter `kind`"
        );
    }

    #[test]
    fn types_without_constructor_fail() {
        #[derive(Reflect)]
        struct Bare {
            pub x: u8,
        }

        let options = Options::default();
        let mut writer = ObjectWriter::new::<Bare>(&options);
        assert!(matches!(
            writer.initialize(),
            Err(Error::ObjectConstruction { .. })
        ));
    }

    #[test]
    fn dictionaries_parse_keys() {
        let options = Options::default();
        let mut writer = ObjectWriter::new::<HashMap<u16, bool>>(&options);
        assert_eq!(writer.node_type(), NodeType::Object);
        set(&mut writer, "8080", true).unwrap();
        let err = set(&mut writer, "http", true).unwrap_err();
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("/http"));

        let map = writer.into_value::<HashMap<u16, bool>>().unwrap();
        assert_eq!(map.get(&8080), Some(&true));
    }

    #[test]
    fn nullable_objects_accept_null_values() {
        let options = Options::default();
        let mut writer = ObjectWriter::for_source::<Option<Settings>>(&options, NodeType::Value);
        assert_eq!(writer.node_type(), NodeType::Value);
        assert!(writer.set_value(Value::from(1)).is_err());
        writer.set_value(Value::Null).unwrap();
        assert_eq!(writer.into_value::<Option<Settings>>().unwrap(), None);
    }

    #[test]
    fn set_object_takes_declared_or_inner_values() {
        let options = Options::default();
        let mut writer = ObjectWriter::new::<Option<u8>>(&options);
        writer.set_object(Box::new(5_u8)).unwrap();
        assert_eq!(writer.into_value::<Option<u8>>().unwrap(), Some(5));

        let mut writer = ObjectWriter::new::<Option<u8>>(&options);
        writer.set_object(Box::new(None::<u8>)).unwrap();
        assert_eq!(writer.into_value::<Option<u8>>().unwrap(), None);

        let mut writer = ObjectWriter::new::<u8>(&options);
        assert!(writer.set_object(Box::new("five")).is_err());
    }

    #[test]
    fn custom_readers() {
        let mut options = Options::default();
        options.add_reader(|value: &Value, _| {
            let text = value.to_text();
            let (a, b) = text.split_once('x').ok_or("expected WxH")?;
            Ok(vec![a.trim().parse::<u32>()?, b.trim().parse::<u32>()?])
        });

        let mut writer = ObjectWriter::new::<Vec<u32>>(&options);
        assert_eq!(writer.node_type(), NodeType::Value);
        writer.set_value(Value::from("3x4")).unwrap();
        assert_eq!(writer.into_value::<Vec<u32>>().unwrap(), [3, 4]);

        let mut writer = ObjectWriter::new::<Vec<u32>>(&options);
        let err = writer.set_value(Value::from("3by4")).unwrap_err();
        assert!(matches!(err, Error::Convention { .. }));
    }
}
