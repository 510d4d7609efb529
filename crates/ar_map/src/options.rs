use core::any::{TypeId, type_name};
use core::fmt;

use ar_node::{BoxError, Mode, Node, Value};
use ar_reflect::{CachedType, Reflect, ScalarFamily, Typed};
use ar_utils::TypeIdMap;

use crate::{Conventions, NamingConventions};

/// Parses a scalar payload into a value, replacing the type's own scalar
/// conversion.
pub(crate) type ReadFn =
    dyn Fn(&Value, &dyn Node) -> Result<Box<dyn Reflect>, BoxError> + Send + Sync;

/// Renders a value as a scalar payload, replacing the type's own conversion.
pub(crate) type WriteFn = dyn Fn(&dyn Reflect, &dyn Node) -> Result<Value, BoxError> + Send + Sync;

// -----------------------------------------------------------------------------
// Unmatched

/// What to do with a named source node that matches no member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Unmatched {
    /// Raise [`Error::UnrecognizedNode`](ar_node::Error::UnrecognizedNode).
    #[default]
    Fail,
    /// Skip the node and its subtree.
    Ignore,
}

// -----------------------------------------------------------------------------
// Options

/// Configuration of a mapping run.
///
/// Built once, then shared by reference. `Options` is `Send + Sync`, so one
/// instance can serve concurrent runs.
///
/// # Example
///
/// ```
/// use ar_map::{Options, Unmatched};
/// use ar_reflect::Case;
///
/// let mut options = Options {
///     case_sensitive: true,
///     unmatched_elements: Unmatched::Ignore,
///     ..Options::default()
/// };
/// options.naming.use_case(Case::Camel);
/// options.friendly_message::<u8>("'{name}' must be between 0 and 255.");
/// ```
pub struct Options {
    /// Compare node names with member names exactly. Off by default.
    pub case_sensitive: bool,
    /// Policy for unmatched nodes. Defaults to [`Unmatched::Fail`].
    pub unmatched_elements: Unmatched,
    /// Policy for unmatched nodes carrying the
    /// [`Attribute`](ar_node::Attribute) marker. Defaults to
    /// [`Unmatched::Ignore`].
    pub unmatched_attributes: Unmatched,
    /// Assign the type's default to non-nullable scalars fed an empty value.
    pub default_empty_values: bool,
    /// Serialize dynamic members by their runtime type.
    pub use_actual_type: bool,
    /// Map members without `pub`. On by default.
    pub include_non_public: bool,
    /// Emit null members while serializing.
    pub include_null_members: bool,
    /// Map sequences that declare members as objects.
    pub treat_enumerable_impls_as_objects: bool,
    /// Map dictionaries that declare members as objects.
    pub treat_dictionary_impls_as_objects: bool,
    /// Rules naming members without a declared name.
    pub naming: NamingConventions,
    pub serialization: Conventions,
    pub deserialization: Conventions,
    pub(crate) readers: TypeIdMap<Box<ReadFn>>,
    pub(crate) writers: TypeIdMap<Box<WriteFn>>,
    pub(crate) friendly_messages: TypeIdMap<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            unmatched_elements: Unmatched::Fail,
            unmatched_attributes: Unmatched::Ignore,
            default_empty_values: false,
            use_actual_type: false,
            include_non_public: true,
            include_null_members: false,
            treat_enumerable_impls_as_objects: false,
            treat_dictionary_impls_as_objects: false,
            naming: NamingConventions::default(),
            serialization: Conventions::default(),
            deserialization: Conventions::default(),
            readers: TypeIdMap::new(),
            writers: TypeIdMap::new(),
            friendly_messages: TypeIdMap::new(),
        }
    }
}

impl Options {
    /// The conventions of one direction.
    #[inline]
    pub fn conventions(&self, mode: Mode) -> &Conventions {
        match mode {
            Mode::Serialize => &self.serialization,
            Mode::Deserialize => &self.deserialization,
        }
    }

    #[inline]
    pub fn conventions_mut(&mut self, mode: Mode) -> &mut Conventions {
        match mode {
            Mode::Serialize => &mut self.serialization,
            Mode::Deserialize => &mut self.deserialization,
        }
    }

    /// Registers a custom reader for `T`.
    ///
    /// While deserializing, `T` (and every wrapper around it) presents as a
    /// Value node and `read` turns the payload into the value. The node is
    /// the object-side target, for its path and metadata.
    ///
    /// ```
    /// use ar_map::Options;
    /// use ar_node::Value;
    ///
    /// let mut options = Options::default();
    /// options.add_reader(|value: &Value, _| Ok(value.to_text().split(',').count() as u32));
    /// assert!(options.has_reader(core::any::TypeId::of::<u32>()));
    /// ```
    pub fn add_reader<T, F>(&mut self, read: F) -> &mut Self
    where
        T: Typed,
        F: Fn(&Value, &dyn Node) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let read = boxed_reader(move |value, node| {
            read(value, node).map(|value| Box::new(value) as Box<dyn Reflect>)
        });
        self.readers.insert_type::<T>(read);
        self
    }

    /// Registers a custom writer for `T`.
    ///
    /// While serializing, `T` presents as a Value node carrying what `write`
    /// returns.
    pub fn add_writer<T, F>(&mut self, write: F) -> &mut Self
    where
        T: Typed,
        F: Fn(&T, &dyn Node) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        let write = boxed_writer(move |value, node| match value.downcast_ref::<T>() {
            Some(value) => write(value, node),
            None => Err(format!(
                "custom writer for `{}` received `{}`",
                type_name::<T>(),
                value.type_path()
            )
            .into()),
        });
        self.writers.insert_type::<T>(write);
        self
    }

    /// Sets the friendly message for parse failures of `T`.
    ///
    /// `{value}`, `{name}` and `{type}` are replaced by the offending text,
    /// the node name (or path) and the type name.
    pub fn friendly_message<T: Typed>(&mut self, template: impl Into<String>) -> &mut Self {
        self.friendly_messages.insert_type::<T>(template.into());
        self
    }

    #[inline]
    pub fn has_reader(&self, id: TypeId) -> bool {
        self.readers.contains(&id)
    }

    #[inline]
    pub fn has_writer(&self, id: TypeId) -> bool {
        self.writers.contains(&id)
    }

    #[inline]
    pub(crate) fn reader(&self, id: TypeId) -> Option<&ReadFn> {
        self.readers.get(&id).map(|read| &**read)
    }

    #[inline]
    pub(crate) fn writer(&self, id: TypeId) -> Option<&WriteFn> {
        self.writers.get(&id).map(|write| &**write)
    }

    /// Renders the friendly message for a parse failure of `ty`.
    ///
    /// Falls back to a sentence per scalar family when no template is set.
    pub fn render_friendly(&self, ty: &CachedType, value: &Value, name: &str) -> String {
        let template = match self.friendly_messages.get(&ty.id()) {
            Some(template) => template.as_str(),
            None => default_template(ty.scalar().map(|ops| ops.family())),
        };
        template
            .replace("{value}", &value.to_text())
            .replace("{name}", name)
            .replace("{type}", ty.display_name())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("case_sensitive", &self.case_sensitive)
            .field("unmatched_elements", &self.unmatched_elements)
            .field("unmatched_attributes", &self.unmatched_attributes)
            .field("default_empty_values", &self.default_empty_values)
            .field("use_actual_type", &self.use_actual_type)
            .field("include_non_public", &self.include_non_public)
            .field("include_null_members", &self.include_null_members)
            .field(
                "treat_enumerable_impls_as_objects",
                &self.treat_enumerable_impls_as_objects,
            )
            .field(
                "treat_dictionary_impls_as_objects",
                &self.treat_dictionary_impls_as_objects,
            )
            .field("readers", &self.readers.len())
            .field("writers", &self.writers.len())
            .finish_non_exhaustive()
    }
}

fn default_template(family: Option<ScalarFamily>) -> &'static str {
    match family {
        Some(ScalarFamily::Boolean) => "'{name}' must be true or false but was '{value}'.",
        Some(ScalarFamily::Integer) => "'{name}' must be a whole number but was '{value}'.",
        Some(ScalarFamily::Float) => "'{name}' must be a number but was '{value}'.",
        Some(ScalarFamily::Character) => "'{name}' must be a single character but was '{value}'.",
        Some(ScalarFamily::DateTime) => "'{name}' must be a date and time but was '{value}'.",
        Some(ScalarFamily::Uuid) => "'{name}' must be a UUID but was '{value}'.",
        Some(ScalarFamily::Enumeration) => "'{name}' must be one of the allowed values but was '{value}'.",
        _ => "'{value}' is not a valid value for '{name}'.",
    }
}

fn boxed_reader<F>(read: F) -> Box<ReadFn>
where
    F: Fn(&Value, &dyn Node) -> Result<Box<dyn Reflect>, BoxError> + Send + Sync + 'static,
{
    Box::new(read)
}

fn boxed_writer<F>(write: F) -> Box<WriteFn>
where
    F: Fn(&dyn Reflect, &dyn Node) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    Box::new(write)
}

// -----------------------------------------------------------------------------
// Tests
