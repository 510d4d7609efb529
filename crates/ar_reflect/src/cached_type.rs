use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use ar_utils::hash::HashMap;

use crate::{
    CachedMember, DictionaryInfo, Reflect, ReflectError, ScalarOps, SequenceInfo, Typed,
    WrapperInfo, WrapperKind,
};

// -----------------------------------------------------------------------------
// TypeKind

/// Classification of a type.
///
/// The type cache classifies in priority order: scalar, dictionary,
/// enumerable (array when fixed-length), complex. A type exposing both a
/// dictionary and an enumerable surface is a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    Complex,
    Enumerable,
    Dictionary,
    Array,
}

impl TypeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Complex => "complex",
            TypeKind::Enumerable => "enumerable",
            TypeKind::Dictionary => "dictionary",
            TypeKind::Array => "array",
        }
    }

    /// `true` for Enumerable and Array.
    #[inline]
    pub const fn is_sequence(self) -> bool {
        matches!(self, TypeKind::Enumerable | TypeKind::Array)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// TypeRef

/// A lazy reference to another type's descriptor.
///
/// Holds the `TypeId` and a resolver function, so descriptors can point at
/// each other (including themselves) without building eagerly.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    path: &'static str,
    resolve: fn() -> Arc<CachedType>,
}

impl TypeRef {
    #[inline]
    pub fn of<T: Typed>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
            resolve: crate::resolve::<T>,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        self.path
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Resolves the descriptor through the global cache.
    #[inline]
    pub fn resolve(&self) -> Arc<CachedType> {
        (self.resolve)()
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

// -----------------------------------------------------------------------------
// Constructor

/// Builds an instance from constructor arguments, in parameter order.
pub type ConstructFn = fn(Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>, ReflectError>;

/// A named, typed constructor parameter.
///
/// Parameters are matched by name (case-insensitively) and type against
/// sibling member values while deserializing.
#[derive(Debug, Clone, Copy)]
pub struct CtorParam {
    name: &'static str,
    ty: TypeRef,
}

impl CtorParam {
    #[inline]
    pub fn new<T: Typed>(name: &'static str) -> Self {
        Self {
            name,
            ty: TypeRef::of::<T>(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn ty(&self) -> TypeRef {
        self.ty
    }
}

#[derive(Clone)]
pub struct Constructor {
    params: Box<[CtorParam]>,
    build: ConstructFn,
}

impl Constructor {
    #[inline]
    pub fn new(params: &[CtorParam], build: ConstructFn) -> Self {
        Self {
            params: params.into(),
            build,
        }
    }

    #[inline]
    pub fn params(&self) -> &[CtorParam] {
        &self.params
    }

    /// `true` for a zero-argument constructor.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.params.is_empty()
    }

    pub fn invoke(
        &self,
        type_name: &str,
        args: Vec<Box<dyn Reflect>>,
    ) -> Result<Box<dyn Reflect>, ReflectError> {
        if args.len() != self.params.len() {
            return Err(ReflectError::Arity {
                type_name: type_name.to_owned(),
                expected: self.params.len(),
                found: args.len(),
            });
        }
        (self.build)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constructor").field(&self.params).finish()
    }
}

// -----------------------------------------------------------------------------
// CachedType

pub(crate) type FromAnyFn = fn(Box<dyn Any + Send>) -> Result<Box<dyn Reflect>, Box<dyn Any + Send>>;

/// The memoized descriptor of one type.
///
/// Built by [`TypeBuilder`](crate::TypeBuilder) and immutable afterwards.
/// Obtain it through [`resolve`](crate::resolve).
///
/// ```
/// use ar_reflect::{TypeKind, WrapperKind};
///
/// let ty = ar_reflect::resolve::<Option<Vec<u8>>>();
/// assert!(ty.is_nullable());
/// assert_eq!(ty.wrapper().map(|w| w.kind()), Some(WrapperKind::Nullable));
/// // Wrappers classify as what they wrap.
/// assert_eq!(ty.kind(), TypeKind::Enumerable);
/// assert_eq!(ty.underlying().unwrap().name(), "Vec<u8>");
/// ```
pub struct CachedType {
    pub(crate) id: TypeId,
    pub(crate) type_path: &'static str,
    pub(crate) name: String,
    pub(crate) node_name: Option<&'static str>,
    pub(crate) kind: TypeKind,
    pub(crate) scalar: Option<ScalarOps>,
    pub(crate) wrapper: Option<WrapperInfo>,
    pub(crate) sequence: Option<SequenceInfo>,
    pub(crate) dictionary: Option<DictionaryInfo>,
    pub(crate) members: Box<[Arc<CachedMember>]>,
    pub(crate) member_index: HashMap<&'static str, usize>,
    pub(crate) constructors: Box<[Constructor]>,
    pub(crate) from_any: FromAnyFn,
}

impl CachedType {
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Full type name, as given by [`core::any::type_name`].
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Type name with module paths stripped, e.g. `Vec<Item>`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared node name (`#[reflect(rename = "...")]`), if any.
    #[inline]
    pub fn node_name(&self) -> Option<&'static str> {
        self.node_name
    }

    /// The declared node name, or the short name.
    #[inline]
    pub fn display_name(&self) -> &str {
        self.node_name.unwrap_or(&self.name)
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The kind after applying the collection-as-object overrides.
    ///
    /// A collection that also declares members behaves as Complex when the
    /// matching override is on. Collections without members keep their kind.
    pub fn effective_kind(&self, enumerables_as_objects: bool, dictionaries_as_objects: bool) -> TypeKind {
        let has_members = !self.members.is_empty();
        match self.kind {
            TypeKind::Dictionary if dictionaries_as_objects && has_members => TypeKind::Complex,
            TypeKind::Enumerable | TypeKind::Array if enumerables_as_objects && has_members => {
                TypeKind::Complex
            }
            kind => kind,
        }
    }

    #[inline]
    pub fn scalar(&self) -> Option<&ScalarOps> {
        self.scalar.as_ref()
    }

    #[inline]
    pub fn wrapper(&self) -> Option<&WrapperInfo> {
        self.wrapper.as_ref()
    }

    /// `true` when the type has a null state (`Option`, `OnceLock`).
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.wrapper.as_ref().is_some_and(WrapperInfo::is_nullable)
    }

    /// The wrapped type, for statically typed wrappers.
    #[inline]
    pub fn underlying(&self) -> Option<Arc<CachedType>> {
        self.wrapper.as_ref()?.inner().map(|inner| inner.resolve())
    }

    #[inline]
    pub fn sequence(&self) -> Option<&SequenceInfo> {
        self.sequence.as_ref()
    }

    #[inline]
    pub fn dictionary(&self) -> Option<&DictionaryInfo> {
        self.dictionary.as_ref()
    }

    /// `true` unless the collection's element (or value) type is dynamic.
    ///
    /// Scalars and complex types count as generic.
    pub fn is_generic(&self) -> bool {
        let dynamic = |ty: TypeRef| ty.is::<Box<dyn Reflect>>();
        if let Some(dictionary) = &self.dictionary {
            return !dynamic(dictionary.key()) && !dynamic(dictionary.value());
        }
        if let Some(sequence) = &self.sequence {
            return !dynamic(sequence.element());
        }
        !self
            .wrapper
            .as_ref()
            .is_some_and(|wrapper| wrapper.kind() == WrapperKind::Dynamic)
    }

    /// Members in declaration order.
    #[inline]
    pub fn members(&self) -> &[Arc<CachedMember>] {
        &self.members
    }

    /// Looks up a member by its Rust name.
    #[inline]
    pub fn member(&self, name: &str) -> Option<&Arc<CachedMember>> {
        self.member_index.get(name).map(|&index| &self.members[index])
    }

    #[inline]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    #[inline]
    pub fn default_constructor(&self) -> Option<&Constructor> {
        self.constructors.iter().find(|ctor| ctor.is_default())
    }

    /// Creates an instance through the zero-argument constructor.
    pub fn construct_default(&self) -> Option<Result<Box<dyn Reflect>, ReflectError>> {
        self.default_constructor()
            .map(|ctor| ctor.invoke(&self.name, Vec::new()))
    }

    /// Converts a type-erased value of exactly this type.
    #[inline]
    pub fn from_any(&self, value: Box<dyn Any + Send>) -> Result<Box<dyn Reflect>, Box<dyn Any + Send>> {
        (self.from_any)(value)
    }
}

impl fmt::Debug for CachedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedType")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("members", &self.members)
            .field("constructors", &self.constructors)
            .finish_non_exhaustive()
    }
}

/// Strips module paths from a type name.
///
/// ```
/// use ar_reflect::short_type_name;
///
/// assert_eq!(
///     short_type_name("std::collections::hash::map::HashMap<alloc::string::String, my::Item>"),
///     "HashMap<String, Item>"
/// );
/// assert_eq!(short_type_name("[app::Point; 3]"), "[Point; 3]");
/// ```
pub fn short_type_name(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut segment_start = 0;
    for (index, ch) in path.char_indices() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            continue;
        }
        push_last_segment(&mut out, &path[segment_start..index]);
        out.push(ch);
        segment_start = index + ch.len_utf8();
    }
    push_last_segment(&mut out, &path[segment_start..]);
    out
}

fn push_last_segment(out: &mut String, run: &str) {
    out.push_str(run.rsplit("::").next().unwrap_or(run));
}
