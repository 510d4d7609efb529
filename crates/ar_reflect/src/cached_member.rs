use core::any::Any;
use core::fmt;

use crate::{Reflect, ReflectError, TypeRef, WrapperKind};

/// Reads a member from its owner; `None` if the owner has another type.
pub type Getter = for<'a> fn(&'a dyn Any) -> Option<&'a dyn Reflect>;

/// Writes a member into its owner.
pub type Setter = fn(&mut dyn Any, Box<dyn Reflect>) -> Result<(), ReflectError>;

/// Whether a member is a stored field or an accessor pair.
///
/// Naming conventions can target one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberCategory {
    Field,
    Property,
}

// -----------------------------------------------------------------------------
// CachedMember

/// The memoized descriptor of one member.
///
/// # Examples
///
/// ```
/// use ar_reflect::{MemberCategory, Reflect, derive::Reflect};
///
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// pub struct Point {
///     pub x: i32,
///     #[reflect(rename = "Y", read_only)]
///     y: i32,
/// }
///
/// let ty = ar_reflect::resolve::<Point>();
/// let x = ty.member("x").unwrap();
/// let y = ty.member("y").unwrap();
/// assert!(x.is_public() && !y.is_public());
/// assert!(!y.is_writable());
/// assert_eq!(y.node_name(), "Y");
/// assert_eq!(x.category(), MemberCategory::Field);
///
/// let mut point = Point::default();
/// x.set(&mut point, Box::new(5_i32)).unwrap();
/// assert_eq!(x.get(&point).and_then(|v| v.downcast_ref::<i32>()), Some(&5));
/// ```
pub struct CachedMember {
    pub(crate) name: &'static str,
    pub(crate) node_name: Option<String>,
    pub(crate) ty: TypeRef,
    pub(crate) declaring: TypeRef,
    pub(crate) category: MemberCategory,
    pub(crate) public: bool,
    pub(crate) getter: Option<Getter>,
    pub(crate) setter: Option<Setter>,
}

impl CachedMember {
    /// The Rust name of the member.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared node name (`rename`, or `rename_all` applied), else the Rust name.
    #[inline]
    pub fn node_name(&self) -> &str {
        self.node_name.as_deref().unwrap_or(self.name)
    }

    /// `true` when the name comes from a declaration rather than the Rust name.
    #[inline]
    pub fn has_declared_name(&self) -> bool {
        self.node_name.is_some()
    }

    /// The declared type.
    #[inline]
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    /// The type that declares this member.
    #[inline]
    pub fn declaring(&self) -> TypeRef {
        self.declaring
    }

    #[inline]
    pub fn category(&self) -> MemberCategory {
        self.category
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.public
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// `true` when the declared type is [`Optional`](crate::Optional), which
    /// can be absent rather than null.
    pub fn is_optional(&self) -> bool {
        self.ty
            .resolve()
            .wrapper()
            .is_some_and(|wrapper| wrapper.kind() == WrapperKind::Optional)
    }

    /// Reads the member from `owner`.
    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        (self.getter?)(owner.as_any())
    }

    /// Writes `value` into the member of `owner`.
    pub fn set(&self, owner: &mut dyn Reflect, value: Box<dyn Reflect>) -> Result<(), ReflectError> {
        let setter = self.setter.ok_or_else(|| ReflectError::NotWritable {
            type_name: crate::short_type_name(self.declaring.path()),
            member: self.name,
        })?;
        setter(owner.as_any_mut(), value)
    }
}

impl fmt::Debug for CachedMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedMember")
            .field("name", &self.name)
            .field("node_name", &self.node_name())
            .field("ty", &self.ty)
            .field("category", &self.category)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}
