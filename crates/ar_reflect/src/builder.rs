use core::any::TypeId;
use core::marker::PhantomData;

use ar_utils::hash::HashMap;
use convert_case::{Case, Casing};

use crate::cached_type::FromAnyFn;
use crate::{
    CachedMember, CachedType, ConstructFn, Constructor, CtorParam, DictionaryInfo, Getter,
    MemberCategory, Reflect, Scalar, ScalarOps, SequenceInfo, Setter, TypeKind, TypeRef, Typed,
    WrapperInfo, short_type_name,
};

// -----------------------------------------------------------------------------
// MemberBuilder

/// Describes one member for [`TypeBuilder::member`].
///
/// Members are public and stored fields unless stated otherwise.
pub struct MemberBuilder {
    name: &'static str,
    rename: Option<&'static str>,
    ty: TypeRef,
    category: MemberCategory,
    public: bool,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl MemberBuilder {
    /// A member named `name` of declared type `F`.
    #[inline]
    pub fn new<F: Typed>(name: &'static str) -> Self {
        Self {
            name,
            rename: None,
            ty: TypeRef::of::<F>(),
            category: MemberCategory::Field,
            public: true,
            getter: None,
            setter: None,
        }
    }

    #[inline]
    pub fn getter(mut self, getter: Getter) -> Self {
        self.getter = Some(getter);
        self
    }

    #[inline]
    pub fn setter(mut self, setter: Setter) -> Self {
        self.setter = Some(setter);
        self
    }

    /// Sets the declared node name, which takes precedence over naming conventions.
    #[inline]
    pub fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    #[inline]
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    #[inline]
    pub fn private(self) -> Self {
        self.public(false)
    }

    /// Marks the member as an accessor pair rather than a stored field.
    #[inline]
    pub fn property(mut self) -> Self {
        self.category = MemberCategory::Property;
        self
    }
}

// -----------------------------------------------------------------------------
// TypeBuilder

/// Assembles the [`CachedType`] of `T` inside [`Typed::build_type`].
///
/// The kind is derived from what is registered, in priority order: scalar,
/// wrapper (the kind of the wrapped type), dictionary, sequence, complex.
///
/// # Examples
///
/// ```
/// use ar_reflect::{CtorParam, MemberBuilder, Reflect, TypeBuilder, TypeKind, Typed};
///
/// struct Money {
///     cents: i64,
/// }
///
/// impl Money {
///     fn cents(&self) -> i64 {
///         self.cents
///     }
/// }
///
/// impl Typed for Money {
///     fn build_type() -> ar_reflect::CachedType {
///         TypeBuilder::<Self>::new()
///             .read_only_field::<i64>("cents", |any| {
///                 any.downcast_ref::<Money>().map(|m| &m.cents as &dyn Reflect)
///             })
///             .constructor(&[CtorParam::new::<i64>("cents")], |args| {
///                 let mut args = args.into_iter();
///                 let cents = ar_reflect::__macro_exports::next_arg::<i64>(&mut args, "cents")?;
///                 Ok(Box::new(Money { cents }) as Box<dyn Reflect>)
///             })
///             .build()
///     }
/// }
///
/// let ty = ar_reflect::resolve::<Money>();
/// assert_eq!(ty.kind(), TypeKind::Complex);
/// assert!(ty.default_constructor().is_none());
///
/// let money = ty.constructors()[0].invoke("Money", vec![Box::new(250_i64) as Box<dyn Reflect>]).unwrap();
/// assert_eq!(money.downcast_ref::<Money>().map(Money::cents), Some(250));
/// ```
pub struct TypeBuilder<T: Typed> {
    rename: Option<&'static str>,
    rename_all: Option<Case>,
    scalar: Option<ScalarOps>,
    wrapper: Option<WrapperInfo>,
    sequence: Option<SequenceInfo>,
    dictionary: Option<DictionaryInfo>,
    members: Vec<MemberBuilder>,
    constructors: Vec<Constructor>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Typed> TypeBuilder<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            rename: None,
            rename_all: None,
            scalar: None,
            wrapper: None,
            sequence: None,
            dictionary: None,
            members: Vec::new(),
            constructors: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Sets the declared node name of the type.
    #[inline]
    pub fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    /// Declares node names for all members not renamed individually.
    #[inline]
    pub fn rename_all(mut self, case: Case) -> Self {
        self.rename_all = Some(case);
        self
    }

    #[inline]
    pub fn wrapper(mut self, wrapper: WrapperInfo) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    #[inline]
    pub fn sequence(mut self, sequence: SequenceInfo) -> Self {
        self.sequence = Some(sequence);
        self
    }

    #[inline]
    pub fn dictionary(mut self, dictionary: DictionaryInfo) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    #[inline]
    pub fn member(mut self, member: MemberBuilder) -> Self {
        self.members.push(member);
        self
    }

    /// Adds a public, readable and writable field.
    #[inline]
    pub fn field<F: Typed>(self, name: &'static str, getter: Getter, setter: Setter) -> Self {
        self.member(MemberBuilder::new::<F>(name).getter(getter).setter(setter))
    }

    /// Adds a public field without setter.
    #[inline]
    pub fn read_only_field<F: Typed>(self, name: &'static str, getter: Getter) -> Self {
        self.member(MemberBuilder::new::<F>(name).getter(getter))
    }

    /// Adds a constructor taking `params`, in order.
    #[inline]
    pub fn constructor(mut self, params: &[CtorParam], build: ConstructFn) -> Self {
        self.constructors.push(Constructor::new(params, build));
        self
    }

    pub fn build(self) -> CachedType {
        let kind = self.classify();
        let declaring = TypeRef::of::<T>();
        let rename_all = self.rename_all;

        let mut member_index = HashMap::default();
        let members: Box<[_]> = self
            .members
            .into_iter()
            .enumerate()
            .map(|(index, member)| {
                member_index.insert(member.name, index);
                let node_name = match (member.rename, rename_all) {
                    (Some(name), _) => Some(name.to_owned()),
                    (None, Some(case)) => Some(member.name.to_case(case)),
                    (None, None) => None,
                };
                std::sync::Arc::new(CachedMember {
                    name: member.name,
                    node_name,
                    ty: member.ty,
                    declaring,
                    category: member.category,
                    public: member.public,
                    getter: member.getter,
                    setter: member.setter,
                })
            })
            .collect();

        let from_any: FromAnyFn = |value| {
            value
                .downcast::<T>()
                .map(|value| value as Box<dyn Reflect>)
        };

        CachedType {
            id: TypeId::of::<T>(),
            type_path: core::any::type_name::<T>(),
            name: short_type_name(core::any::type_name::<T>()),
            node_name: self.rename,
            kind,
            scalar: self.scalar,
            wrapper: self.wrapper,
            sequence: self.sequence,
            dictionary: self.dictionary,
            members,
            member_index,
            constructors: self.constructors.into_boxed_slice(),
            from_any,
        }
    }

    fn classify(&self) -> TypeKind {
        if self.scalar.is_some() {
            return TypeKind::Scalar;
        }
        if let Some(wrapper) = &self.wrapper {
            return match wrapper.inner() {
                Some(inner) => inner.resolve().kind(),
                None => TypeKind::Complex,
            };
        }
        if self.dictionary.is_some() {
            return TypeKind::Dictionary;
        }
        match &self.sequence {
            Some(sequence) if sequence.is_array() => TypeKind::Array,
            Some(_) => TypeKind::Enumerable,
            None => TypeKind::Complex,
        }
    }
}

impl<T: Typed + Scalar> TypeBuilder<T> {
    /// Registers the [`Scalar`] conversions of `T`.
    #[inline]
    pub fn scalar(mut self) -> Self {
        self.scalar = Some(ScalarOps::of::<T>());
        self
    }
}

impl<T: Typed + Default> TypeBuilder<T> {
    /// Registers [`Default`] as the zero-argument constructor.
    #[inline]
    pub fn default_constructor(self) -> Self {
        self.constructor(&[], |_| Ok(Box::new(T::default()) as Box<dyn Reflect>))
    }
}

impl<T: Typed> Default for TypeBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::{
        CachedType, Case, DictionaryInfo, MemberBuilder, MemberCategory, Reflect, SequenceInfo,
        TypeBuilder, TypeKind, Typed,
    };

    #[derive(Default)]
    struct Both {
        items: Vec<u8>,
    }

    // Exposes a sequence and a dictionary surface; the dictionary wins.
    impl Typed for Both {
        fn build_type() -> CachedType {
            TypeBuilder::<Self>::new()
                .sequence(SequenceInfo::new::<u8>(
                    |any| match any.downcast_ref::<Both>() {
                        Some(both) => both.items.iter().map(|i| i as &dyn Reflect).collect(),
                        None => Vec::new(),
                    },
                    |_| Ok(Box::new(Both::default()) as Box<dyn Reflect>),
                ))
                .dictionary(DictionaryInfo::new::<String, u8>(
                    |_| Vec::new(),
                    |_| Ok(Box::new(Both::default()) as Box<dyn Reflect>),
                ))
                .build()
        }
    }

    struct Renamed {
        first_name: String,
        last_name: String,
    }

    impl Typed for Renamed {
        fn build_type() -> CachedType {
            TypeBuilder::<Self>::new()
                .rename("person")
                .rename_all(Case::Kebab)
                .member(
                    MemberBuilder::new::<String>("first_name")
                        .rename("given")
                        .getter(|any| any.downcast_ref::<Renamed>().map(|r| &r.first_name as &dyn Reflect)),
                )
                .member(
                    MemberBuilder::new::<String>("last_name")
                        .private()
                        .property()
                        .getter(|any| any.downcast_ref::<Renamed>().map(|r| &r.last_name as &dyn Reflect)),
                )
                .build()
        }
    }

    #[test]
    fn dictionary_takes_priority_over_sequence() {
        assert_eq!(crate::resolve::<Both>().kind(), TypeKind::Dictionary);
        assert_eq!(crate::resolve::<BTreeMap<String, Vec<u8>>>().kind(), TypeKind::Dictionary);
    }

    #[test]
    fn wrappers_classify_as_their_inner_type() {
        assert_eq!(crate::resolve::<Option<u8>>().kind(), TypeKind::Scalar);
        assert_eq!(crate::resolve::<std::sync::Arc<Vec<u8>>>().kind(), TypeKind::Enumerable);
        assert_eq!(crate::resolve::<Box<dyn Reflect>>().kind(), TypeKind::Complex);
    }

    #[test]
    fn member_names_and_flags() {
        let ty = crate::resolve::<Renamed>();
        assert_eq!(ty.node_name(), Some("person"));
        assert_eq!(ty.display_name(), "person");

        let first = ty.member("first_name").unwrap();
        let last = ty.member("last_name").unwrap();
        assert_eq!(first.node_name(), "given");
        assert_eq!(last.node_name(), "last-name");
        assert!(first.is_public() && !last.is_public());
        assert_eq!(last.category(), MemberCategory::Property);
        assert!(!first.is_writable());
        assert!(first.declaring().is::<Renamed>());

        let value = Renamed {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        };
        let read = last.get(&value).and_then(|v| v.downcast_ref::<String>());
        assert_eq!(read.map(String::as_str), Some("Lovelace"));
        assert_eq!(value.first_name, "Ada");
    }

    #[test]
    fn from_any_checks_the_type() {
        let ty = crate::resolve::<u16>();
        assert!(ty.from_any(Box::new(3_u16)).is_ok());
        assert!(ty.from_any(Box::new(3_u32)).is_err());
    }
}
