//! Type descriptors for mapping object graphs.
//!
//! Rust has no runtime reflection, so every mapped type describes itself once
//! through [`Typed::build_type`], usually generated by
//! [`#[derive(Reflect)]`](derive::Reflect). The process-wide [`TypeCache`]
//! builds each descriptor at most once and hands out shared [`CachedType`]s.
//!
//! A [`CachedType`] answers what the mapper needs to know about a type:
//!
//! - its [`TypeKind`]: Scalar, Complex, Enumerable, Dictionary or Array;
//! - scalar conversion to and from [`Value`](ar_node::Value);
//! - wrapper information for `Option`, `Arc`, [`Optional`] and `Box<dyn Reflect>`;
//! - element, key and value types of collections;
//! - its constructors and its ordered [`CachedMember`]s with compiled accessors.
//!
//! # Example
//!
//! ```
//! use ar_reflect::{Reflect, TypeKind, derive::Reflect};
//!
//! #[derive(Reflect, Default)]
//! #[reflect(default, rename_all = "camelCase")]
//! struct Account {
//!     user_name: String,
//!     tags: Vec<String>,
//! }
//!
//! let ty = ar_reflect::resolve::<Account>();
//! assert_eq!(ty.kind(), TypeKind::Complex);
//! assert_eq!(ty.members()[0].node_name(), "userName");
//! assert_eq!(ty.members()[1].ty().resolve().kind(), TypeKind::Enumerable);
//! ```

// -----------------------------------------------------------------------------
// Extern Self

// Derived code names `::ar_reflect`, which must also resolve inside this crate.
extern crate self as ar_reflect;

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod cache;
mod cached_member;
mod cached_type;
mod collection;
mod error;
mod optional;
mod reflect;
mod scalar;
mod wrapper;

pub mod impls;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Exports

pub use ar_reflect_derive as derive;
pub use convert_case::Case;

pub use builder::{MemberBuilder, TypeBuilder};
pub use cache::{TypeCache, resolve};
pub use cached_member::{CachedMember, Getter, MemberCategory, Setter};
pub use cached_type::{
    ConstructFn, Constructor, CtorParam, CachedType, TypeKind, TypeRef, short_type_name,
};
pub use collection::{DictionaryInfo, EntriesFn, FromEntriesFn, FromItemsFn, ItemsFn, SequenceInfo};
pub use error::{ReflectError, ScalarError};
pub use optional::Optional;
pub use reflect::{Reflect, Typed};
pub use scalar::{Scalar, ScalarFamily, ScalarOps};
pub use wrapper::{UnwrapFn, WrapFn, WrapperInfo, WrapperKind};

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use ar_node::Value;

    use crate::derive::Reflect;
    use crate::{MemberCategory, Optional, Reflect, Scalar, ScalarFamily, TypeKind};

    #[derive(Reflect, Debug, PartialEq)]
    #[reflect(constructor(new, id, label), rename = "item")]
    pub struct Item {
        #[reflect(read_only)]
        pub id: u32,
        pub label: String,
        #[reflect(skip)]
        pub cache: Vec<u8>,
        #[reflect(property)]
        pub note: Optional<String>,
    }

    impl Item {
        fn new(id: u32, label: String) -> Self {
            Self {
                id,
                label,
                cache: Vec::new(),
                note: Optional::Absent,
            }
        }
    }

    #[derive(Reflect, Default)]
    #[reflect(default)]
    struct Pair<T>(T, T);

    #[derive(Reflect, Debug, Default, Clone, Copy, PartialEq)]
    #[reflect(default, rename_all = "snake_case")]
    enum Shade {
        #[default]
        LightGray,
        DarkGray,
        #[reflect(rename = "BLACK")]
        Black,
    }

    #[test]
    fn derived_struct_members() {
        let ty = crate::resolve::<Item>();
        assert_eq!(ty.kind(), TypeKind::Complex);
        assert_eq!(ty.display_name(), "item");

        let names: Vec<_> = ty.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["id", "label", "note"]);
        assert!(!ty.member("id").unwrap().is_writable());
        assert!(ty.member("note").unwrap().is_optional());
        assert_eq!(ty.member("note").unwrap().category(), MemberCategory::Property);
        assert!(ty.default_constructor().is_none());
    }

    #[test]
    fn derived_constructor() {
        let ty = crate::resolve::<Item>();
        let ctor = &ty.constructors()[0];
        let params: Vec<_> = ctor.params().iter().map(|p| p.name()).collect();
        assert_eq!(params, ["id", "label"]);
        assert!(ctor.params()[1].ty().is::<String>());

        let args: Vec<Box<dyn Reflect>> = vec![Box::new(7_u32) as Box<dyn Reflect>, Box::new(String::from("seven"))];
        let item = ctor.invoke("Item", args).unwrap().take::<Item>().unwrap();
        assert_eq!(item, Item::new(7, "seven".into()));

        let wrong: Vec<Box<dyn Reflect>> = vec![Box::new(String::new()) as Box<dyn Reflect>, Box::new(String::new())];
        assert!(ctor.invoke("Item", wrong).is_err());
    }

    #[test]
    fn derived_tuple_struct_with_generics() {
        let ty = crate::resolve::<Pair<i8>>();
        assert_eq!(ty.name(), "Pair<i8>");
        assert_eq!(ty.members()[1].name(), "1");

        let mut pair = ty.construct_default().unwrap().unwrap();
        ty.members()[1].set(&mut *pair, Box::new(3_i8)).unwrap();
        let pair = pair.take::<Pair<i8>>().unwrap();
        assert_eq!((pair.0, pair.1), (0, 3));
    }

    #[test]
    fn derived_enum_is_a_scalar() {
        let ty = crate::resolve::<Shade>();
        assert_eq!(ty.kind(), TypeKind::Scalar);
        assert_eq!(Shade::FAMILY, ScalarFamily::Enumeration);

        assert_eq!(Shade::DarkGray.to_value(), Value::from("dark_gray"));
        assert_eq!(Shade::Black.to_value(), Value::from("BLACK"));
        assert_eq!(Shade::from_value(Value::from("Light_Gray")).unwrap(), Shade::LightGray);
        assert_eq!(Shade::from_value(Value::U64(2)).unwrap(), Shade::Black);
        assert!(Shade::from_value(Value::from("white")).is_err());
    }
}
