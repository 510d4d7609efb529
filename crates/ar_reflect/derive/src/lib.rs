//! Provides `#[derive(Reflect)]` for `ar_reflect`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, parse_macro_input};

static REFLECT_ATTRIBUTE_NAME: &str = "reflect";

// -----------------------------------------------------------------------------
// Modules

mod attrs;
mod derive_enum;
mod derive_struct;

// -----------------------------------------------------------------------------
// Macros

/// Implements `Typed` (and so `Reflect`) for a struct or a fieldless enum.
///
/// Structs become Complex types whose members are their fields, in
/// declaration order. Fieldless enums become Enumeration scalars mapped by
/// variant name.
///
/// ## Type attributes
///
/// - `#[reflect(default)]`: register `Default::default` as the zero-argument
///   constructor. Required for eager construction while deserializing.
/// - `#[reflect(constructor(new, a, b))]`: register `Self::new(a, b)` as a
///   parameterized constructor. Parameters take the types of the fields with
///   the same names.
/// - `#[reflect(rename = "...")]`: the node name of the type.
/// - `#[reflect(rename_all = "...")]`: declare member (or variant) names in
///   one of `camelCase`, `PascalCase`, `snake_case`, `kebab-case`,
///   `SCREAMING_SNAKE_CASE`, `lowercase`, `UPPERCASE`.
/// - `#[reflect(crate = "...")]`: path of the `ar_reflect` crate, when
///   re-exported under another name.
///
/// ## Field attributes
///
/// - `#[reflect(rename = "...")]`: the declared node name.
/// - `#[reflect(skip)]`: not a member.
/// - `#[reflect(read_only)]`: getter only.
/// - `#[reflect(property)]`: categorize as property instead of field.
///
/// Fields without `pub` are recorded as non-public members.
///
/// ## Example
///
/// ```rust, ignore
/// #[derive(Reflect, Default)]
/// #[reflect(default, rename_all = "camelCase")]
/// pub struct Order {
///     pub order_id: u64,
///     #[reflect(rename = "lines")]
///     pub items: Vec<Line>,
///     #[reflect(skip)]
///     cache: Option<String>,
/// }
///
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// pub enum Status {
///     #[default]
///     Open,
///     #[reflect(rename = "done")]
///     Closed,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let expanded = match &ast.data {
        Data::Struct(data) => derive_struct::expand(&ast, data),
        Data::Enum(data) => derive_enum::expand(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "`Reflect` cannot be derived for unions",
        )),
    };

    match expanded {
        Ok(tokens) => TokenStream::from(quote! {
            const _: () = {
                #tokens
            };
        }),
        Err(err) => err.into_compile_error().into(),
    }
}
