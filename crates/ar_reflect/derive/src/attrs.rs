use convert_case::Case;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Attribute, Ident, LitStr, Path};

use crate::REFLECT_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// RenameRule

/// A `rename_all` value, kept both as a runtime `Case` path and for
/// conversions done during expansion.
#[derive(Clone, Copy)]
pub(crate) struct RenameRule {
    pub case: Case,
    variant: &'static str,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        let (case, variant) = match lit.value().as_str() {
            "camelCase" => (Case::Camel, "Camel"),
            "PascalCase" => (Case::Pascal, "Pascal"),
            "snake_case" => (Case::Snake, "Snake"),
            "kebab-case" => (Case::Kebab, "Kebab"),
            "SCREAMING_SNAKE_CASE" => (Case::ScreamingSnake, "ScreamingSnake"),
            "lowercase" => (Case::Flat, "Flat"),
            "UPPERCASE" => (Case::UpperFlat, "UpperFlat"),
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unknown rename rule `{other}`"),
                ));
            }
        };
        Ok(Self { case, variant })
    }

    /// `path::Case::Variant`
    pub fn to_tokens(self, krate: &Path) -> TokenStream {
        let variant = Ident::new(self.variant, Span::call_site());
        quote!(#krate::Case::#variant)
    }
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// `#[reflect(...)]` on the type.
pub(crate) struct TypeAttributes {
    pub default: bool,
    /// Function name, then parameter names.
    pub constructor: Option<(Ident, Vec<Ident>)>,
    pub rename: Option<LitStr>,
    pub rename_all: Option<RenameRule>,
    pub krate: Path,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self {
            default: false,
            constructor: None,
            rename: None,
            rename_all: None,
            krate: syn::parse_quote!(::ar_reflect),
        };

        for attr in attrs {
            if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    out.default = true;
                } else if meta.path.is_ident("rename") {
                    out.rename = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("rename_all") {
                    out.rename_all = Some(RenameRule::parse(&meta.value()?.parse()?)?);
                } else if meta.path.is_ident("crate") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.krate = lit.parse()?;
                } else if meta.path.is_ident("constructor") {
                    let mut names = Vec::new();
                    meta.parse_nested_meta(|inner| {
                        names.push(inner.path.require_ident()?.clone());
                        Ok(())
                    })?;
                    if names.is_empty() {
                        return Err(meta.error("expected `constructor(function, params...)`"));
                    }
                    let func = names.remove(0);
                    out.constructor = Some((func, names));
                } else {
                    return Err(meta.error("unknown reflect type attribute"));
                }
                Ok(())
            })?;
        }

        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// `#[reflect(...)]` on a field or a variant.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub skip: bool,
    pub read_only: bool,
    pub property: bool,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs {
            if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                } else if meta.path.is_ident("read_only") {
                    out.read_only = true;
                } else if meta.path.is_ident("property") {
                    out.property = true;
                } else {
                    return Err(meta.error("unknown reflect field attribute"));
                }
                Ok(())
            })?;
        }

        Ok(out)
    }
}
