use convert_case::Casing;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields};

use crate::attrs::{FieldAttributes, TypeAttributes};
use crate::derive_struct::add_bounds;

pub(crate) fn expand(ast: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream> {
    let type_attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    let krate = &type_attrs.krate;

    if let Some((func, _)) = &type_attrs.constructor {
        return Err(syn::Error::new(
            func.span(),
            "enums are scalars and take no constructor",
        ));
    }

    let mut variants = Vec::with_capacity(data.variants.len());
    let mut names = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                &variant.fields,
                "`Reflect` can only be derived for enums without fields",
            ));
        }
        let attrs = FieldAttributes::parse_attrs(&variant.attrs)?;
        let name = match (&attrs.rename, type_attrs.rename_all) {
            (Some(name), _) => name.value(),
            (None, Some(rule)) => variant.ident.to_string().to_case(rule.case),
            (None, None) => variant.ident.to_string(),
        };
        variants.push(&variant.ident);
        names.push(name);
    }
    let indices = 0..variants.len();

    let rename = type_attrs.rename.as_ref().map(|name| quote!(.rename(#name)));
    let default = type_attrs.default.then(|| quote!(.default_constructor()));

    let ident = &ast.ident;
    let generics = add_bounds(&ast.generics, krate);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let exports = quote!(#krate::__macro_exports);

    Ok(quote! {
        impl #impl_generics #krate::Scalar for #ident #ty_generics #where_clause {
            const FAMILY: #krate::ScalarFamily = #krate::ScalarFamily::Enumeration;

            fn to_value(&self) -> #exports::Value {
                let name: &str = match *self {
                    #(Self::#variants => #names,)*
                };
                #exports::Value::String(::std::string::String::from(name))
            }

            fn from_value(
                value: #exports::Value,
            ) -> ::core::result::Result<Self, #krate::ScalarError> {
                const VARIANTS: &[&str] = &[#(#names),*];
                match #exports::variant_index(&value, VARIANTS) {
                    #(::core::option::Option::Some(#indices) => ::core::result::Result::Ok(Self::#variants),)*
                    _ => ::core::result::Result::Err(#exports::unknown_variant::<Self>(value, VARIANTS)),
                }
            }
        }

        impl #impl_generics #krate::Typed for #ident #ty_generics #where_clause {
            fn build_type() -> #krate::CachedType {
                #krate::TypeBuilder::<Self>::new()
                    .scalar()
                    #rename
                    #default
                    .build()
            }
        }
    })
}
