use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{DataStruct, DeriveInput, Fields, Generics, Member, Path, Type, Visibility};

use crate::attrs::{FieldAttributes, TypeAttributes};

struct StructField<'a> {
    member: Member,
    name: String,
    ty: &'a Type,
    public: bool,
    attrs: FieldAttributes,
}

pub(crate) fn expand(ast: &DeriveInput, data: &DataStruct) -> syn::Result<TokenStream> {
    let type_attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    let krate = &type_attrs.krate;

    let fields = collect_fields(&data.fields)?;
    let members = fields
        .iter()
        .filter(|field| !field.attrs.skip)
        .map(|field| member_builder(field, krate));

    let rename = type_attrs.rename.as_ref().map(|name| quote!(.rename(#name)));
    let rename_all = type_attrs
        .rename_all
        .map(|rule| rule.to_tokens(krate))
        .map(|case| quote!(.rename_all(#case)));
    let default = type_attrs.default.then(|| quote!(.default_constructor()));
    let constructor = match &type_attrs.constructor {
        Some((func, params)) => Some(constructor(func, params, &fields, krate)?),
        None => None,
    };

    let ident = &ast.ident;
    let mut generics = add_bounds(&ast.generics, krate);
    if type_attrs.default && ast.generics.type_params().next().is_some() {
        let (_, ty_generics, _) = ast.generics.split_for_impl();
        generics
            .make_where_clause()
            .predicates
            .push(syn::parse_quote!(#ident #ty_generics: ::core::default::Default));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::Typed for #ident #ty_generics #where_clause {
            fn build_type() -> #krate::CachedType {
                #krate::TypeBuilder::<Self>::new()
                    #rename
                    #rename_all
                    #(#members)*
                    #default
                    #constructor
                    .build()
            }
        }
    })
}

fn collect_fields(fields: &Fields) -> syn::Result<Vec<StructField<'_>>> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(index.into()),
            };
            let name = match &field.ident {
                Some(ident) => ident.to_string(),
                None => index.to_string(),
            };
            Ok(StructField {
                member,
                name,
                ty: &field.ty,
                public: matches!(field.vis, Visibility::Public(_)),
                attrs: FieldAttributes::parse_attrs(&field.attrs)?,
            })
        })
        .collect()
}

fn member_builder(field: &StructField<'_>, krate: &Path) -> TokenStream {
    let StructField {
        member,
        name,
        ty,
        public,
        attrs,
    } = field;

    let setter = (!attrs.read_only).then(|| {
        quote! {
            .setter(|any, value| {
                let owner = #krate::__macro_exports::downcast_mut::<Self>(any)?;
                owner.#member = #krate::__macro_exports::take::<#ty>(value)?;
                ::core::result::Result::Ok(())
            })
        }
    });
    let rename = attrs.rename.as_ref().map(|name| quote!(.rename(#name)));
    let private = (!public).then(|| quote!(.private()));
    let property = attrs.property.then(|| quote!(.property()));

    quote! {
        .member(
            #krate::MemberBuilder::new::<#ty>(#name)
                .getter(|any| {
                    #krate::__macro_exports::downcast_ref::<Self>(any)
                        .map(|owner| &owner.#member as &dyn #krate::Reflect)
                })
                #setter
                #rename
                #private
                #property
        )
    }
}

fn constructor(
    func: &syn::Ident,
    params: &[syn::Ident],
    fields: &[StructField<'_>],
    krate: &Path,
) -> syn::Result<TokenStream> {
    let mut types = Vec::with_capacity(params.len());
    for param in params {
        let field = fields
            .iter()
            .find(|field| *param == field.name)
            .ok_or_else(|| {
                syn::Error::new(param.span(), format!("no field named `{param}` for constructor"))
            })?;
        types.push(field.ty);
    }
    let names: Vec<String> = params.iter().map(ToString::to_string).collect();

    Ok(quote! {
        .constructor(
            &[#(#krate::CtorParam::new::<#types>(#names)),*],
            |args| {
                let mut args = args.into_iter();
                #(
                    let #params = #krate::__macro_exports::next_arg::<#types>(&mut args, #names)?;
                )*
                ::core::result::Result::Ok(
                    ::std::boxed::Box::new(Self::#func(#(#params),*)) as ::std::boxed::Box<dyn #krate::Reflect>
                )
            },
        )
    })
}

/// Adds `T: Typed` for every type parameter.
pub(crate) fn add_bounds(generics: &Generics, krate: &Path) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<_> = generics
        .type_params()
        .map(|param| param.ident.to_token_stream())
        .collect();
    let where_clause = generics.make_where_clause();
    for param in params {
        where_clause
            .predicates
            .push(syn::parse_quote!(#param: #krate::Typed));
    }
    generics
}
