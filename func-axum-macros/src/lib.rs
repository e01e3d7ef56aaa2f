//! Procedural macros for func-axum.
//!
//! `#[derive(Params)]` builds the field-descriptor table that the form binder
//! walks at request time. Each named field becomes one descriptor carrying its
//! source key, its declared type and a setter for one of the supported kinds.
//!
//! ```ignore
//! use func_axum::Params;
//! use serde::Deserialize;
//!
//! #[derive(Default, Deserialize, Params)]
//! #[serde(default)]
//! struct Query {
//!     #[form = "who"]
//!     name: String,
//!     page: i64,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DataStruct, DeriveInput, Expr, ExprLit, Field, Fields, GenericArgument, Lit,
    Meta, PathArguments, Token, Type, TypePath, ext::IdentExt, parenthesized, parse_macro_input,
    token,
};

/// Derive `func_axum::Params` for a struct with named fields.
///
/// Fields are bound from the key given by `#[form = "key"]`, or from the
/// field name when the attribute is absent.
///
/// A record with fields must also carry `#[serde(default)]`, so that keys
/// missing from a JSON body keep their zero value like absent form keys do.
#[proc_macro_derive(Params, attributes(form))]
pub fn derive_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Binding kind inferred from a field's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Float,
    Str,
    StrList,
    Time,
    Unsupported,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let fields: Vec<&Field> = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(named),
            ..
        }) => named.named.iter().collect(),
        Data::Struct(DataStruct {
            fields: Fields::Unit,
            ..
        }) => Vec::new(),
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Params can only be derived for structs with named fields",
            ));
        }
    };

    let krate = quote!(::func_axum);
    let entries = fields
        .iter()
        .map(|field| field_entry(&krate, field))
        .collect::<syn::Result<Vec<_>>>()?;

    if !fields.is_empty() && !has_serde_default(&input.attrs)? {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Params records need `#[serde(default)]` so JSON bodies bind onto the zero value",
        ));
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::Params for #ident #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<#krate::Field<Self>> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}

fn field_entry(krate: &TokenStream2, field: &Field) -> syn::Result<TokenStream2> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let name = ident.unraw().to_string();
    let key = form_key(&field.attrs)?.unwrap_or_else(|| name.clone());
    let ty = &field.ty;
    let type_name = quote!(#ty).to_string().replace(' ', "");

    let entry = match classify(ty) {
        Kind::Int => quote! {
            #krate::Field::int(#name, #key, #type_name, |params: &mut Self, value: i64| {
                params.#ident = <#ty as ::core::convert::TryFrom<i64>>::try_from(value).ok()?;
                ::core::option::Option::Some(())
            })
        },
        Kind::Float => quote! {
            #krate::Field::float(#name, #key, #type_name, |params: &mut Self, value: f64| {
                params.#ident = value;
            })
        },
        Kind::Str => quote! {
            #krate::Field::string(#name, #key, #type_name, |params: &mut Self, value: ::std::string::String| {
                params.#ident = value;
            })
        },
        Kind::StrList => quote! {
            #krate::Field::strings(
                #name,
                #key,
                #type_name,
                |params: &mut Self, value: ::std::vec::Vec<::std::string::String>| {
                    params.#ident = value;
                },
            )
        },
        Kind::Time => quote! {
            #krate::Field::time(
                #name,
                #key,
                #type_name,
                |params: &mut Self, value: #krate::chrono::DateTime<#krate::chrono::Utc>| {
                    params.#ident = <#ty as ::core::convert::From<
                        #krate::chrono::DateTime<#krate::chrono::Utc>,
                    >>::from(value);
                },
            )
        },
        Kind::Unsupported => quote! {
            #krate::Field::unsupported(#name, #key, #type_name)
        },
    };
    Ok(entry)
}

/// Read `#[form = "key"]`, rejecting any other shape of the attribute.
fn form_key(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut key = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        if key.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate `form` attribute"));
        }
        let Meta::NameValue(nv) = &attr.meta else {
            return Err(syn::Error::new_spanned(attr, "expected `#[form = \"key\"]`"));
        };
        match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => key = Some(lit.value()),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected a string literal source key",
                ));
            }
        }
    }
    Ok(key)
}

/// Whether the container carries `#[serde(default)]` or `#[serde(default = "...")]`.
fn has_serde_default(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut found = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                found = true;
            }
            if meta.input.peek(Token![=]) {
                meta.value()?.parse::<Expr>()?;
            } else if meta.input.peek(token::Paren) {
                let content;
                parenthesized!(content in meta.input);
                content.parse::<TokenStream2>()?;
            }
            Ok(())
        })?;
    }
    Ok(found)
}

fn classify(ty: &Type) -> Kind {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return Kind::Unsupported;
    };
    let Some(last) = path.segments.last() else {
        return Kind::Unsupported;
    };
    let bare = matches!(last.arguments, PathArguments::None);

    match last.ident.to_string().as_str() {
        "i8" | "i16" | "i32" | "i64" | "isize" if bare => Kind::Int,
        "f64" if bare => Kind::Float,
        "String" if bare => Kind::Str,
        "SystemTime" if bare => Kind::Time,
        "DateTime" => Kind::Time,
        "Vec" => match single_type_argument(&last.arguments) {
            Some(inner) if classify(inner) == Kind::Str => Kind::StrList,
            _ => Kind::Unsupported,
        },
        _ => Kind::Unsupported,
    }
}

fn single_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first() {
        Some(GenericArgument::Type(ty)) => Some(ty),
        _ => None,
    }
}
