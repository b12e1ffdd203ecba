//! Implementation of `#[derive(Filterable)]`.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Result,
    Type,
};

use crate::attrs::{parse_filter_attrs, FilterKind};

pub fn filterable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Filterable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Filterable can only be derived for structs",
            ))
        }
    };

    let mut names: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();

    for field in fields {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let Some(attr) = parse_filter_attrs(&field.attrs)? else {
            continue;
        };
        if attr.skip {
            continue;
        }
        let Some(kind) = attr.kind else {
            return Err(Error::new(
                field.span(),
                "#[filter(...)] needs a kind: String, Number, Timestamp, Enum or Bool",
            ));
        };

        let name = attr.rename.unwrap_or_else(|| field_ident.to_string());
        if !seen.insert(name.clone()) {
            return Err(Error::new(
                field.span(),
                format!("duplicate filter field name '{name}'"),
            ));
        }

        let (inner_ty, optional) = match option_inner(&field.ty) {
            Some(inner) => (inner, true),
            None => (&field.ty, false),
        };

        let const_ident = format_ident!("{}", to_screaming_snake_case(&name));
        let kind_ty = kind_marker(kind, inner_ty);
        let doc = format!("Typed handle for the `{name}` field.");
        field_constants.push(quote! {
            #[doc = #doc]
            pub const #const_ident: ::tally_spec::Field<Self, #kind_ty> =
                ::tally_spec::Field::new(#name);
        });

        let value = if optional {
            let read = read_value(kind, quote! { value });
            quote! {
                match &self.#field_ident {
                    ::core::option::Option::Some(value) => #read,
                    ::core::option::Option::None => ::tally_spec::Value::None,
                }
            }
        } else {
            read_value(kind, quote! { (&self.#field_ident) })
        };
        field_matches.push(quote! { #name => #value, });
        names.push(name);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::tally_spec::Filterable for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::tally_spec::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => ::tally_spec::Value::None,
                }
            }

            fn filter_fields() -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    })
}

/// Expression reading a value of `kind` from `place`, a `&T` expression.
fn read_value(kind: FilterKind, place: TokenStream) -> TokenStream {
    match kind {
        FilterKind::String => quote! {
            ::tally_spec::Value::String(::core::convert::AsRef::<str>::as_ref(#place))
        },
        FilterKind::Number => quote! {
            ::tally_spec::Value::Number(::tally_spec::Number::from(*#place))
        },
        FilterKind::Timestamp => quote! {
            ::tally_spec::Value::Timestamp(::tally_spec::FilterTimestamp::filter_timestamp(#place))
        },
        FilterKind::Enum => quote! {
            ::tally_spec::Value::Enum(::tally_spec::FilterEnum::discriminant(#place))
        },
        FilterKind::Bool => quote! {
            ::tally_spec::Value::Bool(*#place)
        },
    }
}

fn kind_marker(kind: FilterKind, ty: &Type) -> TokenStream {
    match kind {
        FilterKind::String => quote! { ::tally_spec::kind::Text },
        FilterKind::Number => quote! { ::tally_spec::kind::Number },
        FilterKind::Timestamp => quote! { ::tally_spec::kind::Time },
        FilterKind::Enum => quote! { ::tally_spec::kind::Enum<#ty> },
        FilterKind::Bool => quote! { ::tally_spec::kind::Flag },
    }
}

/// Returns `T` if `ty` is spelled `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
