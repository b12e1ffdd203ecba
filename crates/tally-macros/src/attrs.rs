//! Parsing of `#[filter(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

const EXPECTED: &str = "String, Number, Timestamp, Enum, Bool";

/// Kind of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
}

impl FilterKind {
    fn parse_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" | "Text" | "text" => Ok(FilterKind::String),
            "Number" | "number" => Ok(FilterKind::Number),
            "Timestamp" | "timestamp" | "Time" | "time" => Ok(FilterKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(FilterKind::Enum),
            "Bool" | "bool" | "boolean" | "Flag" | "flag" => Ok(FilterKind::Bool),
            other => Err(Error::new(
                span,
                format!("unknown filter kind '{other}', expected one of: {EXPECTED}"),
            )),
        }
    }

    pub fn from_ident(ident: &Ident) -> Result<Self> {
        Self::parse_name(&ident.to_string(), ident.span())
    }
}

/// Parsed `#[filter(...)]` attribute.
#[derive(Debug, Clone)]
pub struct FilterAttr {
    pub kind: Option<FilterKind>,
    pub skip: bool,
    pub rename: Option<String>,
}

impl Parse for FilterAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FilterAttr {
            kind: None,
            skip: false,
            rename: None,
        };

        let metas: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;
        for meta in metas {
            match &meta {
                Meta::Path(path) if path.is_ident("skip") => attr.skip = true,
                Meta::Path(path) => {
                    let ident = path.get_ident().ok_or_else(|| {
                        Error::new(path.span(), format!("expected a filter kind: {EXPECTED}"))
                    })?;
                    attr.set_kind(FilterKind::from_ident(ident)?, ident.span())?;
                }
                Meta::NameValue(nv) => {
                    let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(value),
                        ..
                    }) = &nv.value
                    else {
                        return Err(Error::new(nv.value.span(), "expected a string literal"));
                    };

                    if nv.path.is_ident("rename") {
                        if value.value().trim().is_empty() {
                            return Err(Error::new(value.span(), "rename must not be empty"));
                        }
                        attr.rename = Some(value.value());
                    } else if nv.path.is_ident("ty") {
                        let kind = FilterKind::parse_name(&value.value(), value.span())?;
                        attr.set_kind(kind, value.span())?;
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown key, expected `rename` or `ty`",
                        ));
                    }
                }
                Meta::List(_) => {
                    return Err(Error::new(
                        meta.span(),
                        "unexpected nested list in #[filter(...)]",
                    ));
                }
            }
        }

        if attr.skip && attr.kind.is_some() {
            return Err(Error::new(
                input.span(),
                "`skip` cannot be combined with a filter kind",
            ));
        }
        Ok(attr)
    }
}

impl FilterAttr {
    fn set_kind(&mut self, kind: FilterKind, span: Span) -> Result<()> {
        if self.kind.is_some() {
            return Err(Error::new(span, "filter kind given twice"));
        }
        self.kind = Some(kind);
        Ok(())
    }
}

/// Finds and parses the `#[filter(...)]` attribute of a field, if any.
pub fn parse_filter_attrs(attrs: &[Attribute]) -> Result<Option<FilterAttr>> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("filter")) {
        if found.is_some() {
            return Err(Error::new(attr.span(), "duplicate #[filter] attribute"));
        }
        found = Some(attr.parse_args::<FilterAttr>()?);
    }
    Ok(found)
}
