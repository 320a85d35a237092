//! Derive macros for deploycfg
//!
//! This crate provides `#[derive(DeploymentSchema)]`, which turns an
//! annotated struct into a deployment schema plus a typed constructor from
//! a resolved configuration.
//!
//! # Usage
//!
//! ```text
//! use deploycfg::DeploymentSchema;
//!
//! #[derive(DeploymentSchema, Default)]
//! #[schema(section = "gitlab_rails")]
//! struct Database {
//!     #[setting(env = "GITLAB_DB_HOST")]
//!     db_host: String,
//!
//!     #[setting(env = "GITLAB_DB_PORT", min = 1, max = 65535)]
//!     db_port: u16,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type, UnOp, parse_macro_input,
    punctuated::Punctuated, spanned::Spanned,
};

/// Derive macro for generating `DeploymentSchema` implementations.
///
/// The struct must implement `Default`; defaults of non-required fields are
/// taken from it.
///
/// # Attributes
///
/// ## Container attributes (`#[schema(...)]`)
/// - `section = "name"` - Key prefix for all fields (`name.field`)
///
/// ## Field attributes (`#[setting(...)]`)
/// - `key = "a.b"` - Full key override
/// - `env = "VAR"` - Environment variable overriding the default
/// - `min = 1` / `max = 65535` - Integer range, narrowed to the bounds of
///   the field type (a `u16` field is always `0..=65535`)
/// - `pattern = "^https?://"` - Regex for string fields
/// - `description = "..."` - Help text
/// - `secret` - Redact when printed or exported
/// - `required` - No default; resolution fails without the env var
/// - `skip` - Not part of the schema; taken from the struct's `Default`
///
/// Fields of any other named type are treated as nested structs that also
/// derive `DeploymentSchema`; their settings are appended in place.
#[proc_macro_derive(DeploymentSchema, attributes(schema, setting))]
pub fn derive_deployment_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "DeploymentSchema can only be derived for structs with named fields.\n\nExample:\n  #[derive(DeploymentSchema)]\n  struct MySettings {\n      field: Type,\n  }",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "DeploymentSchema can only be derived for structs.\n\nTry: #[derive(DeploymentSchema)] on a struct, not an enum or union.",
            ));
        }
    };

    let mut spec_entries = Vec::new();
    let mut field_inits = Vec::new();
    let mut has_skipped = false;

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let attrs = parse_field_attrs(&field.attrs)?;

        if attrs.skip {
            has_skipped = true;
            continue;
        }

        let kind = match field_kind(field_type) {
            Some(kind) => kind,
            None if is_nested_struct(field_type) => {
                spec_entries.push(quote! {
                    specs.extend(<#field_type as deploycfg::DeploymentSchema>::settings());
                });
                field_inits.push(quote! {
                    #field_name: <#field_type as deploycfg::DeploymentSchema>::from_resolved(config)?
                });
                continue;
            }
            None => {
                return Err(syn::Error::new_spanned(
                    field_type,
                    "unsupported setting type; use bool, String, an integer primitive or a nested DeploymentSchema struct",
                ));
            }
        };

        let key = attrs.key.clone().unwrap_or_else(|| match &container.section {
            Some(section) => format!("{section}.{field_name}"),
            None => field_name.to_string(),
        });

        let constructor = spec_constructor(kind, &key, field_name, attrs.required);
        let modifiers = spec_modifiers(kind, &attrs);
        spec_entries.push(quote! {
            specs.push({ #constructor } #(#modifiers)*);
        });

        field_inits.push(field_init(kind, &key, field_name, field_type));
    }

    // Skipped fields keep the value from the struct's own `Default`
    let rest = has_skipped.then(|| quote! { ..<#name as ::core::default::Default>::default() });

    Ok(quote! {
        impl deploycfg::DeploymentSchema for #name {
            fn settings() -> ::std::vec::Vec<deploycfg::SettingSpec> {
                #[allow(unused_variables)]
                let defaults = <#name as ::core::default::Default>::default();
                let mut specs = ::std::vec::Vec::new();
                #(#spec_entries)*
                specs
            }

            #[allow(unused_variables)]
            fn from_resolved(config: &deploycfg::ResolvedConfig) -> deploycfg::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#field_inits,)*
                    #rest
                })
            }
        }
    })
}

#[derive(Clone, Copy)]
enum Kind {
    Boolean,
    String,
    /// Bounds of the field type, clamped to `i64`
    Integer { min: i64, max: i64 },
}

fn spec_constructor(kind: Kind, key: &str, field_name: &Ident, required: bool) -> TokenStream2 {
    if required {
        let kind = match kind {
            Kind::Boolean => quote! { deploycfg::SettingKind::Boolean },
            Kind::String => quote! { deploycfg::SettingKind::String },
            Kind::Integer { .. } => quote! { deploycfg::SettingKind::Integer },
        };
        return quote! { deploycfg::SettingSpec::required(#key, #kind) };
    }

    match kind {
        Kind::Boolean => quote! { deploycfg::SettingSpec::boolean(#key, defaults.#field_name) },
        Kind::String => {
            quote! { deploycfg::SettingSpec::string(#key, defaults.#field_name.clone()) }
        }
        Kind::Integer { .. } => {
            quote! { deploycfg::SettingSpec::integer(#key, defaults.#field_name as i64) }
        }
    }
}

fn spec_modifiers(kind: Kind, attrs: &FieldAttrs) -> Vec<TokenStream2> {
    let mut modifiers = Vec::new();

    if let Some(env) = &attrs.env {
        modifiers.push(quote! { .env(#env) });
    }

    // Integer fields are always bounded by their type so that values which
    // would not fit fail during resolution with every other error.
    let (min, max) = match kind {
        Kind::Integer { min, max } => (
            Some(attrs.min.map_or(min, |m| m.max(min))),
            Some(attrs.max.map_or(max, |m| m.min(max))),
        ),
        _ => (attrs.min, attrs.max),
    };
    if let Some(min) = min.filter(|&m| m != i64::MIN) {
        modifiers.push(quote! { .min(#min) });
    }
    if let Some(max) = max.filter(|&m| m != i64::MAX) {
        modifiers.push(quote! { .max(#max) });
    }
    if let Some(pattern) = &attrs.pattern {
        modifiers.push(quote! { .pattern(#pattern) });
    }
    if let Some(desc) = &attrs.description {
        modifiers.push(quote! { .description(#desc) });
    }
    if attrs.secret {
        modifiers.push(quote! { .secret() });
    }

    modifiers
}

fn field_init(kind: Kind, key: &str, field_name: &Ident, field_type: &Type) -> TokenStream2 {
    match kind {
        Kind::Boolean => quote! { #field_name: config.get_bool(#key)? },
        Kind::String => quote! { #field_name: config.get_str(#key)?.to_string() },
        Kind::Integer { .. } => quote! { #field_name: config.get_int_as::<#field_type>(#key)? },
    }
}

/// Container-level attributes from #[schema(...)]
#[derive(Default)]
struct ContainerAttrs {
    section: Option<String>,
}

/// Field-level attributes from #[setting(...)]
#[derive(Default)]
struct FieldAttrs {
    key: Option<String>,
    env: Option<String>,
    description: Option<String>,
    pattern: Option<String>,
    min: Option<i64>,
    max: Option<i64>,
    secret: bool,
    required: bool,
    skip: bool,
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("schema")) {
        let nested = attr.parse_args_with(Punctuated::<Meta, syn::Token![,]>::parse_terminated)?;
        for meta in nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("section") => {
                    result.section = Some(lit_str(&nv.value, "section")?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown schema attribute.\n\nExample: #[schema(section = \"gitlab_rails\")]",
                    ));
                }
            }
        }
    }

    Ok(result)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("setting")) {
        let nested = attr.parse_args_with(Punctuated::<Meta, syn::Token![,]>::parse_terminated)?;
        for meta in nested {
            match &meta {
                Meta::Path(path) if path.is_ident("secret") => result.secret = true,
                Meta::Path(path) if path.is_ident("required") => result.required = true,
                Meta::Path(path) if path.is_ident("skip") => result.skip = true,
                Meta::NameValue(nv) => {
                    let value = &nv.value;
                    if nv.path.is_ident("key") {
                        result.key = Some(lit_str(value, "key")?);
                    } else if nv.path.is_ident("env") {
                        result.env = Some(lit_str(value, "env")?);
                    } else if nv.path.is_ident("description") {
                        result.description = Some(lit_str(value, "description")?);
                    } else if nv.path.is_ident("pattern") {
                        result.pattern = Some(lit_str(value, "pattern")?);
                    } else if nv.path.is_ident("min") {
                        result.min = Some(lit_int(value, "min")?);
                    } else if nv.path.is_ident("max") {
                        result.max = Some(lit_int(value, "max")?);
                    } else {
                        return Err(syn::Error::new_spanned(&nv.path, "unknown setting attribute"));
                    }
                }
                other => {
                    return Err(syn::Error::new_spanned(other, "unknown setting attribute"));
                }
            }
        }
    }

    Ok(result)
}

fn lit_str(expr: &Expr, name: &str) -> syn::Result<String> {
    if let Expr::Lit(lit) = expr {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new(
        expr.span(),
        format!("#[setting({name})] must be a string literal.\n\nExample: #[setting({name} = \"...\")]"),
    ))
}

fn lit_int(expr: &Expr, name: &str) -> syn::Result<i64> {
    match expr {
        Expr::Lit(lit) => {
            if let Lit::Int(i) = &lit.lit {
                return i.base10_parse::<i64>();
            }
        }
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            return lit_int(&unary.expr, name).map(|v| -v);
        }
        _ => {}
    }
    Err(syn::Error::new(
        expr.span(),
        format!("#[setting({name})] must be an integer.\n\nExample: #[setting({name} = 1)]"),
    ))
}

/// Map a primitive field type to its setting kind
fn field_kind(ty: &Type) -> Option<Kind> {
    let Type::Path(path) = ty else {
        return None;
    };
    let ident = path.path.get_ident()?;
    match ident.to_string().as_str() {
        "bool" => Some(Kind::Boolean),
        "String" => Some(Kind::String),
        "i8" => Some(int_kind(i8::MIN.into(), i8::MAX.into())),
        "i16" => Some(int_kind(i16::MIN.into(), i16::MAX.into())),
        "i32" => Some(int_kind(i32::MIN.into(), i32::MAX.into())),
        "u8" => Some(int_kind(0, u8::MAX.into())),
        "u16" => Some(int_kind(0, u16::MAX.into())),
        "u32" => Some(int_kind(0, u32::MAX.into())),
        // isize/usize use the 64-bit bounds; narrower targets still fail in
        // `get_int_as`.
        "i64" | "isize" => Some(int_kind(i64::MIN, i64::MAX)),
        "u64" | "usize" => Some(int_kind(0, i64::MAX)),
        _ => None,
    }
}

fn int_kind(min: i64, max: i64) -> Kind {
    Kind::Integer { min, max }
}

/// Check if a type is likely a nested struct (a bare, non-generic path)
fn is_nested_struct(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    let Some(last) = path.path.segments.last() else {
        return false;
    };
    last.arguments.is_none()
        && !matches!(
            last.ident.to_string().as_str(),
            "f32" | "f64" | "char" | "str" | "i128" | "u128"
        )
}
