//! Proc macros for the jconf crate.
//!
//! This crate provides the `#[derive(Config)]` macro and the
//! `#[migration(...)]` attribute.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Expr, Ident, ItemFn, Lit, LitStr, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
    spanned::Spanned,
};

fn is_well_formed(version: &str) -> bool {
    let segments: Vec<&str> = version.split('.').collect();
    segments.len() == 3
        && segments
            .iter()
            .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

fn check_version(lit: &LitStr) -> syn::Result<()> {
    match is_well_formed(&lit.value()) {
        true => Ok(()),
        false => Err(syn::Error::new(
            lit.span(),
            "version must have the form MAJOR.MINOR.PATCH",
        )),
    }
}

/// Configuration options parsed from `#[config(...)]` attribute.
struct ConfigOptions {
    config_type: LitStr,
    version: LitStr,
}

impl ConfigOptions {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut config_type = None;
        let mut version = None;

        for attr in attrs {
            if attr.path().is_ident("config") {
                attr.parse_nested_meta(|meta| {
                    let slot = if meta.path.is_ident("config_type") {
                        &mut config_type
                    } else if meta.path.is_ident("version") {
                        &mut version
                    } else {
                        return Err(syn::Error::new(
                            meta.path.span(),
                            format!("unknown config attribute: {:?}", meta.path.get_ident()),
                        ));
                    };

                    let value: Expr = meta.value()?.parse()?;
                    match value {
                        Expr::Lit(syn::ExprLit {
                            lit: Lit::Str(lit_str),
                            ..
                        }) => {
                            *slot = Some(lit_str);
                            Ok(())
                        }
                        other => Err(syn::Error::new(other.span(), "expected a string literal")),
                    }
                })?;
            }
        }

        let config_type = config_type.ok_or_else(|| {
            syn::Error::new(
                proc_macro2::Span::call_site(),
                "missing required attribute: #[config(config_type = \"...\")]",
            )
        })?;

        let version = version.ok_or_else(|| {
            syn::Error::new(
                proc_macro2::Span::call_site(),
                "missing required attribute: #[config(version = \"...\")]",
            )
        })?;
        check_version(&version)?;

        Ok(Self {
            config_type,
            version,
        })
    }
}

/// Derive macro for the `Config` trait.
///
/// # Example
///
/// ```rust,ignore
/// use jconf::Config;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize, Config)]
/// #[config(config_type = "WsgiServer", version = "1.0.0")]
/// struct WsgiServer {
///     #[serde(rename = "@api")]
///     api: jconf::ApiEnvelope,
///     server: Server,
/// }
/// ```
///
/// This expands to:
///
/// ```rust,ignore
/// impl jconf::Config for WsgiServer {
///     const CONFIG_TYPE: &'static str = "WsgiServer";
///     const VERSION: &'static str = "1.0.0";
/// }
/// ```
#[proc_macro_derive(Config, attributes(config))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_config_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_config_impl(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let options = ConfigOptions::from_attrs(&input.attrs)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let config_type = &options.config_type;
    let version = &options.version;

    Ok(quote! {
        impl #impl_generics ::jconf::Config for #name #ty_generics #where_clause {
            const CONFIG_TYPE: &'static str = #config_type;
            const VERSION: &'static str = #version;
        }
    })
}

/// Parsed arguments of #[migration(...)]
struct MigrationArgs {
    config_type: LitStr,
    from: LitStr,
    to: LitStr,
}

impl Parse for MigrationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut config_type = None;
        let mut from = None;
        let mut to = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            if ident == "config_type" {
                config_type = Some(input.parse()?);
            } else if ident == "from" {
                from = Some(input.parse()?);
            } else if ident == "to" {
                to = Some(input.parse()?);
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    "expected `config_type`, `from` or `to`",
                ));
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        let missing = |name: &str| {
            syn::Error::new(
                proc_macro2::Span::call_site(),
                format!("missing required argument: {name} = \"...\""),
            )
        };
        let config_type: LitStr = config_type.ok_or_else(|| missing("config_type"))?;
        let from: LitStr = from.ok_or_else(|| missing("from"))?;
        let to: LitStr = to.ok_or_else(|| missing("to"))?;
        check_version(&from)?;
        check_version(&to)?;

        Ok(Self {
            config_type,
            from,
            to,
        })
    }
}

/// Submits a migration function for discovery.
///
/// ```rust,ignore
/// #[jconf::migration(config_type = "TestConfig", from = "1.0.0", to = "1.0.1")]
/// fn rename_child_nodes(document: Document) -> Result<Document, BoxError> {
///     ...
/// }
/// ```
#[proc_macro_attribute]
pub fn migration(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as MigrationArgs);
    let function = parse_macro_input!(item as ItemFn);

    let ident = &function.sig.ident;
    let MigrationArgs {
        config_type,
        from,
        to,
    } = &args;

    quote! {
        #function

        ::jconf::inventory::submit! {
            ::jconf::RegisteredMigration::new(#config_type, #from, #to, #ident)
        }
    }
    .into()
}
