use heck::ToUpperCamelCase;
use proc_macro_error2::abort;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Ident, LitStr};

/// Tenant dimension.
#[derive(Debug, PartialEq, Eq)]
enum Tenant {
    Column(String),
    Unscoped,
}

#[derive(Debug, PartialEq, Eq)]
enum Timestamps {
    Columns { created_at: String, updated_at: String },
    None,
}

#[derive(Debug, PartialEq, Eq)]
struct TenancyConfig {
    tenant: Tenant,
    id_col: Option<String>,
    timestamps: Timestamps,
}

/// Raw attribute values before the one-choice-per-dimension check.
#[derive(Default)]
struct RawAttrs {
    tenant_col: Option<(String, Span)>,
    unscoped: Option<Span>,
    id_col: Option<(String, Span)>,
    no_id: Option<Span>,
    timestamps: Option<Span>,
    created_at: Option<(String, Span)>,
    updated_at: Option<(String, Span)>,
    no_timestamps: Option<Span>,
}

pub fn expand(input: &DeriveInput) -> TokenStream {
    match parse_config(input) {
        Ok(config) => generate(&config, input.ident.span()),
        Err(err) => abort!(err.span(), "{}", err),
    }
}

fn parse_config(input: &DeriveInput) -> syn::Result<TenancyConfig> {
    if !matches!(input.data, Data::Struct(_)) {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(Scopable)] can only be applied to structs",
        ));
    }
    let raw = parse_attrs(input)?;
    let span = input.ident.span();

    let tenant = match (raw.tenant_col, raw.unscoped) {
        (Some((col, _)), None) => Tenant::Column(col),
        (None, Some(_)) => Tenant::Unscoped,
        (None, None) => {
            return Err(syn::Error::new(
                span,
                "tenancy: missing explicit decision for tenant: use `tenant_col = \"...\"` or `unscoped`",
            ));
        }
        (Some((_, col_span)), Some(_)) => {
            return Err(syn::Error::new(
                col_span,
                "tenancy: specify either `tenant_col` or `unscoped`, not both",
            ));
        }
    };

    let id_col = match (raw.id_col, raw.no_id) {
        (Some((col, _)), None) => Some(col),
        (None, Some(_)) => None,
        (None, None) => {
            return Err(syn::Error::new(
                span,
                "tenancy: missing explicit decision for id: use `id_col = \"...\"` or `no_id`",
            ));
        }
        (Some((_, col_span)), Some(_)) => {
            return Err(syn::Error::new(
                col_span,
                "tenancy: specify either `id_col` or `no_id`, not both",
            ));
        }
    };

    let timestamps = match (raw.timestamps, raw.created_at, raw.updated_at, raw.no_timestamps) {
        (Some(_), None, None, None) => Timestamps::Columns {
            created_at: "created_at".to_owned(),
            updated_at: "updated_at".to_owned(),
        },
        (None, Some((created_at, _)), Some((updated_at, _)), None) => Timestamps::Columns {
            created_at,
            updated_at,
        },
        (None, None, None, Some(_)) => Timestamps::None,
        (None, None, None, None) => {
            return Err(syn::Error::new(
                span,
                "tenancy: missing explicit decision for timestamps: use `timestamps`, \
                 `created_at = \"...\", updated_at = \"...\"`, or `no_timestamps`",
            ));
        }
        (None, Some(_), None, None) | (None, None, Some(_), None) => {
            return Err(syn::Error::new(
                span,
                "tenancy: `created_at` and `updated_at` must be given together",
            ));
        }
        _ => {
            return Err(syn::Error::new(
                span,
                "tenancy: choose exactly one of `timestamps`, `created_at`/`updated_at`, `no_timestamps`",
            ));
        }
    };

    Ok(TenancyConfig {
        tenant,
        id_col,
        timestamps,
    })
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str, span: Span) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(span, format!("duplicate attribute '{name}'")));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_attrs(input: &DeriveInput) -> syn::Result<RawAttrs> {
    let mut raw = RawAttrs::default();

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("tenancy")) {
        attr.parse_nested_meta(|meta| {
            let span = meta.path.span();
            let Some(key) = meta.path.get_ident().map(ToString::to_string) else {
                return Err(meta.error("expected attribute name"));
            };

            match key.as_str() {
                "unscoped" => set_once(&mut raw.unscoped, span, &key, span),
                "no_id" => set_once(&mut raw.no_id, span, &key, span),
                "timestamps" => set_once(&mut raw.timestamps, span, &key, span),
                "no_timestamps" => set_once(&mut raw.no_timestamps, span, &key, span),
                "tenant_col" | "id_col" | "created_at" | "updated_at" => {
                    let value = meta.value()?.parse::<LitStr>()?.value();
                    if value.is_empty() {
                        return Err(meta.error("column name must not be empty"));
                    }
                    let slot = match key.as_str() {
                        "tenant_col" => &mut raw.tenant_col,
                        "id_col" => &mut raw.id_col,
                        "created_at" => &mut raw.created_at,
                        _ => &mut raw.updated_at,
                    };
                    set_once(slot, (value, span), &key, span)
                }
                _ => Err(meta.error(format!(
                    "unknown attribute '{key}'. Valid attributes: tenant_col, unscoped, id_col, \
                     no_id, timestamps, created_at, updated_at, no_timestamps"
                ))),
            }
        })?;
    }

    Ok(raw)
}

fn column_variant(col: &str, span: Span) -> Ident {
    Ident::new(&col.to_upper_camel_case(), span)
}

fn generate(config: &TenancyConfig, span: Span) -> TokenStream {
    let scopable = match &config.tenant {
        Tenant::Column(col) => {
            let variant = column_variant(col, span);
            quote! {
                impl ::tenancy_db::scoped::ScopableEntity for Entity {
                    const IS_UNSCOPED: bool = false;

                    fn tenant_col() -> ::core::option::Option<Self::Column> {
                        ::core::option::Option::Some(Column::#variant)
                    }
                }
            }
        }
        Tenant::Unscoped => quote! {
            impl ::tenancy_db::scoped::ScopableEntity for Entity {
                const IS_UNSCOPED: bool = true;

                fn tenant_col() -> ::core::option::Option<Self::Column> {
                    ::core::option::Option::None
                }
            }
        },
    };

    let identified = config.id_col.as_deref().map(|col| {
        let variant = column_variant(col, span);
        quote! {
            impl ::tenancy_db::scoped::IdentifiedEntity for Entity {
                fn id_col() -> Self::Column {
                    Column::#variant
                }
            }
        }
    });

    let timestamped = match &config.timestamps {
        Timestamps::Columns {
            created_at,
            updated_at,
        } => {
            let created = column_variant(created_at, span);
            let updated = column_variant(updated_at, span);
            Some(quote! {
                impl ::tenancy_db::scoped::TimestampedEntity for Entity {
                    fn created_at_col() -> Self::Column {
                        Column::#created
                    }

                    fn updated_at_col() -> Self::Column {
                        Column::#updated
                    }
                }
            })
        }
        Timestamps::None => None,
    };

    quote! {
        #scopable
        #identified
        #timestamped
    }
}
