//! Record derive macro implementation

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Expr, ExprLit, Fields, Lit, LitStr, Meta, Result, Visibility};

/// Field annotation value that leaves a field out of the mapping.
const OMIT: &str = "-";

struct FieldInfo<'a> {
    ident: &'a syn::Ident,
    /// Identifier without the `r#` prefix
    name: String,
    sql_column: Option<String>,
    public: bool,
}

impl FieldInfo<'_> {
    fn is_mapped(&self) -> bool {
        self.public && self.sql_column.as_deref() != Some(OMIT)
    }
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let table_name = get_table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let infos = fields
        .iter()
        .map(|field| {
            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
            Ok(FieldInfo {
                ident,
                name: ident.unraw().to_string(),
                sql_column: get_sql_column(field)?,
                public: matches!(field.vis, Visibility::Public(_)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let field_defs = infos.iter().map(|info| {
        let field_name = &info.name;
        let public = info.public;
        let sql_column = match &info.sql_column {
            Some(tag) => quote! { ::core::option::Option::Some(#tag) },
            None => quote! { ::core::option::Option::None },
        };
        quote! { ::pansql::FieldDef::new(#field_name, #sql_column, #public) }
    });

    let mapped: Vec<&syn::Ident> = infos
        .iter()
        .filter(|info| info.is_mapped())
        .map(|info| info.ident)
        .collect();

    Ok(quote! {
        impl #impl_generics ::pansql::Record for #name #ty_generics #where_clause {
            fn table_name(&self) -> &str {
                #table_name
            }

            fn fields() -> &'static [::pansql::FieldDef] {
                const FIELDS: &[::pansql::FieldDef] = &[#(#field_defs),*];
                FIELDS
            }

            fn values(&self) -> ::std::vec::Vec<::pansql::Value> {
                ::std::vec![
                    #(::pansql::Value::from(::core::clone::Clone::clone(&self.#mapped))),*
                ]
            }

            fn slots(&mut self) -> ::std::vec::Vec<&mut dyn ::pansql::ColumnSlot> {
                ::std::vec![
                    #(&mut self.#mapped as &mut dyn ::pansql::ColumnSlot),*
                ]
            }
        }
    })
}

/// `#[pansql(table = "...")]`, else the struct name in snake_case.
fn get_table_name(input: &DeriveInput) -> Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("pansql") {
            continue;
        }
        let nested = attr.parse_args::<syn::MetaNameValue>()?;
        if !nested.path.is_ident("table") {
            return Err(syn::Error::new_spanned(
                &nested.path,
                "unknown pansql attribute; expected `table = \"...\"`",
            ));
        }
        if let Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) = &nested.value
        {
            return Ok(lit.value());
        }
        return Err(syn::Error::new_spanned(
            &nested.value,
            "table name must be a string literal",
        ));
    }
    Ok(input.ident.unraw().to_string().to_snake_case())
}

/// Supports `#[sql_column = "name"]` and `#[sql_column("name")]`.
fn get_sql_column(field: &syn::Field) -> Result<Option<String>> {
    let mut column: Option<String> = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("sql_column") {
            continue;
        }
        let lit = match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit), ..
                }) => lit.clone(),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "sql_column must be a string literal",
                    ));
                }
            },
            Meta::List(_) => attr.parse_args::<LitStr>()?,
            Meta::Path(_) => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "expected #[sql_column = \"name\"]",
                ));
            }
        };
        if column.replace(lit.value()).is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate sql_column attribute"));
        }
    }
    Ok(column)
}
