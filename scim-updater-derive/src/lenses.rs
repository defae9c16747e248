//! Implementation of the `#[derive(Lenses)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Generics, Ident};

/// Main implementation of the Lenses derive macro.
pub fn derive_lenses_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;

    let expanded = match &input.data {
        Data::Struct(data_struct) => generate_struct_lenses(name, generics, &data_struct.fields),
        Data::Enum(_) => syn::Error::new_spanned(
            &input.ident,
            "Lenses can only be derived for structs, not enums.",
        )
        .to_compile_error(),
        Data::Union(_) => {
            syn::Error::new_spanned(&input.ident, "Lenses cannot be derived for unions.")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

/// Returns whether the field carries `#[lenses(skip)]`.
fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attribute in &field.attrs {
        if !attribute.path().is_ident("lenses") {
            continue;
        }
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported lenses attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

fn generate_field_lens(field: &Field) -> syn::Result<Option<TokenStream2>> {
    if is_skipped(field)? {
        return Ok(None);
    }

    let Some(field_name) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "named field without an identifier"));
    };
    let field_type = &field.ty;
    let method_name = format_ident!("{}_lens", field_name);
    let doc = format!(" Returns a lens focusing on the `{field_name}` field.");

    Ok(Some(quote! {
        #[doc = #doc]
        #[inline]
        #[must_use]
        pub fn #method_name() -> impl ::scim_updater::optics::Lens<Self, #field_type> + Clone {
            ::scim_updater::optics::FunctionLens::new(
                |source: &Self| &source.#field_name,
                |source: &mut Self| &mut source.#field_name,
            )
        }
    }))
}

/// Generates lens methods for a struct's fields.
fn generate_struct_lenses(name: &Ident, generics: &Generics, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Named(named_fields) => {
            let lens_methods: syn::Result<Vec<TokenStream2>> = named_fields
                .named
                .iter()
                .filter_map(|field| generate_field_lens(field).transpose())
                .collect();

            let lens_methods = match lens_methods {
                Ok(methods) => methods,
                Err(error) => return error.to_compile_error(),
            };

            let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

            quote! {
                impl #impl_generics #name #type_generics #where_clause {
                    #(#lens_methods)*
                }
            }
        }
        Fields::Unnamed(_) => syn::Error::new_spanned(
            name,
            "Lenses can only be derived for structs with named fields, not tuple structs.",
        )
        .to_compile_error(),
        Fields::Unit => syn::Error::new_spanned(
            name,
            "Lenses cannot be derived for unit structs (structs with no fields).",
        )
        .to_compile_error(),
    }
}
