//! Implementation of the `#[derive(Variables)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use crate::attrs::{KeyEnumAttrs, VariantAttrs, snake_case};

pub fn derive_variables_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_variables_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// One key of the enum and the accessor names generated for it.
struct KeyVariant {
    ident: syn::Ident,
    name: String,
}

pub(crate) fn derive_variables_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Variables cannot be derived for generic types",
        ));
    }

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "Variables can only be derived for enums",
        ));
    };

    let attrs = KeyEnumAttrs::from_attrs(&input.attrs)?;
    let trait_name = attrs
        .accessors
        .unwrap_or_else(|| format_ident!("{}Accessors", name));

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Variables keys must be fieldless variants",
            ));
        }
        let variant_attrs = VariantAttrs::from_attrs(&variant.attrs)?;
        let accessor = variant_attrs
            .rename
            .unwrap_or_else(|| snake_case(&variant.ident.to_string()));
        if variants.iter().any(|v: &KeyVariant| v.name == accessor) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate accessor name `{accessor}`"),
            ));
        }
        variants.push(KeyVariant {
            ident: variant.ident.clone(),
            name: accessor,
        });
    }

    let key_impl = generate_key_impl(name, &variants);
    let accessors = generate_accessors(vis, name, &trait_name, &variants);

    Ok(quote! {
        #key_impl
        #accessors
    })
}

/// Generate `ALL` and `name()` on the key enum.
fn generate_key_impl(name: &syn::Ident, variants: &[KeyVariant]) -> TokenStream2 {
    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let names: Vec<_> = variants.iter().map(|v| v.name.as_str()).collect();

    quote! {
        impl #name {
            /// Every key, in declaration order.
            pub const ALL: &'static [#name] = &[#(#name::#idents),*];

            /// Accessor name of this key.
            pub fn name(&self) -> &'static str {
                match self {
                    #(#name::#idents => #names,)*
                }
            }
        }
    }
}

/// Generate the accessor trait and its blanket implementation.
fn generate_accessors(
    vis: &syn::Visibility,
    name: &syn::Ident,
    trait_name: &syn::Ident,
    variants: &[KeyVariant],
) -> TokenStream2 {
    let methods = variants.iter().map(|v| {
        let ident = &v.ident;
        let getter = format_ident!("{}", v.name);
        let setter = format_ident!("set_{}", v.name);
        let get_doc = format!("Active value of `{}::{}`.", name, ident);
        let set_doc = format!("Overwrite the active value of `{}::{}`.", name, ident);

        quote! {
            #[doc = #get_doc]
            fn #getter(&self) -> ::fluidvar::BindingResult<V> {
                ::fluidvar::BindingStore::read(self, &#name::#ident)
            }

            #[doc = #set_doc]
            fn #setter(&mut self, value: V) -> ::fluidvar::BindingResult<V> {
                ::fluidvar::BindingStore::write(self, &#name::#ident, value)
            }
        }
    });

    let trait_doc = format!("Typed accessors for the `{}` keys.", name);

    quote! {
        #[doc = #trait_doc]
        #vis trait #trait_name<V>: ::fluidvar::BindingStore<#name, V> {
            #(#methods)*
        }

        impl<V, S> #trait_name<V> for S where S: ::fluidvar::BindingStore<#name, V> + ?Sized {}
    }
}
