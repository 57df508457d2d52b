use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

/// Derive the `Component` trait for a struct or enum.
///
/// By default the generated implementation makes the type duplicatable by
/// cloning it, which requires the type to implement `Clone`. Types holding
/// resources that must not be copied (GPU handles and the like) can opt out
/// with `#[component(no_duplicate)]`, in which case the registry's
/// `duplicate` operation skips them.
pub fn derive_component(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    // Get the type name we are annotating
    let type_name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    // Scan for a `#[component(no_duplicate)]` attribute on the type.
    let mut no_duplicate = false;
    for attr in &ast.attrs {
        if attr.path().is_ident("component") {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("no_duplicate") {
                    no_duplicate = true;
                }
                Ok(())
            });
        }
    }

    // Use ::ember_ecs::registry::Component which works both inside and outside the crate.
    // Inside the crate, this works because of `extern crate self as ember_ecs;` in lib.rs
    // Outside the crate, this naturally resolves to the ember_ecs dependency.
    let body = if no_duplicate {
        quote! {}
    } else {
        quote! {
            fn duplicate(&self) -> ::core::option::Option<Self> {
                ::core::option::Option::Some(::core::clone::Clone::clone(self))
            }
        }
    };

    TokenStream::from(quote! {
        impl #impl_generics ::ember_ecs::registry::Component for #type_name #ty_generics #where_clause {
            #body
        }
    })
}
