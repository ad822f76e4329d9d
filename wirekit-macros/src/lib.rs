use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use std::env::var_os;
use syn::parse::Parse;

mod attr_parsing;
mod injectable;

/// Implements `wirekit::Injectable` for a struct.
///
/// Field attributes:
/// - `#[inject("qualifier")]` or `#[inject(qualifier = "qualifier")]` marks the field as an injection point
/// - `required` or `required = bool` inside `#[inject(...)]` makes a resolution failure abort the injection
///
/// Fields without `#[inject]` are left untouched.
/// Injected fields need to be of type `Option<Arc<T>>` or `Option<wirekit::Instance>`.
/// A dependency hidden behind a trait is declared as `Option<Arc<Box<dyn Trait>>>`
/// and registered as `Arc::new(Box::new(value) as Box<dyn Trait>)`,
/// registering the concrete type instead fails the injection with `TypeMismatch`.
///
/// Struct attributes:
/// - `#[injectable(lifecycle)]` calls the struct's `wirekit::Lifecycle` implementation after injection
#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(item: TokenStream) -> TokenStream {
    expand_with(item, injectable::expand)
}

fn expand_with<F, I, K>(input: TokenStream, f: F) -> TokenStream
where
    F: FnOnce(I) -> syn::Result<K>,
    I: Parse,
    K: ToTokens,
{
    expand(syn::parse(input).and_then(f))
}

fn expand<T>(result: syn::Result<T>) -> TokenStream
where
    T: ToTokens,
{
    match result {
        Ok(tokens) => {
            let tokens = (quote! { #tokens }).into();
            if var_os("MACROS_DEBUG").is_some() {
                eprintln!("{tokens}");
            }
            tokens
        }
        Err(err) => err.into_compile_error().into(),
    }
}
