use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{spanned::Spanned as _, Data, DataStruct, DeriveInput, Index, LitStr, Member};

use crate::injectable::attr::{parse_field_attrs, parse_struct_attrs, InjectArgs, InjectableArgs};

mod attr;

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let DeriveInput {
        attrs,
        ident,
        generics,
        data,
        ..
    } = input;

    let Data::Struct(DataStruct { fields, .. }) = data else {
        return Err(syn::Error::new(ident.span(), "`Injectable` can only be derived for structs"));
    };

    let lifecycle = match parse_struct_attrs(&attrs).transpose()? {
        Some(InjectableArgs {
            lifecycle: Some((_, enabled)),
        }) => enabled.value,
        _ => false,
    };

    let mut points = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let Some(InjectArgs { qualifier, required }) = parse_field_attrs(&field.attrs).transpose()? else {
            continue;
        };
        let Some((_, qualifier)) = qualifier else {
            return Err(syn::Error::new_spanned(field, "missing qualifier, expected `#[inject(\"qualifier\")]`"));
        };
        let required = required.is_some_and(|(_, value)| value.value);

        let (member, name) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), LitStr::new(&ident.to_string(), ident.span())),
            None => (Member::Unnamed(Index::from(index)), LitStr::new(&index.to_string(), field.span())),
        };
        let ty = &field.ty;

        points.push(quote_spanned! { field.span() =>
            ::wirekit::InjectionPoint::<Self>::new::<#ty>(#name, #qualifier, |target| &mut target.#member).required(#required)
        });
    }

    let lifecycle = lifecycle.then(|| {
        quote! {
            fn lifecycle(&self) -> ::core::option::Option<&dyn ::wirekit::Lifecycle> {
                ::core::option::Option::Some(self)
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::wirekit::Injectable for #ident #ty_generics #where_clause {
            fn injection_points() -> ::wirekit::macros_utils::Vec<::wirekit::InjectionPoint<Self>> {
                ::wirekit::macros_utils::vec![#(#points),*]
            }

            #lifecycle
        }
    })
}
