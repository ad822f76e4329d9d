use syn::{
    parse::{Parse, ParseStream},
    Attribute, LitBool, LitStr, Token,
};

use crate::attr_parsing::{combine_attribute, parse_assignment_attribute, parse_attrs, parse_flag_attribute, Combine};

pub(crate) mod kw {
    syn::custom_keyword!(qualifier);
    syn::custom_keyword!(required);
    syn::custom_keyword!(lifecycle);
}

/// `#[inject("qualifier", required)]` or `#[inject(qualifier = "qualifier", required = bool)]`
pub(crate) struct InjectArgs {
    pub(super) qualifier: Option<(kw::qualifier, LitStr)>,
    pub(super) required: Option<(kw::required, LitBool)>,
}

impl Parse for InjectArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut qualifier = None;
        let mut required = None;

        if input.peek(LitStr) {
            let value = input.parse::<LitStr>()?;
            qualifier = Some((kw::qualifier(value.span()), value));

            let _ = input.parse::<Token![,]>();
        }

        while !input.is_empty() {
            let lh = input.lookahead1();
            if lh.peek(kw::qualifier) {
                parse_assignment_attribute(input, &mut qualifier)?;
            } else if lh.peek(kw::required) {
                parse_flag_attribute(input, &mut required)?;
            } else {
                return Err(lh.error());
            }

            let _ = input.parse::<Token![,]>();
        }

        Ok(Self { qualifier, required })
    }
}

impl Combine for InjectArgs {
    fn combine(mut self, other: Self) -> syn::Result<Self> {
        let Self { qualifier, required } = other;
        combine_attribute(&mut self.qualifier, qualifier)?;
        combine_attribute(&mut self.required, required)?;
        Ok(self)
    }
}

/// `#[injectable(lifecycle)]`
pub(crate) struct InjectableArgs {
    pub(super) lifecycle: Option<(kw::lifecycle, LitBool)>,
}

impl Parse for InjectableArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut lifecycle = None;

        while !input.is_empty() {
            let lh = input.lookahead1();
            if lh.peek(kw::lifecycle) {
                parse_flag_attribute(input, &mut lifecycle)?;
            } else {
                return Err(lh.error());
            }

            let _ = input.parse::<Token![,]>();
        }

        Ok(Self { lifecycle })
    }
}

impl Combine for InjectableArgs {
    fn combine(mut self, other: Self) -> syn::Result<Self> {
        combine_attribute(&mut self.lifecycle, other.lifecycle)?;
        Ok(self)
    }
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> Option<syn::Result<InjectArgs>> {
    parse_attrs("inject", attrs)
}

pub(crate) fn parse_struct_attrs(attrs: &[Attribute]) -> Option<syn::Result<InjectableArgs>> {
    parse_attrs("injectable", attrs)
}
