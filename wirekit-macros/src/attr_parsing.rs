use core::any;
use quote::ToTokens;
use syn::{
    parse::{Parse, ParseStream},
    spanned::Spanned as _,
    LitBool, Token,
};

fn duplicate<K: ToTokens>(kw: K) -> syn::Error {
    let kw_name = any::type_name::<K>().rsplit("::").next().unwrap_or_default();
    syn::Error::new_spanned(kw, ["`", kw_name, "` specified more than once"].concat())
}

/// Parses `kw = value`
pub(crate) fn parse_assignment_attribute<K, T>(input: ParseStream<'_>, out: &mut Option<(K, T)>) -> syn::Result<()>
where
    K: Parse + ToTokens,
    T: Parse,
{
    let kw = input.parse()?;
    input.parse::<Token![=]>()?;
    let value = input.parse()?;

    if out.is_some() {
        return Err(duplicate(kw));
    }
    *out = Some((kw, value));

    Ok(())
}

/// Parses `kw` as `kw = true` or `kw = bool`
pub(crate) fn parse_flag_attribute<K>(input: ParseStream<'_>, out: &mut Option<(K, LitBool)>) -> syn::Result<()>
where
    K: Parse + ToTokens,
{
    let kw: K = input.parse()?;
    let value = if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        input.parse()?
    } else {
        LitBool::new(true, kw.span())
    };

    if out.is_some() {
        return Err(duplicate(kw));
    }
    *out = Some((kw, value));

    Ok(())
}

pub(crate) trait Combine: Sized {
    fn combine(self, other: Self) -> syn::Result<Self>;
}

/// Parses every attribute with the ident and combines them into one
pub(crate) fn parse_attrs<T>(ident: &str, attrs: &[syn::Attribute]) -> Option<syn::Result<T>>
where
    T: Combine + Parse,
{
    let mut parsed = attrs
        .iter()
        .filter(|attr| attr.meta.path().is_ident(ident))
        .map(|attr| attr.parse_args::<T>().map_err(|err| syn::Error::new_spanned(attr, err)));

    let first = match parsed.next()? {
        Ok(first) => first,
        Err(err) => return Some(Err(err)),
    };

    Some(parsed.try_fold(first, |out, next| out.combine(next?)))
}

pub(crate) fn combine_attribute<K, T>(a: &mut Option<(K, T)>, b: Option<(K, T)>) -> syn::Result<()>
where
    K: ToTokens,
{
    let Some((kw, value)) = b else {
        return Ok(());
    };
    if a.is_some() {
        return Err(duplicate(kw));
    }
    *a = Some((kw, value));

    Ok(())
}
