use proc_macro2::Ident;
use syn::{
    parse::{Parse, ParseStream},
    token,
};

/// Settings of `#[adapter(...)]`.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    /// Name of the generated function, `<native>_co` by default.
    pub name: Option<Ident>,
    /// The native function is an associated function without receiver, so
    /// it is called through `Self::`.
    pub assoc: Option<Ident>,
}

impl Parse for Arguments {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut this = Self::default();
        let mut has_comma = true;
        while !input.is_empty() {
            if !has_comma {
                Err(syn::Error::new(input.span(), "expected comma"))?;
            }

            let ident: Ident = input.parse()?;
            if ident == "name" {
                if this.name.is_some() {
                    Err(syn::Error::new(ident.span(), "setting already given"))?
                }
                let _: token::Eq = input.parse()?;
                this.name = Some(input.parse()?);
            } else if ident == "assoc" {
                if this.assoc.is_some() {
                    Err(syn::Error::new(ident.span(), "setting already given"))?
                }
                this.assoc = Some(ident);
            } else {
                Err(syn::Error::new(
                    ident.span(),
                    "unknown setting, expected `name = ...` or `assoc`",
                ))?
            }

            has_comma = false;
            if input.peek(token::Comma) {
                let _: token::Comma = input.parse()?;
                has_comma = true;
            }
        }
        Ok(this)
    }
}
