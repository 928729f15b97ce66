use crate::{args::Arguments, error};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use syn::{FnArg, ItemFn, Pat, PatIdent, Receiver, ReturnType, Type};

/// A leading parameter of the native function, forwarded as is.
struct Param {
    ident: Ident,
    ty: Type,
}

/// The pieces of a native function the adapted function is built from.
struct Native<'item> {
    receiver: Option<&'item Receiver>,
    leading: Vec<Param>,
    callback: Type,
    /// What the native function returns, unless it is `()`.
    output: Option<&'item Type>,
}

impl<'item> Native<'item> {
    fn analyze(item: &'item ItemFn) -> syn::Result<Self> {
        let sig = &item.sig;
        let mut dump = error::Dump::new();

        if let Some(asyncness) = &sig.asyncness {
            dump.append(syn::Error::new(
                asyncness.span,
                "native operations report completion through their \
                 callback, they cannot be `async`",
            ));
        }
        if let Some(variadic) = &sig.variadic {
            dump.append(syn::Error::new_spanned(
                variadic,
                "native operations cannot be variadic",
            ));
        }

        let mut receiver = None;
        let mut params = Vec::new();
        for input in &sig.inputs {
            match input {
                FnArg::Receiver(found) => receiver = Some(found),
                FnArg::Typed(typed) => match &*typed.pat {
                    Pat::Ident(PatIdent {
                        ident, by_ref: None, subpat: None, ..
                    }) => params.push(Param {
                        ident: ident.clone(),
                        ty: (*typed.ty).clone(),
                    }),
                    pattern => dump.append(syn::Error::new_spanned(
                        pattern,
                        "parameters of native operations must be plain \
                         identifiers",
                    )),
                },
            }
        }

        let Some(callback) = params.pop() else {
            return Err(dump.fail(syn::Error::new(
                sig.ident.span(),
                "native operation must take a trailing completion callback \
                 parameter",
            )));
        };

        let output = match &sig.output {
            ReturnType::Default => None,
            ReturnType::Type(_, ty) => match &**ty {
                Type::Tuple(tuple) if tuple.elems.is_empty() => None,
                ty => Some(ty),
            },
        };

        dump.check()?;
        Ok(Self { receiver, leading: params, callback: callback.ty, output })
    }
}

/// Emits the native function untouched, followed by its adapted sibling.
///
/// The sibling returns the outcome, paired with the native return value
/// when the native function returns something other than `()`.
pub fn expand(args: Arguments, item: ItemFn) -> syn::Result<TokenStream> {
    let native = Native::analyze(&item)?;
    let sig = &item.sig;
    let vis = &item.vis;
    let native_ident = &sig.ident;
    let name = args
        .name
        .unwrap_or_else(|| format_ident!("{}_co", native_ident));
    let unsafety = &sig.unsafety;
    let generics = &sig.generics;
    let where_clause = &sig.generics.where_clause;
    let callback_ty = &native.callback;
    let cfgs = item.attrs.iter().filter(|attr| attr.path().is_ident("cfg"));

    let resolver = Ident::new("resolver", Span::mixed_site());
    let outcome = Ident::new("outcome", Span::mixed_site());
    let callback = Ident::new("callback", Span::mixed_site());

    let receiver = native.receiver.map(|receiver| quote! { #receiver, });
    let leading_decls = native.leading.iter().map(|Param { ident, ty }| {
        quote! { #ident: #ty }
    });
    let forwarded = native.leading.iter().map(|param| &param.ident);

    let call = match (native.receiver, &args.assoc) {
        (Some(_), _) => {
            quote! { Self::#native_ident(self, #(#forwarded,)* #callback) }
        },
        (None, Some(_)) => {
            quote! { Self::#native_ident(#(#forwarded,)* #callback) }
        },
        (None, None) => quote! { #native_ident(#(#forwarded,)* #callback) },
    };

    let outcome_ty = quote! { ::coadapt::OutcomeOf<#callback_ty> };
    let (output_ty, body) = match native.output {
        Some(ty) => (
            quote! { (#ty, #outcome_ty) },
            quote! { (#call, #outcome) },
        ),
        None => (
            outcome_ty,
            quote! {
                let _ = #call;
                #outcome
            },
        ),
    };

    let doc = format!(
        "Adapted form of `{}`: returns the outcome of the operation instead \
         of taking a completion callback.",
        native_ident
    );

    Ok(quote! {
        #item

        #(#cfgs)*
        #[doc = #doc]
        #vis #unsafety fn #name #generics (
            #receiver
            #(#leading_decls),*
        ) -> #output_ty #where_clause {
            let (#resolver, #outcome) = ::coadapt::outcome::channel();
            let #callback =
                <#callback_ty as ::coadapt::Completion>::synthesize(#resolver);
            #body
        }
    })
}
