//! Procedural macros of `coadapt`.

mod args;
mod error;
mod native;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemFn};

/// Generates, next to a native operation, its adapted form: a function with
/// the same leading parameters that returns an outcome instead of taking
/// the trailing completion callback.
///
/// The generated function is named after the native one with a `_co`
/// suffix, unless `name = ...` is given. Associated functions without a
/// receiver need the `assoc` setting, so the native function is called
/// through `Self::`. When the native function returns something other than
/// `()`, the generated function returns it paired with the outcome. `cfg`
/// attributes placed after this one apply to both functions.
///
/// The native function must take a trailing completion callback, and may
/// be neither `async` nor variadic. Its parameters must be plain
/// identifiers.
///
/// ```ignore
/// #[coadapt::adapter]
/// fn write(data: Vec<u8>, callback: coadapt::Callback<usize>) {
///     callback(coadapt::ErrorCode::SUCCESS, data.len());
/// }
///
/// let outcome = write_co(vec![1, 2, 3]);
/// ```
#[proc_macro_attribute]
pub fn adapter(raw_args: TokenStream, raw_item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(raw_args as args::Arguments);
    let item = parse_macro_input!(raw_item as ItemFn);
    native::expand(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
