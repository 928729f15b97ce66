//! Completion callbacks of native operations that produce no value, only
//! success or failure (e.g. accepting a connection into a socket the caller
//! already owns).
//!
//! A successful completion resolves the outcome with `()`, the same unit
//! value for every call.
//!
//! # Examples
//!
//! ```
//! use coadapt::{adapt, ErrorCode, Error, VoidCallback};
//! use std::io;
//!
//! fn accept(queued: usize, callback: VoidCallback) {
//!     if queued > 0 {
//!         callback(ErrorCode::SUCCESS);
//!     } else {
//!         callback(io::ErrorKind::WouldBlock.into());
//!     }
//! }
//!
//! let accept_co = adapt(accept);
//! assert_eq!(accept_co.call(1).try_take(), Some(Ok(())));
//! assert_eq!(
//!     accept_co.call(0).try_take(),
//!     Some(Err(Error::Native(io::ErrorKind::WouldBlock))),
//! );
//! ```

use super::Completion;
use crate::{
    outcome::Resolver,
    signal::{ErrorCode, ErrorSignal},
};

/// Completion callback of a native operation producing no value, invoked
/// as `callback(signal)`. May be invoked from any thread.
pub type VoidCallback<S = ErrorCode> = Box<dyn FnOnce(S) + Send>;

/// Like [`VoidCallback`], for native operations that complete on the thread
/// driving them.
pub type LocalVoidCallback<S = ErrorCode> = Box<dyn FnOnce(S)>;

impl<S> Completion for VoidCallback<S>
where
    S: ErrorSignal + 'static,
    S::Failure: Send + 'static,
{
    type Value = ();
    type Failure = S::Failure;

    fn synthesize(resolver: Resolver<(), S::Failure>) -> Self {
        let resolver = resolver.into_remote();
        Box::new(move |signal: S| match signal.failure() {
            Some(failure) => resolver.resolve_err(failure),
            None => resolver.resolve_ok(()),
        })
    }
}

impl<S> Completion for LocalVoidCallback<S>
where
    S: ErrorSignal + 'static,
    S::Failure: 'static,
{
    type Value = ();
    type Failure = S::Failure;

    fn synthesize(resolver: Resolver<(), S::Failure>) -> Self {
        Box::new(move |signal: S| match signal.failure() {
            Some(failure) => resolver.resolve_err(failure),
            None => resolver.resolve_ok(()),
        })
    }
}
