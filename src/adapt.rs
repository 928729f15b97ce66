//! This module turns native operations that report completion through a
//! trailing callback into operations that return an [`Outcome`].
//!
//! A native operation is any callable whose last parameter is a
//! [`Completion`] type, typically [`Callback`] or, when the operation
//! produces no value, [`VoidCallback`]. [`adapt`] wraps it into an
//! [`Adapted`] operation taking only the leading parameters; each call
//! synthesizes the callback, forwards it to the native operation and hands
//! the outcome channel back immediately.
//!
//! # Examples
//!
//! ```
//! use coadapt::{adapt, Callback, ErrorCode};
//!
//! fn write(buf: Vec<u8>, callback: Callback<usize>) {
//!     callback(ErrorCode::SUCCESS, buf.len());
//! }
//!
//! let write_co = adapt(write);
//! let mut outcome = write_co.call(vec![1, 2, 3]);
//! assert_eq!(outcome.try_take(), Some(Ok(3)));
//! ```

pub mod void;

pub use void::{LocalVoidCallback, VoidCallback};

use crate::{
    outcome::{self, Outcome, Resolver},
    signal::{ErrorCode, ErrorSignal},
    signature::{Callable, SplitLast},
};
use std::{fmt, marker::PhantomData};

/// Completion callback of a native operation producing a `T`, invoked as
/// `callback(signal, value)`. May be invoked from any thread.
pub type Callback<T, S = ErrorCode> = Box<dyn FnOnce(S, T) + Send>;

/// Like [`Callback`], for native operations that complete on the thread
/// driving them.
pub type LocalCallback<T, S = ErrorCode> = Box<dyn FnOnce(S, T)>;

/// A type that can be the trailing callback parameter of a native
/// operation.
///
/// Implementors build a callback that resolves an outcome channel: with a
/// failure when the native operation signals one, with a value otherwise.
pub trait Completion: Sized {
    /// Value the outcome resolves with on success.
    type Value;

    /// Failure payload the outcome resolves with on failure.
    type Failure;

    /// Builds the callback handed to the native operation.
    fn synthesize(resolver: Resolver<Self::Value, Self::Failure>) -> Self;
}

/// The outcome produced by an adapted operation whose callback is `C`.
pub type OutcomeOf<C> =
    Outcome<<C as Completion>::Value, <C as Completion>::Failure>;

impl<T, S> Completion for Callback<T, S>
where
    S: ErrorSignal + 'static,
    S::Failure: Send + 'static,
    T: Send + 'static,
{
    type Value = T;
    type Failure = S::Failure;

    fn synthesize(resolver: Resolver<T, S::Failure>) -> Self {
        let resolver = resolver.into_remote();
        Box::new(move |signal: S, value: T| match signal.failure() {
            Some(failure) => resolver.resolve_err(failure),
            None => resolver.resolve_ok(value),
        })
    }
}

impl<T, S> Completion for LocalCallback<T, S>
where
    S: ErrorSignal + 'static,
    S::Failure: 'static,
    T: 'static,
{
    type Value = T;
    type Failure = S::Failure;

    fn synthesize(resolver: Resolver<T, S::Failure>) -> Self {
        Box::new(move |signal: S, value: T| match signal.failure() {
            Some(failure) => resolver.resolve_err(failure),
            None => resolver.resolve_ok(value),
        })
    }
}

/// Wraps a native operation so it returns an [`Outcome`] instead of taking
/// a callback.
///
/// The parameter list of `native` is inferred, so closures must annotate
/// their parameter types.
///
/// The last parameter must be a [`Completion`] type. Operations whose last
/// parameter is anything else are rejected:
///
/// ```compile_fail
/// use coadapt::adapt;
///
/// fn resize(len: usize, zeroed: bool) {}
///
/// let _ = adapt(resize);
/// ```
///
/// And so are operations without parameters:
///
/// ```compile_fail
/// use coadapt::adapt;
///
/// fn tick() {}
///
/// let _ = adapt(tick);
/// ```
pub fn adapt<F, Args>(native: F) -> Adapted<F, Args>
where
    F: Callable<Args>,
    Args: SplitLast,
    Args::Last: Completion,
{
    Adapted { native, _signature: PhantomData }
}

/// A native operation whose trailing callback parameter was replaced by a
/// returned [`Outcome`]. Created by [`adapt`].
///
/// Besides the generic [`Adapted::call_with`], which takes the leading
/// parameters as a tuple, there is a `call` method taking exactly the
/// leading parameters, one by one.
pub struct Adapted<F, Args> {
    native: F,
    _signature: PhantomData<fn(Args)>,
}

impl<F, Args> Adapted<F, Args>
where
    F: Callable<Args>,
    Args: SplitLast,
    Args::Last: Completion,
{
    /// Number of parameters the adapted operation takes.
    pub const ARITY: usize = Args::LEN - 1;

    /// Starts the native operation with the given leading parameters and
    /// returns its outcome, pending or already resolved. Never blocks.
    pub fn call_with(&self, init: Args::Init) -> OutcomeOf<Args::Last> {
        let (_, outcome) = self.call_returning(init);
        outcome
    }

    /// Like [`Adapted::call_with`], also returning what the native
    /// operation itself returned.
    pub fn call_returning(
        &self,
        init: Args::Init,
    ) -> (F::Output, OutcomeOf<Args::Last>) {
        let (resolver, outcome) = outcome::channel();
        let callback = <Args::Last as Completion>::synthesize(resolver);
        let output = self.native.call_with(Args::from_parts(init, callback));
        (output, outcome)
    }

    /// The wrapped native operation.
    pub fn native(&self) -> &F {
        &self.native
    }

    /// Unwraps the native operation.
    pub fn into_native(self) -> F {
        self.native
    }
}

impl<F, Args> Clone for Adapted<F, Args>
where
    F: Clone,
{
    fn clone(&self) -> Self {
        Self { native: self.native.clone(), _signature: PhantomData }
    }
}

impl<F, Args> Copy for Adapted<F, Args> where F: Copy {}

impl<F, Args> fmt::Debug for Adapted<F, Args> {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        fmtr.debug_struct("Adapted")
            .field("native", &std::any::type_name::<F>())
            .finish()
    }
}

macro_rules! adapted_call {
    ($($param:ident),*) => {
        impl<F, C, $($param,)*> Adapted<F, ($($param,)* C,)>
        where
            F: Callable<($($param,)* C,)>,
            C: Completion,
        {
            /// Starts the native operation with the given leading
            /// parameters and returns its outcome. Never blocks.
            #[allow(non_snake_case, clippy::too_many_arguments)]
            pub fn call(&self, $($param: $param),*) -> OutcomeOf<C> {
                self.call_with(($($param,)*))
            }
        }
    };
}

adapted_call!();
adapted_call!(A1);
adapted_call!(A1, A2);
adapted_call!(A1, A2, A3);
adapted_call!(A1, A2, A3, A4);
adapted_call!(A1, A2, A3, A4, A5);
adapted_call!(A1, A2, A3, A4, A5, A6);
adapted_call!(A1, A2, A3, A4, A5, A6, A7);
adapted_call!(A1, A2, A3, A4, A5, A6, A7, A8);
adapted_call!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
adapted_call!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
adapted_call!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
