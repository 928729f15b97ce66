//! This module exposes the parameter list of callables at the type level.
//!
//! Rust has no reflection over call signatures, but every closure, function
//! item and function pointer implements exactly one `Fn(A1, ..., An)`
//! signature. [`Callable`] is implemented for all of them with `Args` being
//! the tuple `(A1, ..., An)`, so asking the compiler for `F: Callable<Args>`
//! makes it infer the parameter list of `F`.
//!
//! A callable without a unique signature (e.g. a closure whose parameter
//! types cannot be inferred) fails to satisfy the bound, which is reported
//! at compile time.

pub mod split;

pub use split::SplitLast;

/// A callable whose full parameter list is the tuple `Args`.
///
/// # Examples
///
/// ```
/// use coadapt::signature::Callable;
///
/// fn arity<F, Args>(_: &F) -> usize
/// where
///     F: Callable<Args>,
/// {
///     F::ARITY
/// }
///
/// let add = |a: u8, b: u8| a + b;
/// assert_eq!(arity(&add), 2);
/// assert_eq!(add.call_with((3, 4)), 7);
/// ```
pub trait Callable<Args> {
    /// What the callable returns.
    type Output;

    /// Number of parameters.
    const ARITY: usize;

    /// Calls this callable with its parameters packed in a tuple.
    fn call_with(&self, args: Args) -> Self::Output;
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

pub(crate) use count;

macro_rules! callable {
    ($($param:ident),*) => {
        impl<F, O, $($param,)*> Callable<($($param,)*)> for F
        where
            F: Fn($($param),*) -> O,
        {
            type Output = O;

            const ARITY: usize = count!($($param)*);

            #[allow(non_snake_case)]
            fn call_with(&self, ($($param,)*): ($($param,)*)) -> O {
                (self)($($param),*)
            }
        }
    };
}

callable!();
callable!(A1);
callable!(A1, A2);
callable!(A1, A2, A3);
callable!(A1, A2, A3, A4);
callable!(A1, A2, A3, A4, A5);
callable!(A1, A2, A3, A4, A5, A6);
callable!(A1, A2, A3, A4, A5, A6, A7);
callable!(A1, A2, A3, A4, A5, A6, A7, A8);
callable!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
callable!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
callable!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
callable!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);
