//! Adapters from completion-callback style asynchronous operations to
//! single-fire outcome channels.
//!
//! A *native* operation starts some work and, later, invokes a trailing
//! callback with an error signal and possibly a value. [`adapt`] inspects the
//! native operation's parameter list at compile time, strips the trailing
//! callback, and produces an operation over the remaining parameters that
//! returns an [`Outcome`] instead. Outcomes are futures, so a sequence of
//! adapted calls can be awaited as straight-line code by any executor,
//! including the small cooperative [`driver`] shipped here.
//!
//! With the `macros` feature, the [`adapter`] attribute generates the
//! adapted function next to the native one. It only accepts plain native
//! functions taking a trailing callback. These are rejected:
//!
//! ```compile_fail
//! #[coadapt::adapter]
//! async fn write(buf: Vec<u8>, callback: coadapt::Callback<usize>) {}
//! ```
//!
//! ```compile_fail
//! #[coadapt::adapter]
//! fn tick() {}
//! ```
//!
//! ```compile_fail
//! struct Socket;
//!
//! impl Socket {
//!     #[coadapt::adapter]
//!     fn close(&self) {}
//! }
//! ```
//!
//! ```compile_fail
//! #[coadapt::adapter]
//! fn sum((a, b): (u8, u8), callback: coadapt::Callback<u8>) {}
//! ```

#![warn(missing_docs)]
#![cfg_attr(feature = "feature-doc-cfg", feature(doc_cfg))]

pub mod adapt;
pub mod outcome;
pub mod reactor;
pub mod signal;
pub mod signature;

#[cfg(feature = "driver")]
#[cfg_attr(feature = "feature-doc-cfg", doc(cfg(feature = "driver")))]
pub mod driver;

#[cfg(feature = "driver")]
mod panic;

pub use adapt::{
    adapt,
    Adapted,
    Callback,
    Completion,
    LocalCallback,
    LocalVoidCallback,
    OutcomeOf,
    VoidCallback,
};
pub use outcome::{Error, Outcome, Resolver, State};
pub use reactor::Reactor;
pub use signal::{ErrorCode, ErrorSignal};

#[cfg(feature = "macros")]
#[cfg_attr(feature = "feature-doc-cfg", doc(cfg(feature = "macros")))]
pub use coadapt_macros::adapter;
