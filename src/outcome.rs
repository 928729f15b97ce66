//! This module implements the outcome channel: a single-fire slot resolved
//! by a callback and consumed by a waiting computation.
//!
//! A channel is made of one or more [`Resolver`]s, which write the
//! resolution, and one [`Outcome`], which reads it. The outcome can be
//! polled without side effects ([`Outcome::state`]), taken without blocking
//! ([`Outcome::try_take`]) or awaited, since it is a [`Future`].
//!
//! Resolution and consumption may happen on different threads.

mod shared;

pub(crate) use self::shared::Remote;

use self::shared::Shared;
use std::{cell::RefCell, fmt, future::Future, pin::Pin, sync::Arc, task};

thread_local! {
    static REMOTE_WAITS: RefCell<Option<Vec<Arc<Remote>>>> =
        const { RefCell::new(None) };
}

/// Runs `body`, also returning the channels that suspended a poll during
/// it while a resolver on another thread could still resolve them.
#[cfg_attr(not(feature = "driver"), allow(dead_code))]
pub(crate) fn collect_remote_waits<F, R>(body: F) -> (R, Vec<Arc<Remote>>)
where
    F: FnOnce() -> R,
{
    let outer = REMOTE_WAITS.with(|waits| waits.replace(Some(Vec::new())));
    let output = body();
    let collected = REMOTE_WAITS
        .with(|waits| waits.replace(outer))
        .unwrap_or_default();
    (output, collected)
}

fn note_remote_wait(remote: &Arc<Remote>) {
    if !remote.can_fire() {
        return;
    }
    REMOTE_WAITS.with(|waits| {
        if let Some(waits) = &mut *waits.borrow_mut() {
            if !waits.iter().any(|known| Arc::ptr_eq(known, remote)) {
                waits.push(remote.clone());
            }
        }
    });
}

/// Why an outcome channel did not yield a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error<E> {
    /// The native operation reported a failure. Its payload is kept intact.
    #[error("native operation failed: {0}")]
    Native(E),
    /// Every resolver was dropped without resolving the channel.
    #[error("completion dropped without being invoked")]
    Abandoned,
    /// The resolution was already taken out of the channel.
    #[error("outcome already consumed")]
    Consumed,
}

impl<E> Error<E> {
    /// Tests whether the native operation reported a failure.
    pub fn is_native(&self) -> bool {
        matches!(self, Error::Native(_))
    }

    /// Tests whether the channel was abandoned by its resolvers.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Error::Abandoned)
    }

    /// Attempts to convert this error into the native failure payload.
    pub fn try_into_native(self) -> Result<E, Self> {
        match self {
            Error::Native(failure) => Ok(failure),
            error => Err(error),
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(failure: E) -> Self {
        Error::Native(failure)
    }
}

/// Observable state of an outcome channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Not resolved yet.
    Pending,
    /// Resolved with a value that was not consumed yet.
    Succeeded,
    /// Resolved with an error that was not consumed yet.
    Failed,
    /// The resolution was taken out of the channel.
    Consumed,
}

impl State {
    /// Tests whether the channel left the pending state.
    pub fn is_resolved(self) -> bool {
        !matches!(self, State::Pending)
    }
}

/// Creates a pending outcome channel.
///
/// # Examples
///
/// ```
/// use coadapt::outcome::{self, State};
///
/// let (resolver, mut outcome) = outcome::channel::<u32, ()>();
/// assert_eq!(outcome.state(), State::Pending);
/// assert_eq!(outcome.try_take(), None);
///
/// resolver.resolve_ok(42);
/// assert_eq!(outcome.state(), State::Succeeded);
/// assert_eq!(outcome.try_take(), Some(Ok(42)));
/// assert_eq!(outcome.state(), State::Consumed);
/// ```
pub fn channel<T, E>() -> (Resolver<T, E>, Outcome<T, E>) {
    let shared = Arc::new(Shared::init_pending());
    (Resolver { shared: shared.clone(), remote: false }, Outcome { shared })
}

/// The writing side of an outcome channel.
///
/// A channel is resolved at most once. Resolving it again is a misuse: it
/// panics when debug assertions are enabled, and otherwise keeps the first
/// resolution. [`Resolver::try_resolve`] is the checked alternative.
///
/// When the last resolver of a pending channel is dropped, the channel
/// resolves to [`Error::Abandoned`].
pub struct Resolver<T, E> {
    shared: Arc<Shared<T, E>>,
    remote: bool,
}

impl<T, E> Resolver<T, E> {
    /// Marks this resolver (and its future clones) as one that may be used
    /// from another thread. A [`Driver`](crate::driver::Driver) whose tasks
    /// wait on the outcome then parks instead of reporting a stall.
    pub fn into_remote(mut self) -> Self {
        if !self.remote {
            self.remote = true;
            self.shared.attach_remote();
        }
        self
    }

    /// Resolves the channel with a value.
    pub fn resolve_ok(&self, value: T) {
        self.resolve(Ok(value));
    }

    /// Resolves the channel with a native failure.
    pub fn resolve_err(&self, failure: E) {
        self.resolve(Err(Error::Native(failure)));
    }

    /// Resolves the channel.
    ///
    /// # Panics
    /// Panics if the channel is already resolved and debug assertions are
    /// enabled.
    pub fn resolve(&self, result: Result<T, Error<E>>) {
        if self.try_resolve(result).is_err() {
            tracing::warn!("outcome channel resolved twice, keeping first");
            if cfg!(debug_assertions) {
                panic!("outcome channel resolved twice");
            }
        }
    }

    /// Resolves the channel, or gives the resolution back if the channel
    /// was already resolved.
    pub fn try_resolve(
        &self,
        result: Result<T, Error<E>>,
    ) -> Result<(), Result<T, Error<E>>> {
        self.shared.resolve(result)
    }

    /// Tests whether the channel left the pending state.
    pub fn is_resolved(&self) -> bool {
        self.shared.state().is_resolved()
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        self.shared.attach_resolver();
        if self.remote {
            self.shared.attach_remote();
        }
        Self { shared: self.shared.clone(), remote: self.remote }
    }
}

impl<T, E> Drop for Resolver<T, E> {
    fn drop(&mut self) {
        if self.shared.detach_resolver() {
            let _ = self.shared.resolve(Err(Error::Abandoned));
        }
        if self.remote {
            self.shared.detach_remote();
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        fmtr.debug_struct("Resolver")
            .field("shared", &self.shared)
            .field("remote", &self.remote)
            .finish()
    }
}

/// The reading side of an outcome channel. Awaiting it yields the
/// resolution.
pub struct Outcome<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Outcome<T, E> {
    /// Creates an outcome that is already resolved.
    pub fn ready(result: Result<T, Error<E>>) -> Self {
        Self { shared: Arc::new(Shared::init_resolved(result)) }
    }

    /// Current state of the channel. Has no side effects.
    pub fn state(&self) -> State {
        self.shared.state()
    }

    /// Tests whether the channel left the pending state.
    pub fn is_resolved(&self) -> bool {
        self.state().is_resolved()
    }

    /// Clones the resolution out of the channel, if it is resolved and not
    /// consumed yet.
    pub fn peek(&self) -> Option<Result<T, Error<E>>>
    where
        T: Clone,
        E: Clone,
    {
        self.shared.peek()
    }

    /// Takes the resolution out of the channel without blocking. Returns
    /// `None` while pending, and [`Error::Consumed`] once taken.
    pub fn try_take(&mut self) -> Option<Result<T, Error<E>>> {
        self.shared.take(None)
    }
}

impl<T, E> Future for Outcome<T, E> {
    type Output = Result<T, Error<E>>;

    fn poll(
        self: Pin<&mut Self>,
        ctx: &mut task::Context<'_>,
    ) -> task::Poll<Self::Output> {
        match self.shared.take(Some(ctx.waker())) {
            Some(result) => task::Poll::Ready(result),
            None => {
                note_remote_wait(self.shared.remote());
                task::Poll::Pending
            },
        }
    }
}

impl<T, E> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        fmtr.debug_struct("Outcome").field("shared", &self.shared).finish()
    }
}
