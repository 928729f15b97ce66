use super::{Error, State};
use std::{
    fmt,
    mem,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering::*},
        Arc,
        Mutex,
        MutexGuard,
        PoisonError,
    },
    task,
};

enum Slot<T, E> {
    Pending(Option<task::Waker>),
    Resolved(Result<T, Error<E>>),
    Consumed,
}

/// Resolvers of a channel that may resolve it from another thread.
#[derive(Debug, Default)]
pub(crate) struct Remote {
    resolvers: AtomicUsize,
    settled: AtomicBool,
}

impl Remote {
    /// Tests whether the channel is pending and some resolver living on
    /// another thread may still resolve it.
    pub(crate) fn can_fire(&self) -> bool {
        !self.settled.load(Acquire) && self.resolvers.load(Acquire) > 0
    }
}

pub(super) struct Shared<T, E> {
    slot: Mutex<Slot<T, E>>,
    resolvers: AtomicUsize,
    remote: Arc<Remote>,
}

impl<T, E> fmt::Debug for Shared<T, E> {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        fmtr.debug_struct("outcome::Shared")
            .field("state", &self.state())
            .field("resolvers", &self.resolvers.load(Relaxed))
            .field("remote", &self.remote.resolvers.load(Relaxed))
            .finish()
    }
}

impl<T, E> Shared<T, E> {
    pub(super) fn init_pending() -> Self {
        Self {
            slot: Mutex::new(Slot::Pending(None)),
            resolvers: AtomicUsize::new(1),
            remote: Arc::default(),
        }
    }

    pub(super) fn init_resolved(result: Result<T, Error<E>>) -> Self {
        Self {
            slot: Mutex::new(Slot::Resolved(result)),
            resolvers: AtomicUsize::new(0),
            remote: Arc::new(Remote {
                resolvers: AtomicUsize::new(0),
                settled: AtomicBool::new(true),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T, E>> {
        // A panic while the slot is locked cannot leave it half-written.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn state(&self) -> State {
        match &*self.lock() {
            Slot::Pending(_) => State::Pending,
            Slot::Resolved(Ok(_)) => State::Succeeded,
            Slot::Resolved(Err(_)) => State::Failed,
            Slot::Consumed => State::Consumed,
        }
    }

    pub(super) fn peek(&self) -> Option<Result<T, Error<E>>>
    where
        T: Clone,
        E: Clone,
    {
        match &*self.lock() {
            Slot::Resolved(result) => Some(result.clone()),
            _ => None,
        }
    }

    /// Stores the resolution unless one was already stored, in which case
    /// the rejected resolution is handed back.
    pub(super) fn resolve(
        &self,
        result: Result<T, Error<E>>,
    ) -> Result<(), Result<T, Error<E>>> {
        let mut slot = self.lock();
        if !matches!(*slot, Slot::Pending(_)) {
            return Err(result);
        }
        let previous = mem::replace(&mut *slot, Slot::Resolved(result));
        drop(slot);
        if let Slot::Pending(Some(waker)) = previous {
            waker.wake();
        }
        // Whoever sees the channel settled may rely on the waiter being woken.
        self.remote.settled.store(true, Release);
        Ok(())
    }

    pub(super) fn take(
        &self,
        waker: Option<&task::Waker>,
    ) -> Option<Result<T, Error<E>>> {
        let mut slot = self.lock();
        match mem::replace(&mut *slot, Slot::Consumed) {
            Slot::Pending(stored) => {
                let stored = match (stored, waker) {
                    (Some(stored), Some(waker)) if !stored.will_wake(waker) => {
                        Some(waker.clone())
                    },
                    (None, Some(waker)) => Some(waker.clone()),
                    (stored, _) => stored,
                };
                *slot = Slot::Pending(stored);
                None
            },
            Slot::Resolved(result) => Some(result),
            Slot::Consumed => Some(Err(Error::Consumed)),
        }
    }

    pub(super) fn attach_resolver(&self) {
        self.resolvers.fetch_add(1, Relaxed);
    }

    /// Returns whether the detached resolver was the last one.
    pub(super) fn detach_resolver(&self) -> bool {
        self.resolvers.fetch_sub(1, AcqRel) == 1
    }

    pub(super) fn attach_remote(&self) {
        self.remote.resolvers.fetch_add(1, AcqRel);
    }

    pub(super) fn detach_remote(&self) {
        self.remote.resolvers.fetch_sub(1, AcqRel);
    }

    pub(super) fn remote(&self) -> &Arc<Remote> {
        &self.remote
    }
}
