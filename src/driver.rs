//! This module implements a cooperative, single-threaded driver loop.
//!
//! A [`Driver`] owns a task pool and a [`Reactor`]. Each [`Driver::turn`]
//! polls every ready task until none can make progress, then steps the
//! reactor once, which runs native completions and thereby resolves the
//! outcomes tasks are waiting on. Tasks are plain futures, so a sequence of
//! adapted operations reads as straight-line code:
//!
//! ```
//! use coadapt::{adapt, driver::Driver, ErrorCode, LocalCallback, Reactor};
//!
//! fn delayed_len(
//!     reactor: Reactor,
//!     data: String,
//!     callback: LocalCallback<usize>,
//! ) {
//!     reactor.schedule(1, move || callback(ErrorCode::SUCCESS, data.len()));
//! }
//!
//! let mut driver = Driver::new();
//! let reactor = driver.reactor().clone();
//! let output = driver.block_on(async move {
//!     let write = adapt(delayed_len);
//!     let first = write.call(reactor.clone(), "hello".to_owned()).await?;
//!     let second = write.call(reactor, "world!".to_owned()).await?;
//!     Ok::<_, coadapt::Error<std::io::ErrorKind>>(first + second)
//! });
//! assert_eq!(output.unwrap().unwrap(), 11);
//! ```

mod handle;

pub use handle::{JoinError, JoinHandle};

use crate::{
    outcome::{self, Remote},
    panic::CatchUnwind,
    reactor::Reactor,
};
use futures::{executor::LocalPool, future, task::LocalSpawnExt};
use std::{
    cell::Cell,
    fmt,
    future::Future,
    rc::Rc,
    sync::Arc,
    task,
};

/// An error that stops the driver loop.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Tasks are waiting, but the reactor has nothing left to complete and
    /// no task waits on a callback that another thread may still invoke.
    ///
    /// Outcomes of [`Callback`](crate::Callback) and
    /// [`VoidCallback`](crate::VoidCallback) operations are waited for, the
    /// driver parks until they resolve. Local callbacks held outside the
    /// reactor cannot fire while the driver runs, so they stall it.
    #[error("{live_tasks} task(s) still waiting but the reactor is idle")]
    Stalled {
        /// Number of tasks that did not end.
        live_tasks: usize,
    },
    /// The configured maximum number of turns was reached.
    #[error("turn limit of {limit} reached")]
    TurnLimit {
        /// The configured limit.
        limit: u64,
    },
    /// The task driven by [`Driver::block_on`] did not complete.
    #[error(transparent)]
    Join(#[from] JoinError),
}

/// What happened during one [`Driver::turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    /// Native completions the reactor ran, plus outcomes resolved from
    /// other threads since the previous turn.
    pub completions: usize,
    /// Tasks that did not end yet.
    pub live_tasks: usize,
    /// Outcomes tasks wait on that other threads may still resolve.
    pub remote_waits: usize,
}

/// Configuration of a [`Driver`].
#[derive(Debug, Clone, Default)]
pub struct DriverBuilder {
    reactor: Option<Reactor>,
    turn_limit: Option<u64>,
}

impl DriverBuilder {
    /// Creates a builder with the default configuration: a fresh reactor and
    /// no turn limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives the given reactor instead of a fresh one.
    pub fn reactor(mut self, reactor: Reactor) -> Self {
        self.reactor = Some(reactor);
        self
    }

    /// Fails with [`DriverError::TurnLimit`] once this many turns were
    /// taken.
    pub fn turn_limit(mut self, limit: u64) -> Self {
        self.turn_limit = Some(limit);
        self
    }

    /// Builds the driver.
    pub fn build(self) -> Driver {
        Driver {
            pool: LocalPool::new(),
            reactor: self.reactor.unwrap_or_default(),
            live: Rc::new(Cell::new(0)),
            turn_limit: self.turn_limit,
            turns: 0,
            remote: Vec::new(),
        }
    }
}

/// Counts a task as live until the task future is dropped, whether it
/// completed or not.
struct LiveGuard {
    live: Rc<Cell<usize>>,
}

impl LiveGuard {
    fn new(live: Rc<Cell<usize>>) -> Self {
        live.set(live.get() + 1);
        Self { live }
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

/// A cooperative driver loop over a task pool and a [`Reactor`].
pub struct Driver {
    pool: LocalPool,
    reactor: Reactor,
    live: Rc<Cell<usize>>,
    turn_limit: Option<u64>,
    turns: u64,
    remote: Vec<Arc<Remote>>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        fmtr.debug_struct("Driver")
            .field("reactor", &self.reactor)
            .field("live_tasks", &self.live.get())
            .field("turn_limit", &self.turn_limit)
            .field("turns", &self.turns)
            .field("remote_waits", &self.remote.len())
            .finish()
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    /// Creates a driver with the default configuration.
    pub fn new() -> Self {
        DriverBuilder::new().build()
    }

    /// Starts configuring a driver.
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// The reactor this driver steps.
    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    /// Number of spawned tasks that did not end yet.
    pub fn live_tasks(&self) -> usize {
        self.live.get()
    }

    /// Number of turns taken so far.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Spawns a task. It starts running on the next turn.
    pub fn spawn<A>(&self, future: A) -> JoinHandle<A::Output>
    where
        A: Future + 'static,
        A::Output: 'static,
    {
        let (resolver, outcome) = outcome::channel();
        let guard = LiveGuard::new(self.live.clone());

        let task = async move {
            let _guard = guard;
            match CatchUnwind::new(future).await {
                Ok(data) => resolver.resolve_ok(data),
                Err(payload) => resolver.resolve_err(payload),
            }
        };
        if let Err(error) = self.pool.spawner().spawn_local(task) {
            tracing::warn!(%error, "task could not be spawned");
        }

        JoinHandle::new(outcome)
    }

    /// Polls tasks until none can make progress, then steps the reactor
    /// once.
    pub fn turn(&mut self) -> Result<Turn, DriverError> {
        if let Some(limit) = self.turn_limit {
            if self.turns >= limit {
                return Err(DriverError::TurnLimit { limit });
            }
        }
        self.turns += 1;

        let pool = &mut self.pool;
        let ((), waits) =
            outcome::collect_remote_waits(|| pool.run_until_stalled());
        self.watch(waits);
        let remote_resolved = self.settle_remote();
        let completions = self.reactor.step() + remote_resolved;
        let turn = Turn {
            completions,
            live_tasks: self.live.get(),
            remote_waits: self.remote.len(),
        };
        tracing::debug!(
            turn = self.turns,
            completions = turn.completions,
            live_tasks = turn.live_tasks,
            remote_waits = turn.remote_waits,
            "driver turn"
        );
        Ok(turn)
    }

    fn watch(&mut self, waits: Vec<Arc<Remote>>) {
        for remote in waits {
            if !self.remote.iter().any(|known| Arc::ptr_eq(known, &remote)) {
                self.remote.push(remote);
            }
        }
    }

    /// Forgets remote waits that cannot fire anymore, returning how many.
    fn settle_remote(&mut self) -> usize {
        let before = self.remote.len();
        self.remote.retain(|remote| remote.can_fire());
        before - self.remote.len()
    }

    /// Blocks the thread until some remote wait resolves or a task is woken.
    /// Woken tasks run before this returns.
    fn park(&mut self) {
        tracing::debug!(
            remote_waits = self.remote.len(),
            "parking until another thread completes"
        );
        let remote = &self.remote;
        let pool = &mut self.pool;
        let mut woken = false;
        let ((), waits) = outcome::collect_remote_waits(|| {
            // The pool only polls this again once the thread was unparked.
            pool.run_until(future::poll_fn(|_| {
                if woken || remote.iter().any(|remote| !remote.can_fire()) {
                    task::Poll::Ready(())
                } else {
                    woken = true;
                    task::Poll::Pending
                }
            }))
        });
        self.watch(waits);
    }

    /// Decides what to do after a turn that completed nothing.
    fn idle(&mut self, turn: Turn) -> Result<(), DriverError> {
        if turn.remote_waits == 0 {
            return Err(DriverError::Stalled { live_tasks: turn.live_tasks });
        }
        self.park();
        Ok(())
    }

    /// Takes turns until every spawned task ended.
    pub fn run(&mut self) -> Result<(), DriverError> {
        loop {
            let turn = self.turn()?;
            if turn.live_tasks == 0 {
                return Ok(());
            }
            if turn.completions == 0 {
                self.idle(turn)?;
            }
        }
    }

    /// Spawns the future and takes turns until it ends, returning its
    /// output. Other spawned tasks keep running alongside.
    pub fn block_on<A>(&mut self, future: A) -> Result<A::Output, DriverError>
    where
        A: Future + 'static,
        A::Output: 'static,
    {
        let mut handle = self.spawn(future);
        loop {
            let turn = self.turn()?;
            if let Some(result) = handle.try_join() {
                return Ok(result?);
            }
            if turn.completions == 0 {
                self.idle(turn)?;
            }
        }
    }
}
