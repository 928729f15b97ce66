//! This module implements a deterministic completion reactor.
//!
//! Native operations register their completions (plain closures, usually
//! invoking a completion callback) with a [`Reactor`], optionally after a
//! delay measured in ticks of a virtual clock. Whoever drives the reactor
//! calls [`Reactor::poll`] or [`Reactor::step`] repeatedly, and completions
//! run synchronously from within those calls, in order of due tick and then
//! of registration.
//!
//! # Examples
//!
//! ```
//! use coadapt::{adapt, reactor::Reactor, ErrorCode, LocalCallback};
//!
//! let reactor = Reactor::new();
//! let read = adapt(|reactor: &Reactor, callback: LocalCallback<u8>| {
//!     reactor.schedule(2, move || callback(ErrorCode::SUCCESS, 9));
//! });
//!
//! let outcome = read.call(&reactor);
//! assert!(!outcome.is_resolved());
//! assert_eq!(reactor.poll(), 0);
//! assert_eq!(reactor.step(), 1);
//! assert_eq!(reactor.now(), 2);
//! assert!(outcome.is_resolved());
//! ```

use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

/// A completion registered with the reactor.
pub type Job = Box<dyn FnOnce()>;

/// Identifies a registered completion. Tickets order the same way their
/// completions run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket {
    due: u64,
    seq: u64,
}

impl Ticket {
    /// Tick at which the completion becomes ready.
    pub fn due(&self) -> u64 {
        self.due
    }

    /// Registration order of the completion.
    pub fn sequence(&self) -> u64 {
        self.seq
    }
}

#[derive(Default)]
struct Queue {
    now: u64,
    next_seq: u64,
    jobs: BTreeMap<Ticket, Job>,
}

impl Queue {
    /// Pops the earliest job due at or before `now` registered before
    /// `limit`. Jobs registered later are due no earlier than `now`, so
    /// they sort after every such job and end the search.
    fn pop_ready(&mut self, now: u64, limit: u64) -> Option<(Ticket, Job)> {
        let entry = self.jobs.first_entry()?;
        let ticket = *entry.key();
        if ticket.due > now || ticket.seq >= limit {
            return None;
        }
        Some((ticket, entry.remove()))
    }
}

/// A single-threaded queue of pending completions with a virtual clock.
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct Reactor {
    queue: Rc<RefCell<Queue>>,
}

impl fmt::Debug for Reactor {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        let queue = self.queue.borrow();
        fmtr.debug_struct("Reactor")
            .field("now", &queue.now)
            .field("pending", &queue.jobs.len())
            .finish()
    }
}

impl Reactor {
    /// Creates an idle reactor at tick zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick of the virtual clock.
    pub fn now(&self) -> u64 {
        self.queue.borrow().now
    }

    /// Number of completions not run yet.
    pub fn len(&self) -> usize {
        self.queue.borrow().jobs.len()
    }

    /// Tests whether no completion is waiting to run.
    pub fn is_idle(&self) -> bool {
        self.queue.borrow().jobs.is_empty()
    }

    /// Registers a completion that is ready right away. It still only runs
    /// from within the next poll.
    pub fn post<J>(&self, job: J) -> Ticket
    where
        J: FnOnce() + 'static,
    {
        self.schedule(0, job)
    }

    /// Registers a completion that becomes ready `delay` ticks from now.
    pub fn schedule<J>(&self, delay: u64, job: J) -> Ticket
    where
        J: FnOnce() + 'static,
    {
        let mut queue = self.queue.borrow_mut();
        let ticket =
            Ticket { due: queue.now.saturating_add(delay), seq: queue.next_seq };
        queue.next_seq += 1;
        queue.jobs.insert(ticket, Box::new(job));
        tracing::trace!(due = ticket.due, seq = ticket.seq, "job scheduled");
        ticket
    }

    /// Removes a completion before it runs. Dropping it drops whatever
    /// callback it owned. Returns whether the completion was still pending.
    pub fn cancel(&self, ticket: Ticket) -> bool {
        let job = self.queue.borrow_mut().jobs.remove(&ticket);
        tracing::trace!(seq = ticket.seq, found = job.is_some(), "job cancelled");
        job.is_some()
    }

    /// Moves the clock forward without running anything.
    pub fn advance(&self, ticks: u64) {
        let mut queue = self.queue.borrow_mut();
        queue.now = queue.now.saturating_add(ticks);
    }

    /// Runs every completion that is ready and was registered before this
    /// call. Completions registered, or made ready by advancing the clock,
    /// while polling wait for the next poll. Returns how many completions
    /// ran.
    pub fn poll(&self) -> usize {
        let (now, limit) = {
            let queue = self.queue.borrow();
            (queue.now, queue.next_seq)
        };
        let mut ran = 0;
        loop {
            let popped = self.queue.borrow_mut().pop_ready(now, limit);
            let Some((ticket, job)) = popped else { break };
            tracing::trace!(due = ticket.due, seq = ticket.seq, "running job");
            job();
            ran += 1;
        }
        ran
    }

    /// Polls; if nothing was ready, jumps the clock to the earliest pending
    /// completion and polls again. Returns how many completions ran, zero
    /// meaning the reactor is idle.
    pub fn step(&self) -> usize {
        let ran = self.poll();
        if ran > 0 {
            return ran;
        }
        let next_due = self.queue.borrow().jobs.keys().next().map(Ticket::due);
        match next_due {
            Some(due) => {
                {
                    let mut queue = self.queue.borrow_mut();
                    queue.now = queue.now.max(due);
                }
                tracing::trace!(now = due, "clock jumped");
                self.poll()
            },
            None => 0,
        }
    }
}
