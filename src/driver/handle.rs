use crate::{
    outcome::{self, Outcome},
    panic::Payload,
};
use std::{future::Future, pin::Pin, task};

/// An error that might happen when waiting for a task.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    /// The task panicked! And here is the panic's payload.
    #[error("task panicked: {0:?}")]
    Panicked(Payload),
    /// The task was dropped before completing.
    #[error("task cancelled")]
    Cancelled,
    /// The task's output was already taken through this handle.
    #[error("task already joined")]
    AlreadyJoined,
}

impl JoinError {
    /// Tests whether the target task was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, JoinError::Cancelled)
    }

    /// Tests whether the target task panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self, JoinError::Panicked(_))
    }

    /// Attempts to convert this error into a panic payload. Fails if the
    /// target task didn't panic.
    pub fn try_into_panic(self) -> Result<Payload, Self> {
        match self {
            JoinError::Panicked(payload) => Ok(payload),
            error => Err(error),
        }
    }

    fn from_outcome(error: outcome::Error<Payload>) -> Self {
        match error {
            outcome::Error::Native(payload) => JoinError::Panicked(payload),
            outcome::Error::Abandoned => JoinError::Cancelled,
            outcome::Error::Consumed => JoinError::AlreadyJoined,
        }
    }
}

/// A handle that allows the caller to join a task (i.e. wait for it to end).
#[derive(Debug)]
pub struct JoinHandle<T> {
    outcome: Outcome<T, Payload>,
}

impl<T> JoinHandle<T> {
    pub(super) fn new(outcome: Outcome<T, Payload>) -> Self {
        Self { outcome }
    }

    /// Tests whether the task ended, either completing, panicking or being
    /// dropped.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_resolved()
    }

    /// Takes the task's output without blocking, if it ended.
    pub fn try_join(&mut self) -> Option<Result<T, JoinError>> {
        self.outcome
            .try_take()
            .map(|result| result.map_err(JoinError::from_outcome))
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(
        mut self: Pin<&mut Self>,
        ctx: &mut task::Context<'_>,
    ) -> task::Poll<Self::Output> {
        Pin::new(&mut self.outcome)
            .poll(ctx)
            .map(|result| result.map_err(JoinError::from_outcome))
    }
}
