//! This module defines the error-first convention native operations use to
//! report how they completed.

use std::{fmt, io};

/// The error indicator a native operation passes as the first argument of
/// its completion callback.
///
/// "No error" is a distinguished value: [`ErrorSignal::failure`] returns
/// `None` for it, and the failure payload otherwise.
pub trait ErrorSignal {
    /// Payload describing a failure.
    type Failure;

    /// Classifies the signal, returning the failure payload if the signal
    /// denotes failure.
    fn failure(self) -> Option<Self::Failure>;
}

impl<E> ErrorSignal for Option<E> {
    type Failure = E;

    fn failure(self) -> Option<E> {
        self
    }
}

impl<E> ErrorSignal for Result<(), E> {
    type Failure = E;

    fn failure(self) -> Option<E> {
        self.err()
    }
}

/// An I/O completion code: either success or the kind of I/O error that
/// happened.
///
/// # Examples
///
/// ```
/// use coadapt::signal::{ErrorCode, ErrorSignal};
/// use std::io;
///
/// assert!(ErrorCode::SUCCESS.is_success());
/// assert_eq!(ErrorCode::SUCCESS.failure(), None);
///
/// let aborted = ErrorCode::from(io::ErrorKind::ConnectionAborted);
/// assert_eq!(aborted.failure(), Some(io::ErrorKind::ConnectionAborted));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorCode {
    kind: Option<io::ErrorKind>,
}

impl ErrorCode {
    /// The "no error" code.
    pub const SUCCESS: Self = Self { kind: None };

    /// Creates a failure code of the given kind.
    pub const fn failed(kind: io::ErrorKind) -> Self {
        Self { kind: Some(kind) }
    }

    /// Tests whether this code denotes success.
    pub const fn is_success(&self) -> bool {
        self.kind.is_none()
    }

    /// The kind of failure, if any.
    pub const fn kind(&self) -> Option<io::ErrorKind> {
        self.kind
    }

    /// Converts this code into a `Result`, so it composes with `?`.
    pub fn into_result(self) -> io::Result<()> {
        match self.kind {
            None => Ok(()),
            Some(kind) => Err(kind.into()),
        }
    }
}

impl ErrorSignal for ErrorCode {
    type Failure = io::ErrorKind;

    fn failure(self) -> Option<io::ErrorKind> {
        self.kind
    }
}

impl From<io::ErrorKind> for ErrorCode {
    fn from(kind: io::ErrorKind) -> Self {
        Self::failed(kind)
    }
}

impl From<&io::Error> for ErrorCode {
    fn from(error: &io::Error) -> Self {
        Self::failed(error.kind())
    }
}

impl From<io::Result<()>> for ErrorCode {
    fn from(result: io::Result<()>) -> Self {
        match result {
            Ok(()) => Self::SUCCESS,
            Err(error) => Self::from(&error),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            None => write!(fmtr, "success"),
            Some(kind) => write!(fmtr, "{}", kind),
        }
    }
}
