#![allow(dead_code)]

use coadapt::{
    reactor::Reactor,
    Callback,
    ErrorCode,
    LocalCallback,
    LocalVoidCallback,
};
use std::{io, sync::Once};

static INIT_LOGGING: Once = Once::new();

/// Installs a trace-level subscriber writing to the test output. Only the
/// first call has an effect.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Completes right away with the number of bytes "written".
pub fn write_now(buf: Vec<u8>, callback: Callback<usize>) {
    callback(ErrorCode::SUCCESS, buf.len());
}

/// Fails right away with the given kind.
pub fn write_broken(
    kind: io::ErrorKind,
    _buf: Vec<u8>,
    callback: Callback<usize>,
) {
    callback(kind.into(), 0);
}

/// Completes with the number of bytes "written" after `delay` ticks.
pub fn write_later(
    reactor: Reactor,
    delay: u64,
    buf: Vec<u8>,
    callback: LocalCallback<usize>,
) {
    reactor.schedule(delay, move || callback(ErrorCode::SUCCESS, buf.len()));
}

/// Accepts after `delay` ticks, completing with the given code.
pub fn accept_later(
    reactor: Reactor,
    delay: u64,
    code: ErrorCode,
    callback: LocalVoidCallback,
) {
    reactor.schedule(delay, move || callback(code));
}
