mod common;

use coadapt::{
    adapt,
    reactor::Reactor,
    signature::{Callable, SplitLast},
    Adapted,
    Callback,
    Completion,
    Error,
    ErrorCode,
    LocalCallback,
    State,
    VoidCallback,
};
use std::{
    cell::{Cell, RefCell},
    io,
    rc::Rc,
    thread,
};

fn arity<F, Args>(_: &Adapted<F, Args>) -> usize
where
    F: Callable<Args>,
    Args: SplitLast,
    Args::Last: Completion,
{
    Adapted::<F, Args>::ARITY
}

#[test]
fn adapted_arity_drops_callback() {
    fn native(_a: u8, _b: u16, _c: u32, _callback: Callback<u64>) {}
    fn accept(_callback: VoidCallback) {}

    let native = adapt(native);
    assert_eq!(arity(&native), 3);
    let _ = native.call(1, 2, 3);
    let _ = native.call_with((1, 2, 3));

    let accept = adapt(accept);
    assert_eq!(arity(&accept), 0);
    let _ = accept.call();
    let _ = accept.call_with(());
}

#[test]
fn synchronous_success() {
    let write = adapt(common::write_now);
    let mut outcome = write.call(b"hello".to_vec());
    assert_eq!(outcome.state(), State::Succeeded);
    assert_eq!(outcome.try_take(), Some(Ok(5)));
}

#[test]
fn synchronous_failure() {
    let write = adapt(common::write_broken);
    let mut outcome = write.call(io::ErrorKind::BrokenPipe, vec![0; 8]);
    assert_eq!(outcome.state(), State::Failed);
    assert_eq!(
        outcome.try_take(),
        Some(Err(Error::from(io::ErrorKind::BrokenPipe)))
    );
}

#[test]
fn deferred_resolution_happens_once() {
    common::init_test_logging();
    let reactor = Reactor::new();
    let write = adapt(common::write_later);

    let outcome = write.call(reactor.clone(), 3, vec![1, 2]);
    assert_eq!(outcome.state(), State::Pending);

    reactor.advance(2);
    assert_eq!(reactor.poll(), 0);
    assert_eq!(outcome.state(), State::Pending);

    reactor.advance(1);
    assert_eq!(reactor.poll(), 1);
    assert_eq!(outcome.state(), State::Succeeded);

    assert_eq!(reactor.step(), 0);
    assert_eq!(outcome.peek(), Some(Ok(2)));
}

#[test]
fn each_call_gets_fresh_outcome() {
    let reactor = Reactor::new();
    let write = adapt(common::write_later);

    let slow = write.call(reactor.clone(), 5, vec![0; 10]);
    let fast = write.call(reactor.clone(), 1, vec![0; 20]);

    assert_eq!(reactor.step(), 1);
    assert_eq!(fast.peek(), Some(Ok(20)));
    assert_eq!(slow.state(), State::Pending);

    assert_eq!(reactor.step(), 1);
    assert_eq!(slow.peek(), Some(Ok(10)));
}

#[test]
fn void_sentinel_is_unit() {
    let accept =
        adapt(|code: ErrorCode, callback: VoidCallback| callback(code));

    for _ in 0 .. 3 {
        let mut outcome = accept.call(ErrorCode::SUCCESS);
        assert_eq!(outcome.try_take(), Some(Ok(())));
    }
    assert_eq!(
        accept.call(io::ErrorKind::AddrInUse.into()).try_take(),
        Some(Err(Error::Native(io::ErrorKind::AddrInUse)))
    );
}

#[test]
fn call_returning_yields_native_return() {
    let reactor = Reactor::new();
    let schedule = adapt(
        |reactor: &Reactor, value: u8, callback: LocalCallback<u8>| {
            reactor.schedule(4, move || callback(ErrorCode::SUCCESS, value))
        },
    );

    let (ticket, outcome) = schedule.call_returning((&reactor, 9));
    assert_eq!(ticket.due(), 4);
    assert!(reactor.cancel(ticket));
    assert_eq!(outcome.peek(), Some(Err(Error::Abandoned)));
}

#[test]
fn arguments_outlive_the_caller() {
    let reactor = Reactor::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let append = adapt(
        |reactor: Reactor,
         log: Rc<RefCell<Vec<String>>>,
         line: String,
         callback: LocalCallback<usize>| {
            reactor.post(move || {
                log.borrow_mut().push(line);
                let len = log.borrow().len();
                callback(ErrorCode::SUCCESS, len);
            });
        },
    );

    let outcomes: Vec<_> = (0 .. 3)
        .map(|i| {
            append.call(reactor.clone(), log.clone(), format!("line {}", i))
        })
        .collect();
    assert!(log.borrow().is_empty());

    assert_eq!(reactor.poll(), 3);
    assert_eq!(*log.borrow(), ["line 0", "line 1", "line 2"]);
    let counts: Vec<_> =
        outcomes.iter().map(|outcome| outcome.peek()).collect();
    assert_eq!(counts, [Some(Ok(1)), Some(Ok(2)), Some(Ok(3))]);
}

#[test]
fn other_signal_conventions() {
    let with_option = adapt(
        |fail: bool, callback: Callback<&'static str, Option<i32>>| {
            if fail {
                callback(Some(-1), "")
            } else {
                callback(None, "fine")
            }
        },
    );
    assert_eq!(with_option.call(false).try_take(), Some(Ok("fine")));
    assert_eq!(
        with_option.call(true).try_take(),
        Some(Err(Error::Native(-1)))
    );

    let with_result = adapt(|callback: VoidCallback<Result<(), String>>| {
        callback(Err(String::from("refused")))
    });
    assert_eq!(
        with_result.call().try_take(),
        Some(Err(Error::Native(String::from("refused"))))
    );
}

#[test]
fn dropped_callback_abandons() {
    let forget = adapt(|_callback: Callback<u8>| {});
    let outcome = forget.call();
    assert_eq!(outcome.peek(), Some(Err(Error::Abandoned)));
}

#[test]
fn completion_from_worker_thread() {
    let spawn = adapt(|input: u64, callback: Callback<u64>| {
        thread::spawn(move || callback(ErrorCode::SUCCESS, input * 2))
    });

    let (handle, outcome) = spawn.call_returning((21,));
    handle.join().unwrap();
    assert_eq!(futures::executor::block_on(outcome), Ok(42));
}

#[test]
fn waiter_woken_by_detached_thread() {
    let calls = Cell::new(0);
    let counted = adapt(|callback: Callback<u32>| {
        calls.set(calls.get() + 1);
        thread::spawn(move || callback(ErrorCode::SUCCESS, 7));
    });
    assert_eq!(futures::executor::block_on(counted.call()), Ok(7));
    assert_eq!(futures::executor::block_on(counted.call()), Ok(7));
    assert_eq!(calls.get(), 2);
}
