mod common;

use coadapt::{
    adapt,
    driver::{Driver, DriverError, JoinError},
    reactor::Reactor,
    Callback,
    Error,
    ErrorCode,
    LocalCallback,
    VoidCallback,
};
use std::{cell::RefCell, io, rc::Rc, thread, time::Duration};

#[test]
fn straight_line_sequence() {
    common::init_test_logging();
    let mut driver = Driver::new();
    let reactor = driver.reactor().clone();

    let total = driver.block_on(async move {
        let write = adapt(common::write_later);
        let mut total = 0;
        for len in 1 ..= 4 {
            total += write.call(reactor.clone(), 2, vec![0; len]).await?;
        }
        Ok::<_, Error<io::ErrorKind>>(total)
    });

    assert_eq!(total.unwrap(), Ok(10));
    assert_eq!(driver.reactor().now(), 8);
}

#[test]
fn failures_reach_the_task() {
    let mut driver = Driver::new();
    let reactor = driver.reactor().clone();

    let result = driver.block_on(async move {
        let accept = adapt(common::accept_later);
        accept
            .call(reactor, 1, io::ErrorKind::ConnectionReset.into())
            .await
    });

    assert_eq!(
        result.unwrap(),
        Err(Error::Native(io::ErrorKind::ConnectionReset))
    );
}

#[test]
fn tasks_interleave_by_completion_order() {
    let mut driver = Driver::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let mut handles = Vec::new();
    for (name, delay) in [("slow", 5), ("fast", 1), ("medium", 3)] {
        let reactor = driver.reactor().clone();
        let order = order.clone();
        handles.push(driver.spawn(async move {
            let write = adapt(common::write_later);
            let written = write.call(reactor, delay, vec![0; 4]).await;
            order.borrow_mut().push(name);
            written
        }));
    }
    assert_eq!(driver.live_tasks(), 3);

    driver.run().unwrap();
    assert_eq!(*order.borrow(), ["fast", "medium", "slow"]);
    assert_eq!(driver.live_tasks(), 0);
    for handle in &mut handles {
        assert!(handle.is_finished());
        assert_eq!(handle.try_join().unwrap().unwrap(), Ok(4));
    }
}

#[test]
fn stalled_when_nothing_can_complete() {
    let mut driver = Driver::new();
    let hold = Rc::new(RefCell::new(None));

    let keep = hold.clone();
    let never = adapt(move |callback: LocalCallback<u8>| {
        *keep.borrow_mut() = Some(callback);
    });
    let handle = driver.spawn(never.call());

    match driver.run() {
        Err(DriverError::Stalled { live_tasks }) => assert_eq!(live_tasks, 1),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!handle.is_finished());

    let callback = hold.borrow_mut().take().unwrap();
    callback(ErrorCode::SUCCESS, 1);
    driver.run().unwrap();
    assert!(handle.is_finished());
}

#[test]
fn turn_limit() {
    let reactor = Reactor::new();
    let mut driver =
        Driver::builder().reactor(reactor.clone()).turn_limit(2).build();

    let write = adapt(common::write_later);
    let handle = driver.spawn(write.call(reactor, 10, vec![1]));

    assert!(driver.turn().is_ok());
    assert!(driver.turn().is_ok());
    match driver.turn() {
        Err(DriverError::TurnLimit { limit }) => assert_eq!(limit, 2),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(driver.turns(), 2);
    assert!(handle.is_finished());
}

#[test]
fn panicking_task() {
    let mut driver = Driver::new();
    let handle = driver.spawn(async {
        panic!("boom");
    });
    driver.run().unwrap();

    let error = futures::executor::block_on(handle).unwrap_err();
    assert!(error.is_panic());
    let payload = error.try_into_panic().unwrap();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
}

#[test]
fn block_on_reports_panics() {
    let mut driver = Driver::new();
    let result = driver.block_on(async {
        panic!("inside block_on");
    });
    match result {
        Err(DriverError::Join(error)) => assert!(error.is_panic()),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn dropped_driver_cancels_tasks() {
    let driver = Driver::new();
    let mut handle = driver.spawn(async { 1 });
    drop(driver);
    match handle.try_join() {
        Some(Err(JoinError::Cancelled)) => {},
        other => panic!("unexpected result: {:?}", other),
    }
    match handle.try_join() {
        Some(Err(JoinError::AlreadyJoined)) => {},
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn waits_for_completions_from_other_threads() {
    common::init_test_logging();
    let mut driver = Driver::new();
    let triple = adapt(|input: u8, callback: Callback<u8>| {
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            callback(ErrorCode::SUCCESS, input * 3);
        });
    });

    let result = driver.block_on(async move {
        let first = triple.call(3).await?;
        triple.call(first).await
    });
    assert_eq!(result.unwrap(), Ok(27));
}

#[test]
fn local_and_remote_completions_mix() {
    let mut driver = Driver::new();
    let reactor = driver.reactor().clone();
    let order = Rc::new(RefCell::new(Vec::new()));

    let remote_order = order.clone();
    let remote = driver.spawn(async move {
        let sleep = adapt(|millis: u64, callback: VoidCallback| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(millis));
                callback(ErrorCode::SUCCESS);
            });
        });
        sleep.call(30).await.unwrap();
        remote_order.borrow_mut().push("remote");
    });
    let local_order = order.clone();
    let local = driver.spawn(async move {
        let write = adapt(common::write_later);
        write.call(reactor, 1, vec![0; 2]).await.unwrap();
        local_order.borrow_mut().push("local");
    });

    driver.run().unwrap();
    assert_eq!(*order.borrow(), ["local", "remote"]);
    assert!(remote.is_finished());
    assert!(local.is_finished());
}

#[test]
fn callback_dropped_by_other_thread() {
    let mut driver = Driver::new();
    let lose = adapt(|callback: Callback<u8>| {
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            drop(callback);
        });
    });

    let result = driver.block_on(lose.call());
    assert_eq!(result.unwrap(), Err(Error::Abandoned));
}
