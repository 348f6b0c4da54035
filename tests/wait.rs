use coro::{RuntimeBuilder, Status};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

#[test]
fn test_wait_on_immediate_return() {
    let rt = RuntimeBuilder::new().build();

    rt.block_on(|| {
        let handle = coro::start("quick", || {});
        assert_eq!(coro::alive(), 2);

        coro::wait(handle);

        assert_eq!(coro::alive(), 1);
    });
}

#[test]
fn test_waiter_sees_completed_body() {
    let rt = RuntimeBuilder::new().build();
    let steps = Rc::new(Cell::new(0));

    rt.block_on(|| {
        let counter = steps.clone();
        let handle = coro::start("stepper", move || {
            for _ in 0..10 {
                counter.set(counter.get() + 1);
                coro::yield_now();
            }
        });

        coro::wait(handle);
        assert_eq!(steps.get(), 10);
    });
}

#[test]
fn test_other_coroutine_runs_while_waiting() {
    let rt = RuntimeBuilder::new().seed(3).build();
    let b_ran = Rc::new(Cell::new(false));

    rt.block_on(|| {
        let a = coro::start("a", || {
            for _ in 0..50 {
                coro::yield_now();
            }
        });

        let flag = b_ran.clone();
        let b = coro::start("b", move || flag.set(true));

        coro::wait(a);
        assert!(b_ran.get(), "b never ran during a's 50 yields");

        coro::wait(b);
    });
}

#[test]
fn test_recycled_slot_reflects_new_enrollment() {
    let rt = RuntimeBuilder::new().capacity(2).build();
    let log = Rc::new(RefCell::new(Vec::new()));

    rt.block_on(|| {
        let first_log = log.clone();
        let first = coro::start("first", move || first_log.borrow_mut().push(1));
        let slot = first.index();
        coro::wait(first);

        let second_log = log.clone();
        let second = coro::start("second", move || second_log.borrow_mut().push(2));
        assert_eq!(second.index(), slot);
        assert_eq!(second.name(), "second");
        assert_eq!(coro::status(&second), Status::New);

        coro::wait(second);
    });

    assert_eq!(*log.borrow(), [1, 2]);
}

#[test]
fn test_nested_coroutines() {
    let rt = RuntimeBuilder::new().build();
    let leaves = Rc::new(Cell::new(0));

    rt.block_on(|| {
        let counter = leaves.clone();
        let parent = coro::start("parent", move || {
            let children: Vec<_> = (0..4)
                .map(|_| {
                    let counter = counter.clone();
                    coro::start("child", move || {
                        coro::yield_now();
                        counter.set(counter.get() + 1);
                    })
                })
                .collect();

            for child in children {
                coro::wait(child);
            }

            assert_eq!(coro::current_name(), "parent");
        });

        coro::wait(parent);
    });

    assert_eq!(leaves.get(), 4);
    assert_eq!(rt.alive(), 1);
}

#[test]
fn test_panic_is_resumed_in_waiter() {
    let rt = RuntimeBuilder::new().build();

    rt.block_on(|| {
        let handle = coro::start("faulty", || {
            coro::yield_now();
            panic!("boom");
        });

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| coro::wait(handle)));
        let payload = outcome.expect_err("panic was swallowed");

        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
        assert_eq!(coro::alive(), 1);

        let after = coro::start("after", || {});
        coro::wait(after);
    });
}

#[test]
fn test_wait_on_self_is_rejected() {
    let rt = RuntimeBuilder::new().build();
    let own: Rc<RefCell<Option<coro::Handle>>> = Rc::new(RefCell::new(None));
    let rejected = Rc::new(Cell::new(false));
    let done = Rc::new(Cell::new(false));

    rt.block_on(|| {
        let slot = own.clone();
        let flag = rejected.clone();
        let finished = done.clone();

        let handle = coro::start("narcissus", move || {
            let me = slot.borrow_mut().take().expect("handle not published");
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| coro::wait(me)));
            flag.set(outcome.is_err());
            finished.set(true);
        });
        *own.borrow_mut() = Some(handle);

        while !done.get() {
            coro::yield_now();
        }
    });

    assert!(rejected.get());
}

#[test]
#[should_panic(expected = "does not refer to a live coroutine")]
fn test_foreign_handle_is_rejected() {
    let first = RuntimeBuilder::new().build();
    let second = RuntimeBuilder::new().build();

    let handle = first.block_on(|| coro::start("elsewhere", || {}));

    second.block_on(|| coro::wait(handle));
}

#[test]
fn test_foreign_handle_rejected_when_slot_is_occupied() {
    let first = RuntimeBuilder::new().build();
    let second = RuntimeBuilder::new().build();
    let ran = Rc::new(Cell::new(false));

    let foreign = first.block_on(|| coro::start("elsewhere", || {}));

    second.block_on(|| {
        let flag = ran.clone();
        let mine = coro::start("mine", move || flag.set(true));
        assert_eq!(mine.index(), foreign.index());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| coro::wait(foreign)));
        let payload = outcome.expect_err("foreign handle was accepted");
        let message = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .unwrap_or_default();
        assert!(message.contains("does not refer to a live coroutine"), "{message}");

        assert!(!ran.get());
        assert_eq!(coro::status(&mine), Status::New);
        assert_eq!(coro::alive(), 2);

        coro::wait(mine);
        assert!(ran.get());
    });

    assert_eq!(second.alive(), 1);
    assert_eq!(first.alive(), 2);
}

#[test]
#[should_panic(expected = "block_on called from inside a coroutine")]
fn test_block_on_from_own_coroutine() {
    let rt = Rc::new(RuntimeBuilder::new().build());
    let inner = rt.clone();

    rt.block_on(|| {
        let handle = coro::start("reentrant", move || inner.block_on(|| ()));
        coro::wait(handle);
    });
}
