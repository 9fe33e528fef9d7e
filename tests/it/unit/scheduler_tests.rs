//! Unit tests for frame and timer scheduling.

use humanboard_dnd::scheduler::{Debouncer, NodeProbe, Scheduler};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn test_frame_tasks_queued_during_frame_wait_for_next() {
    let scheduler = Rc::new(Scheduler::new());
    let log = Rc::new(RefCell::new(Vec::new()));

    let inner = scheduler.clone();
    let outer_log = log.clone();
    scheduler.request_frame(move || {
        outer_log.borrow_mut().push("first");
        let next_log = outer_log.clone();
        inner.request_frame(move || next_log.borrow_mut().push("second"));
    });

    scheduler.run_frame(ms(16));
    assert_eq!(*log.borrow(), vec!["first"]);
    scheduler.run_frame(ms(32));
    assert_eq!(*log.borrow(), vec!["first", "second"]);
}

#[test]
fn test_cancelled_timer_never_runs() {
    let scheduler = Scheduler::new();
    let ran = Rc::new(RefCell::new(false));
    let flag = ran.clone();
    let id = scheduler.set_timeout(ms(10), move || *flag.borrow_mut() = true);

    assert!(scheduler.is_pending(id));
    assert!(scheduler.cancel(id));
    scheduler.run_frame(ms(50));
    assert!(!*ran.borrow());
    assert!(!scheduler.cancel(id));
}

#[test]
fn test_debouncer_keeps_only_latest() {
    let scheduler = Scheduler::new();
    let debouncer = Debouncer::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    for value in 0..3 {
        let log = log.clone();
        debouncer.schedule(&scheduler, ms(100), move || log.borrow_mut().push(value));
        scheduler.run_frame(scheduler.now() + ms(40));
    }
    assert!(log.borrow().is_empty());
    assert!(debouncer.is_pending(&scheduler));

    scheduler.run_frame(scheduler.now() + ms(100));
    assert_eq!(*log.borrow(), vec![2]);
    assert!(!debouncer.is_pending(&scheduler));
}

#[test]
fn test_when_ready_polls_until_mounted() {
    let scheduler = Rc::new(Scheduler::new());
    let mounted = Rc::new(RefCell::new(None::<u32>));
    let seen = Rc::new(RefCell::new(None));

    let reader_slot = mounted.clone();
    let poll: NodeProbe<u32> = Rc::new(move || *reader_slot.borrow());
    let result = seen.clone();
    scheduler.when_ready(
        poll,
        || true,
        move |value| *result.borrow_mut() = Some(value),
    );

    scheduler.run_frame(ms(16));
    assert_eq!(*seen.borrow(), None);
    *mounted.borrow_mut() = Some(42);
    scheduler.run_frame(ms(32));
    assert_eq!(*seen.borrow(), Some(42));
    assert_eq!(scheduler.pending_frame_tasks(), 0);
}

#[test]
fn test_when_ready_stops_when_owner_dies() {
    let scheduler = Rc::new(Scheduler::new());
    let alive = Rc::new(RefCell::new(true));
    let still_alive = alive.clone();

    let poll: NodeProbe<u32> = Rc::new(|| None);
    scheduler.when_ready(
        poll,
        move || *still_alive.borrow(),
        |_| panic!("never mounted"),
    );
    scheduler.run_frame(ms(16));
    assert_eq!(scheduler.pending_frame_tasks(), 1);

    *alive.borrow_mut() = false;
    scheduler.run_frame(ms(32));
    assert_eq!(scheduler.pending_frame_tasks(), 0);
}
