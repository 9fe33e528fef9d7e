//! Unit tests for the scoped emitter.

use humanboard_dnd::Emitter;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Event {
    Enter,
    Leave,
}

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&u32)>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let make = move |name: &str| -> Box<dyn Fn(&u32)> {
        let sink = sink.clone();
        let name = name.to_string();
        Box::new(move |payload: &u32| sink.borrow_mut().push(format!("{name}:{payload}")))
    };
    (log, make)
}

#[test]
fn test_scoped_listeners_fire_before_globals() {
    let emitter: Emitter<Event, u32> = Emitter::new();
    let (log, make) = recorder();

    emitter.on(Event::Enter, None, make("global"));
    emitter.on(Event::Enter, Some("card-1"), make("card-1"));
    emitter.on(Event::Enter, Some("card-2"), make("card-2"));

    emitter.emit(Event::Enter, &7, Some("card-1"));
    assert_eq!(*log.borrow(), vec!["card-1:7", "global:7"]);
}

#[test]
fn test_unscoped_emit_skips_scoped_listeners() {
    let emitter: Emitter<Event, u32> = Emitter::new();
    let (log, make) = recorder();

    emitter.on(Event::Leave, Some("card-1"), make("scoped"));
    emitter.on(Event::Leave, None, make("global"));
    emitter.on(Event::Enter, None, make("other"));

    emitter.emit(Event::Leave, &1, None);
    assert_eq!(*log.borrow(), vec!["global:1"]);
}

#[test]
fn test_off_removes_listener() {
    let emitter: Emitter<Event, u32> = Emitter::new();
    let (log, make) = recorder();

    let id = emitter.on(Event::Enter, None, make("a"));
    assert_eq!(emitter.listener_count(), 1);
    assert!(emitter.off(id));
    assert!(!emitter.off(id));

    emitter.emit(Event::Enter, &1, None);
    assert!(log.borrow().is_empty());
    assert_eq!(emitter.listener_count(), 0);
}

#[test]
fn test_listener_may_unsubscribe_during_emit() {
    let emitter: Rc<Emitter<Event, u32>> = Rc::new(Emitter::new());
    let hits = Rc::new(RefCell::new(0));

    let slot = Rc::new(RefCell::new(None));
    let inner = emitter.clone();
    let own_id = slot.clone();
    let counter = hits.clone();
    let id = emitter.on(Event::Enter, None, move |_| {
        *counter.borrow_mut() += 1;
        if let Some(id) = *own_id.borrow() {
            inner.off(id);
        }
    });
    *slot.borrow_mut() = Some(id);

    emitter.emit(Event::Enter, &1, None);
    emitter.emit(Event::Enter, &2, None);
    assert_eq!(*hits.borrow(), 1);
}
