//! Cooperative frame and timer scheduling.
//!
//! The engine is single-threaded: every piece of deferred work (animation
//! frames, debounces, drop finalization, waiting for view nodes to mount)
//! goes through a [`Scheduler`] that the host pumps once per animation
//! frame with [`Scheduler::run_frame`].
//!
//! ## Ordering
//!
//! ```text
//! run_frame(now):
//!   1. advance clock to `now`
//!   2. run due timers in due order (including timers that become due
//!      while running this step)
//!   3. run frame tasks queued before this call
//! ```
//!
//! Frame tasks queued while a frame runs are deferred to the next frame,
//! so self-rescheduling loops (auto-scroll) advance once per frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Returns a value once the view layer has mounted it.
pub type NodeProbe<T> = Rc<dyn Fn() -> Option<T>>;

/// Handle for cancelling a queued task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct Timer {
    id: TaskId,
    due: Duration,
    task: Task,
}

/// Animation-frame and timeout queue driven by the host.
#[derive(Default)]
pub struct Scheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    frame_tasks: RefCell<Vec<(TaskId, Task)>>,
    timers: RefCell<Vec<Timer>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_task_id(&self) -> TaskId {
        let id = TaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        id
    }

    /// Current clock value (the `now` of the last frame).
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Queue a task for the next animation frame.
    pub fn request_frame(&self, task: impl FnOnce() + 'static) -> TaskId {
        let id = self.next_task_id();
        self.frame_tasks.borrow_mut().push((id, Box::new(task)));
        id
    }

    /// Queue a task to run once `delay` has elapsed.
    pub fn set_timeout(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskId {
        let id = self.next_task_id();
        self.timers.borrow_mut().push(Timer {
            id,
            due: self.now.get() + delay,
            task: Box::new(task),
        });
        id
    }

    /// Cancel a frame task or timer. Returns false if it already ran.
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut frames = self.frame_tasks.borrow_mut();
        if let Some(pos) = frames.iter().position(|(task_id, _)| *task_id == id) {
            frames.remove(pos);
            return true;
        }
        drop(frames);

        let mut timers = self.timers.borrow_mut();
        if let Some(pos) = timers.iter().position(|timer| timer.id == id) {
            timers.remove(pos);
            return true;
        }
        false
    }

    /// Whether a task is still queued.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.frame_tasks.borrow().iter().any(|(task_id, _)| *task_id == id)
            || self.timers.borrow().iter().any(|timer| timer.id == id)
    }

    pub fn pending_frame_tasks(&self) -> usize {
        self.frame_tasks.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Advance the clock and run everything that is due.
    pub fn run_frame(&self, now: Duration) {
        if now > self.now.get() {
            self.now.set(now);
        }

        while let Some(task) = self.take_next_due_timer() {
            task();
        }

        let frame_tasks = std::mem::take(&mut *self.frame_tasks.borrow_mut());
        for (_, task) in frame_tasks {
            task();
        }
    }

    /// Run frames at `step` intervals until `until` is reached.
    pub fn run_until(&self, until: Duration, step: Duration) {
        let step = step.max(Duration::from_millis(1));
        let mut now = self.now.get();
        while now < until {
            now = (now + step).min(until);
            self.run_frame(now);
        }
    }

    fn take_next_due_timer(&self) -> Option<Task> {
        let mut timers = self.timers.borrow_mut();
        let now = self.now.get();
        let pos = timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(pos, _)| pos)?;
        Some(timers.remove(pos).task)
    }

    /// Poll `probe` once per frame until it yields, then hand the value to
    /// `on_ready`. Polling stops early if `alive` returns false.
    pub fn when_ready<T: 'static>(
        self: &Rc<Self>,
        probe: NodeProbe<T>,
        alive: impl Fn() -> bool + 'static,
        on_ready: impl FnOnce(T) + 'static,
    ) {
        poll_ready(Rc::downgrade(self), probe, Rc::new(alive), Box::new(on_ready));
    }

    /// Drop every queued task.
    pub fn clear(&self) {
        self.frame_tasks.borrow_mut().clear();
        self.timers.borrow_mut().clear();
    }
}

fn poll_ready<T: 'static>(
    scheduler: std::rc::Weak<Scheduler>,
    probe: NodeProbe<T>,
    alive: Rc<dyn Fn() -> bool>,
    on_ready: Box<dyn FnOnce(T)>,
) {
    if !alive() {
        return;
    }
    if let Some(value) = probe() {
        on_ready(value);
        return;
    }
    let Some(strong) = scheduler.upgrade() else {
        return;
    };
    strong.request_frame(move || poll_ready(scheduler, probe, alive, on_ready));
}

// ============================================================================
// Debouncer
// ============================================================================

/// A single cancellable timer slot: scheduling replaces the pending task.
#[derive(Default)]
pub struct Debouncer {
    pending: Cell<Option<TaskId>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending task and schedule `task` after `delay`.
    pub fn schedule(&self, scheduler: &Scheduler, delay: Duration, task: impl FnOnce() + 'static) {
        self.cancel(scheduler);
        self.pending.set(Some(scheduler.set_timeout(delay, task)));
    }

    pub fn cancel(&self, scheduler: &Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
    }

    pub fn is_pending(&self, scheduler: &Scheduler) -> bool {
        self.pending.get().is_some_and(|id| scheduler.is_pending(id))
    }
}
