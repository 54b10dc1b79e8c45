//! Deferred-execution capability supplied by the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A one-shot task handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce()>;

/// Identifies a scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(pub u64);

/// Runs a task once, soon, on a later turn of the host loop.
///
/// Implementations decide what "soon" means: the next idle turn of an
/// executor, the next frame, a manual pump in tests. A task must never run
/// inside the `schedule_once` call that submitted it.
pub trait Scheduler {
    /// Run `task` once, on a later turn than the current call.
    fn schedule_once(&self, task: Task) -> ScheduleHandle;

    /// Cancel a task that has not run yet. Unknown or finished handles are
    /// ignored.
    fn cancel(&self, handle: ScheduleHandle);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule_once(&self, task: Task) -> ScheduleHandle {
        (**self).schedule_once(task)
    }

    fn cancel(&self, handle: ScheduleHandle) {
        (**self).cancel(handle)
    }
}

#[derive(Default)]
struct ManualQueue {
    next_handle: u64,
    tasks: VecDeque<(ScheduleHandle, Task)>,
}

/// Scheduler pumped explicitly by the host.
///
/// Each [`ManualScheduler::run_pending`] call is one turn of the host loop:
/// it runs the tasks that were queued before the call. Tasks scheduled while
/// the turn runs wait for the next one.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualScheduler {
    /// A scheduler with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one turn. Returns how many tasks ran.
    pub fn run_pending(&self) -> usize {
        let turn = self.queue.borrow().tasks.len();
        let mut ran = 0;

        for _ in 0..turn {
            // Cancellation during the turn may shrink the queue.
            let next = self.queue.borrow_mut().tasks.pop_front();
            let Some((_, task)) = next else {
                break;
            };
            task();
            ran += 1;
        }

        ran
    }

    /// Run turns until nothing is queued. Returns how many tasks ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let turn = self.run_pending();
            if turn == 0 {
                return ran;
            }
            ran += turn;
        }
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, task: Task) -> ScheduleHandle {
        let mut queue = self.queue.borrow_mut();
        queue.next_handle += 1;
        let handle = ScheduleHandle(queue.next_handle);
        queue.tasks.push_back((handle, task));
        handle
    }

    fn cancel(&self, handle: ScheduleHandle) {
        self.queue
            .borrow_mut()
            .tasks
            .retain(|(queued, _)| *queued != handle);
    }
}
