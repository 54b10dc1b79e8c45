//! Scheduler backed by a tokio `LocalSet`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tokio::task::JoinHandle;

use super::scheduler::{ScheduleHandle, Scheduler, Task};

#[derive(Default)]
struct Spawned {
    next_handle: u64,
    tasks: HashMap<ScheduleHandle, JoinHandle<()>>,
}

/// Runs deferred tasks as local tokio tasks.
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so the scheduler must
/// be used from inside a [`tokio::task::LocalSet`]. Each task yields once
/// before running, which places it after work already queued on the executor.
#[derive(Clone, Default)]
pub struct TokioScheduler {
    spawned: Rc<RefCell<Spawned>>,
}

impl TokioScheduler {
    /// A scheduler with no spawned tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spawned tasks that have not started yet.
    pub fn pending(&self) -> usize {
        self.spawned.borrow().tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, task: Task) -> ScheduleHandle {
        let handle = {
            let mut spawned = self.spawned.borrow_mut();
            spawned.next_handle += 1;
            ScheduleHandle(spawned.next_handle)
        };

        let registry = Rc::clone(&self.spawned);
        let join = tokio::task::spawn_local(async move {
            tokio::task::yield_now().await;
            registry.borrow_mut().tasks.remove(&handle);
            task();
        });

        self.spawned.borrow_mut().tasks.insert(handle, join);
        handle
    }

    fn cancel(&self, handle: ScheduleHandle) {
        if let Some(join) = self.spawned.borrow_mut().tasks.remove(&handle) {
            join.abort();
        }
    }
}
