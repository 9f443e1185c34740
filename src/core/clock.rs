//! Cancellable periodic tasks on a virtual clock, and the highlight counters
//! they drive.
//!
//! The scheduler never sleeps and never calls back into panels. The host owns
//! real time and moves the virtual clock forward; due ticks are popped one at a
//! time so a cancellation issued while handling one tick is honored before the
//! next is delivered.

use std::time::Duration;

use hashbrown::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Ownership token for a running periodic task.
///
/// Not `Clone`: the only way to stop the task is to give this back to
/// [`Scheduler::cancel`].
#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    name: &'static str,
    interval: Duration,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[derive(Debug)]
struct PeriodicTask {
    name: &'static str,
    interval_ms: u64,
    next_due_ms: u64,
}

/// One delivered tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub task: TaskId,
    pub name: &'static str,
    pub at_ms: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    tasks: HashMap<TaskId, PeriodicTask>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// First tick lands one full interval after the spawn instant.
    pub fn spawn_periodic(&mut self, name: &'static str, interval: Duration) -> TaskHandle {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let interval_ms = (interval.as_millis().min(u64::MAX as u128) as u64).max(1);
        self.tasks.insert(
            id,
            PeriodicTask {
                name,
                interval_ms,
                next_due_ms: self.now_ms.saturating_add(interval_ms),
            },
        );
        debug!(task = name, ?id, interval_ms, "periodic task spawned");
        TaskHandle {
            id,
            name,
            interval: Duration::from_millis(interval_ms),
        }
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let removed = self.tasks.remove(&handle.id).is_some();
        debug!(task = handle.name, id = ?handle.id, removed, "periodic task cancelled");
        removed
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn active_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.tasks.values().map(|t| t.name).collect();
        names.sort_unstable();
        names
    }

    /// Earliest tick due at or before `until_ms`, ties broken by spawn order.
    /// Moves the virtual clock to the tick's due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired> {
        let (&id, task) = self
            .tasks
            .iter_mut()
            .filter(|(_, t)| t.next_due_ms <= until_ms)
            .min_by_key(|(id, t)| (t.next_due_ms, **id))?;

        let at_ms = task.next_due_ms;
        task.next_due_ms = at_ms.saturating_add(task.interval_ms);
        self.now_ms = self.now_ms.max(at_ms);
        Some(Fired {
            task: id,
            name: task.name,
            at_ms,
        })
    }

    /// Move the virtual clock to `until_ms` once every due tick was popped.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
}

/// A bounded highlight counter advanced by its own periodic task.
///
/// The counter lives in `[0, modulus)` and wraps. It may start at `None`
/// ("nothing highlighted yet"); the first tick then selects index 0.
#[derive(Debug)]
pub struct AnimationClock {
    name: &'static str,
    interval: Duration,
    modulus: usize,
    highlight: Option<usize>,
    task: Option<TaskHandle>,
}

impl AnimationClock {
    pub fn new(
        name: &'static str,
        interval: Duration,
        modulus: usize,
        initial: Option<usize>,
    ) -> Self {
        let modulus = modulus.max(1);
        Self {
            name,
            interval,
            modulus,
            highlight: initial.map(|h| h % modulus),
            task: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn modulus(&self) -> usize {
        self.modulus
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn state(&self) -> ClockState {
        if self.task.is_some() {
            ClockState::Running
        } else {
            ClockState::Idle
        }
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task.as_ref().map(TaskHandle::id)
    }

    pub fn start(&mut self, scheduler: &mut Scheduler) {
        if self.task.is_some() {
            return;
        }
        self.task = Some(scheduler.spawn_periodic(self.name, self.interval));
    }

    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(handle) = self.task.take() {
            scheduler.cancel(handle);
        }
    }

    /// Advance if `task` is this clock's live ticker. Stale or foreign ids are
    /// ignored, so nothing moves after `stop`.
    pub fn on_tick(&mut self, task: TaskId) -> bool {
        if self.task_id() != Some(task) {
            return false;
        }
        self.highlight = Some(match self.highlight {
            None => 0,
            Some(h) => (h + 1) % self.modulus,
        });
        true
    }

    /// Re-derive the cycle bound. A different effective modulus replaces the
    /// running ticker and folds the current highlight back into range.
    pub fn set_modulus(&mut self, modulus: usize, scheduler: &mut Scheduler) -> bool {
        let modulus = modulus.max(1);
        if modulus == self.modulus {
            return false;
        }
        debug!(
            clock = self.name,
            from = self.modulus,
            to = modulus,
            "clock modulus changed"
        );
        self.modulus = modulus;
        self.highlight = self.highlight.map(|h| h % modulus);
        if self.task.is_some() {
            self.stop(scheduler);
            self.start(scheduler);
        }
        true
    }
}
