// core/timeline.rs
//
// Deferred task queue driven by the stage clock.
// Replaces ad hoc setTimeout / requestAnimationFrame callbacks with handles
// that can be inspected and cancelled.
//
// Usage:
//   let mut timeline = Timeline::new();
//   timeline.schedule(clock.now(), 1200, task);
//   timeline.next_frame(other);
//   for task in timeline.advance(clock.advance(dt)) { run(task) }

/// Handle to a scheduled task for later cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
enum When {
    /// Fires on the first advance whose time reaches `at`.
    At(f64),
    /// Fires on the first advance after the one during which it was armed.
    Frame(u64),
}

#[derive(Debug)]
struct Entry<T> {
    handle: TaskHandle,
    when: When,
    task: T,
}

impl<T> Entry<T> {
    fn is_due(&self, now: f64, frame: u64) -> bool {
        match self.when {
            When::At(at) => at <= now,
            When::Frame(armed) => armed < frame,
        }
    }

    fn sort_key(&self) -> (u8, f64, u64) {
        match self.when {
            When::At(at) => (0, at, self.handle.0),
            When::Frame(_) => (1, 0.0, self.handle.0),
        }
    }
}

/// Pending tasks, each firing exactly once unless cancelled.
#[derive(Debug)]
pub struct Timeline<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
    frame: u64,
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(16),
            next_id: 1,
            frame: 0,
        }
    }

    fn next_handle(&mut self) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        handle
    }

    /// Run `task` once `delay_ms` has elapsed after `now`.
    pub fn schedule(&mut self, now: f64, delay_ms: u32, task: T) -> TaskHandle {
        let handle = self.next_handle();
        self.entries.push(Entry {
            handle,
            when: When::At(now + f64::from(delay_ms)),
            task,
        });
        handle
    }

    /// Run `task` on the next frame, never on the current one.
    pub fn next_frame(&mut self, task: T) -> TaskHandle {
        let handle = self.next_handle();
        self.entries.push(Entry {
            handle,
            when: When::Frame(self.frame),
            task,
        });
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Drop every pending task.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Start a new frame at time `now` and remove every task now due.
    /// Timed tasks come first in due order, then frame tasks, ties broken
    /// by scheduling order. Tasks scheduled while the result is being
    /// processed wait for the next advance.
    pub fn advance(&mut self, now: f64) -> Vec<T> {
        self.frame += 1;
        let frame = self.frame;

        let (mut due, pending): (Vec<Entry<T>>, Vec<Entry<T>>) =
            std::mem::take(&mut self.entries)
                .into_iter()
                .partition(|e| e.is_due(now, frame));
        self.entries = pending;

        due.sort_by(|a, b| {
            let (ka, kb) = (a.sort_key(), b.sort_key());
            ka.0.cmp(&kb.0)
                .then(ka.1.total_cmp(&kb.1))
                .then(ka.2.cmp(&kb.2))
        });
        due.into_iter().map(|e| e.task).collect()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
