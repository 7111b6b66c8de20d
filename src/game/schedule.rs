//! Frame-counted delayed tasks.
//!
//! Work that should happen "a little later" is queued against a target
//! frame number and drained at the start of that frame, so replays of the
//! same inputs always run it on the same tick.

/// Work the board can defer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTask {
    /// Drop every bubble no longer connected to the anchor row.
    DetachFloating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled<T> {
    run_at_frame: u64,
    task: T,
}

/// Tasks waiting for their frame, kept in scheduling order.
#[derive(Debug, Clone)]
pub struct DeferredTasks<T> {
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for DeferredTasks<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T> DeferredTasks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run on `run_at_frame`.
    pub fn schedule(&mut self, run_at_frame: u64, task: T) {
        self.pending.push(Scheduled { run_at_frame, task });
    }

    /// Remove and return every task due on or before `frame`, oldest first.
    pub fn drain_due(&mut self, frame: u64) -> Vec<T> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|s| s.run_at_frame <= frame);
        self.pending = waiting;
        due.into_iter().map(|s| s.task).collect()
    }

    /// Frame of the earliest pending task.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.run_at_frame).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_wait_for_their_frame() {
        let mut tasks = DeferredTasks::new();
        tasks.schedule(5, "a");
        tasks.schedule(3, "b");
        assert_eq!(tasks.next_due(), Some(3));

        assert!(tasks.drain_due(2).is_empty());
        assert_eq!(tasks.drain_due(3), vec!["b"]);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks.drain_due(10), vec!["a"]);
        assert!(tasks.is_empty());
        assert_eq!(tasks.next_due(), None);
    }

    #[test]
    fn test_same_frame_keeps_scheduling_order() {
        let mut tasks = DeferredTasks::new();
        tasks.schedule(4, 1);
        tasks.schedule(4, 2);
        tasks.schedule(4, 3);
        assert_eq!(tasks.drain_due(4), vec![1, 2, 3]);
    }
}
