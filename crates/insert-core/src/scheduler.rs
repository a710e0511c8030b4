use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// Held by whoever owns deferred work. Dropping it cancels everything it scheduled.
#[derive(Debug, Default)]
pub struct Liveness(Rc<()>);

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    fn watch(&self) -> Weak<()> {
        Rc::downgrade(&self.0)
    }
}

struct Deferred<T> {
    owner: Weak<()>,
    payload: T,
}

/// Zero-delay continuations, run FIFO one turn at a time.
pub struct Scheduler<T> {
    queue: VecDeque<Deferred<T>>,
    turns: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            turns: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, owner: &Liveness, payload: T) {
        self.queue.push_back(Deferred {
            owner: owner.watch(),
            payload,
        });
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Starts a turn: hands back everything queued before it, minus work whose owner is gone.
    /// Anything deferred while the batch runs waits for the next turn.
    pub fn take_turn(&mut self) -> Vec<T> {
        self.turns += 1;
        let batch = std::mem::take(&mut self.queue);
        let queued = batch.len();
        let live: Vec<T> = batch
            .into_iter()
            .filter(|task| task.owner.strong_count() > 0)
            .map(|task| task.payload)
            .collect();
        if live.len() < queued {
            log::trace!(
                "turn {}: dropped {} continuation(s) of destroyed owners",
                self.turns,
                queued - live.len()
            );
        }
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_in_order_and_skips_dead_owners() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let alive = Liveness::new();
        let doomed = Liveness::new();
        scheduler.defer(&alive, 1);
        scheduler.defer(&doomed, 2);
        scheduler.defer(&alive, 3);
        drop(doomed);

        assert_eq!(scheduler.pending(), 3);
        assert_eq!(scheduler.take_turn(), vec![1, 3]);
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.turns(), 1);
    }
}
