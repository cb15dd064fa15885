/// Run coalescing
///
/// A depth-1 work queue: at most one cycle runs at a time, and any number of
/// triggers arriving while it runs collapse into exactly one follow-up cycle.
/// Independent of how triggers are produced, so it can be driven directly.
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescerState {
    Idle,
    Running,
    /// Running, with a trigger recorded for one more cycle.
    RunningWithPending,
}

/// What a call to [`Coalescer::trigger`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// This caller ran this many cycles back to back.
    Ran(usize),
    /// A cycle was already running; it will run once more when done.
    Coalesced,
}

pub struct Coalescer {
    state: Mutex<CoalescerState>,
    run: Box<dyn Fn() + Send + Sync>,
}

impl std::fmt::Debug for Coalescer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coalescer")
            .field("state", &self.state())
            .finish()
    }
}

impl Coalescer {
    /// Create an idle coalescer around one cycle.
    ///
    /// # Arguments
    /// * `run` - The cycle body; called on whichever thread wins [`Coalescer::trigger`]
    pub fn new(run: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            state: Mutex::new(CoalescerState::Idle),
            run: Box::new(run),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoalescerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CoalescerState {
        *self.lock()
    }

    /// Request a cycle.
    ///
    /// If idle, runs cycles on the calling thread until no trigger arrived
    /// during the last one. If busy, records a pending trigger and returns
    /// immediately.
    ///
    /// A panic inside a cycle is re-raised once the pending follow-up has
    /// run and the state is back to idle.
    pub fn trigger(&self) -> TriggerOutcome {
        {
            let mut state = self.lock();
            match *state {
                CoalescerState::Idle => *state = CoalescerState::Running,
                CoalescerState::Running | CoalescerState::RunningWithPending => {
                    *state = CoalescerState::RunningWithPending;
                    return TriggerOutcome::Coalesced;
                }
            }
        }

        let mut cycles = 0;
        let mut panicked = None;
        loop {
            // A panicking cycle must not strand the state in Running or lose a
            // trigger recorded while it ran.
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (self.run)())) {
                error!("cycle panicked");
                panicked.get_or_insert(payload);
            }
            cycles += 1;

            let mut state = self.lock();
            if *state == CoalescerState::RunningWithPending {
                *state = CoalescerState::Running;
                continue;
            }
            *state = CoalescerState::Idle;
            break;
        }

        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        TriggerOutcome::Ran(cycles)
    }
}
