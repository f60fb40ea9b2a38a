//! Time source and the debounce slot the tracker schedules flushes into.
//!
//! Nothing here spawns threads or sleeps. The host calls
//! [`Scheduler::take_due`] (through the tracker's `tick`) whenever it gets a
//! chance, which keeps the whole engine single-threaded and lets tests drive
//! time with [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Delayed work with at most one pending job.
pub trait Scheduler<J> {
    /// Schedule `job` to become due after `delay_ms`, replacing any pending job.
    fn schedule(&mut self, delay_ms: u64, job: J);

    fn cancel_pending(&mut self);

    /// Hand out the pending job if its deadline has passed.
    fn take_due(&mut self) -> Option<J>;

    fn is_pending(&self) -> bool;
}

/// Single-slot debounce timer reading deadlines from a [`Clock`].
#[derive(Debug)]
pub struct DebounceTimer<C, J> {
    clock: C,
    pending: Option<(u64, J)>,
}

impl<C: Clock, J> DebounceTimer<C, J> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            pending: None,
        }
    }
}

impl<C: Clock, J> Scheduler<J> for DebounceTimer<C, J> {
    fn schedule(&mut self, delay_ms: u64, job: J) {
        let deadline = self.clock.now_ms().saturating_add(delay_ms);
        self.pending = Some((deadline, job));
    }

    fn cancel_pending(&mut self) {
        self.pending = None;
    }

    fn take_due(&mut self) -> Option<J> {
        let now = self.clock.now_ms();
        let due = matches!(&self.pending, Some((deadline, _)) if *deadline <= now);
        if due {
            self.pending.take().map(|(_, job)| job)
        } else {
            None
        }
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
