//! Millisecond frame clocks
//!
//! Label animation only ever needs "what time is it now", read once per
//! draw or undraw pass and handed to every label in that pass.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of the current time in milliseconds
pub trait Clock {
    fn now(&self) -> u32;
}

/// Wall clock measured from the moment it was created
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u32 {
        // Wraps after ~49 days, same as SDL_GetTicks
        self.started.elapsed().as_millis() as u32
    }
}

/// Clock that only moves when told to
///
/// Clones share the same reading, so a test can hand one clone to the
/// label service and keep another to advance time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u32) {
        self.ticks.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.ticks.set(self.ticks.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u32 {
        self.ticks.get()
    }
}
