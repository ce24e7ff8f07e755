//! Virtual clock for the discrete-event loop.
//!
//! Simulation time is a floating-point scalar in seconds, advanced only by
//! the driver when it processes a completion or fast-forwards to the next
//! arrival. There is no wall-clock coupling, so runs are deterministic
//! regardless of host speed.

/// Virtual simulation clock in seconds.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: f64,
}

impl SimClock {
    /// A clock starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Advance to an absolute time.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `t` is in the past.
    pub fn advance_to(&mut self, t: f64) {
        debug_assert!(
            t >= self.now,
            "cannot move clock backwards: now={}, target={}",
            self.now,
            t,
        );
        self.now = t;
    }
}
