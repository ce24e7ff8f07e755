//! Start-gap rotation wrapper.
//!
//! Decorates any base scheduler with a slow logical-to-physical rotation of
//! tenant ids: every `rotate_every` picks, the rotation offset advances by
//! `gap`. The published id is `(base + start) % users`; a one-shot mapping
//! translates the very next `pop` back to the base id, so the base scheduler
//! sees an unchanging tenant space. The rotation breaks pathological
//! alignments between workload phase and scheduler rotation.

use crate::request::Request;
use crate::Scheduler;

/// Start-gap wrapper over a boxed base scheduler.
#[derive(Debug)]
pub struct StartGap {
    base: Box<Scheduler>,
    rotate_every: u32,
    gap: u32,
    rotate_count: u32,
    start: usize,
    users: usize,
    /// (published, base) for the pick in flight; consumed by `pop`.
    remap: Option<(u32, u32)>,
}

impl StartGap {
    pub fn new(base: Scheduler) -> Self {
        Self {
            base: Box::new(base),
            rotate_every: 200,
            gap: 1,
            rotate_count: 0,
            start: 0,
            users: 0,
            remap: None,
        }
    }

    /// Configure the rotation cadence; both knobs clamp to at least 1.
    pub fn set_rotation(&mut self, rotate_every: u32, gap: u32) {
        self.rotate_every = rotate_every.max(1);
        self.gap = gap.max(1);
    }

    pub fn set_users(&mut self, n: usize) {
        self.users = n;
        self.base.set_users(n);
        self.remap = None;
        self.rotate_count = 0;
        self.start = 0;
    }

    pub fn set_weights(&mut self, weights: &[f64]) {
        self.base.set_weights(weights);
    }

    pub fn set_quantum(&mut self, quantum: f64) {
        self.base.set_quantum(quantum);
    }

    pub fn enqueue(&mut self, request: Request) {
        self.base.enqueue(request);
    }

    pub fn pick_user(&mut self, now: f64) -> Option<u32> {
        if self.users == 0 {
            return None;
        }
        let base_uid = self.base.pick_user(now)?;

        self.rotate_count += 1;
        if self.rotate_count >= self.rotate_every {
            self.start = (self.start + self.gap as usize) % self.users;
            self.rotate_count = 0;
        }

        let published = ((base_uid as usize + self.start) % self.users) as u32;
        self.remap = Some((published, base_uid));
        Some(published)
    }

    pub fn pop(&mut self, uid: u32) -> Option<Request> {
        let actual = match self.remap {
            Some((published, base_uid)) if published == uid => {
                self.remap = None;
                base_uid
            }
            _ => uid,
        };
        self.base.pop(actual)
    }

    pub fn empty(&self) -> bool {
        self.base.empty()
    }
}
