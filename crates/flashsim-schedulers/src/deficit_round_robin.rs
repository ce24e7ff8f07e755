//! Deficit round robin scheduling policy.
//!
//! Byte-level fairness via per-tenant credit. Each scan credits a tenant with
//! its effective quantum before its head request is considered, so a tenant
//! whose head exceeds the accumulated credit waits for later scans. Crediting
//! during selection and clamping the deficit at zero on pop together keep a
//! tenant's long-run share proportional to its weight without letting an
//! empty queue bank unbounded credit.

use crate::request::Request;
use std::collections::VecDeque;

const DEFAULT_QUANTUM_BYTES: f64 = 4096.0;

/// Deficit round robin scheduler.
#[derive(Debug)]
pub struct DeficitRoundRobin {
    queues: Vec<VecDeque<Request>>,
    deficit: Vec<i64>,
    weights: Vec<f64>,
    quantum: f64,
    next: usize,
}

impl DeficitRoundRobin {
    pub fn new() -> Self {
        Self {
            queues: Vec::new(),
            deficit: Vec::new(),
            weights: Vec::new(),
            quantum: DEFAULT_QUANTUM_BYTES,
            next: 0,
        }
    }

    pub fn set_users(&mut self, n: usize) {
        self.queues = vec![VecDeque::new(); n];
        self.deficit = vec![0; n];
        self.weights = vec![1.0; n];
        self.next = 0;
    }

    /// Set the quantum in bytes; non-positive values leave the current one.
    pub fn set_quantum(&mut self, quantum: f64) {
        if quantum > 0.0 {
            self.quantum = quantum;
        }
    }

    /// Reset weights to 1.0, then apply the provided prefix clamped to >= 0.
    /// Existing deficit counters are kept across weight updates.
    pub fn set_weights(&mut self, weights: &[f64]) {
        if self.queues.is_empty() {
            return;
        }
        self.weights = vec![1.0; self.queues.len()];
        for (dst, src) in self.weights.iter_mut().zip(weights) {
            *dst = src.max(0.0);
        }
    }

    pub fn enqueue(&mut self, request: Request) {
        if let Some(queue) = self.queues.get_mut(request.user_id as usize) {
            queue.push_back(request);
        }
    }

    /// Credit each scanned non-empty tenant, selecting the first whose head
    /// fits its deficit. Returns `None` when no head fits this scan; credit
    /// persists, so a later scan will succeed.
    pub fn pick_user(&mut self, _now: f64) -> Option<u32> {
        let n = self.queues.len();
        for i in 0..n {
            let uid = (self.next + i) % n;
            let Some(head_size) = self.queues[uid].front().map(|r| r.size_bytes) else {
                continue;
            };
            self.deficit[uid] += self.effective_quantum(uid);
            if self.deficit[uid] >= i64::from(head_size) {
                self.next = (uid + 1) % n;
                return Some(uid as u32);
            }
        }
        None
    }

    pub fn pop(&mut self, uid: u32) -> Option<Request> {
        let request = self.queues.get_mut(uid as usize)?.pop_front()?;
        let deficit = &mut self.deficit[uid as usize];
        *deficit = (*deficit - i64::from(request.size_bytes)).max(0);
        Some(request)
    }

    pub fn empty(&self) -> bool {
        self.queues.iter().all(|q| q.is_empty())
    }

    /// Per-scan credit: at least one byte, so starvation is impossible even
    /// at weight zero.
    fn effective_quantum(&self, uid: usize) -> i64 {
        ((self.quantum * self.weights[uid]).floor() as i64).max(1)
    }
}

impl Default for DeficitRoundRobin {
    fn default() -> Self {
        Self::new()
    }
}
