//! Weighted fair queueing with virtual-time finish tags.
//!
//! Each request is tagged at enqueue with the virtual time at which it would
//! finish under ideal GPS service: `max(last_finish[u], virtual_time) +
//! size / weight[u]`. Selection picks the head with the smallest finish tag.
//! Tagging at arrival rather than dispatch yields GPS-approximating order;
//! taking the max against the global virtual time keeps a tenant returning
//! from idle from spending credit banked in the past.

use crate::request::Request;
use std::collections::VecDeque;

/// Floor for weights, preventing division by zero in the tag formula.
const MIN_WEIGHT: f64 = 1e-9;

#[derive(Debug, Clone)]
struct TaggedRequest {
    request: Request,
    finish_tag: f64,
}

/// Weighted fair queueing scheduler.
#[derive(Debug, Default)]
pub struct WeightedFair {
    queues: Vec<VecDeque<TaggedRequest>>,
    weights: Vec<f64>,
    last_finish: Vec<f64>,
    virtual_time: f64,
    active_flows: usize,
}

impl WeightedFair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_users(&mut self, n: usize) {
        self.queues = vec![VecDeque::new(); n];
        self.weights = vec![1.0; n];
        self.last_finish = vec![0.0; n];
        self.active_flows = 0;
    }

    pub fn set_weights(&mut self, weights: &[f64]) {
        if self.queues.is_empty() {
            return;
        }
        for i in 0..self.queues.len() {
            self.weights[i] = match weights.get(i) {
                Some(w) => w.max(MIN_WEIGHT),
                None => 1.0,
            };
        }
    }

    /// Tag and append; increments the active-flow count on an
    /// enqueue-into-empty transition.
    pub fn enqueue(&mut self, request: Request) {
        let uid = request.user_id as usize;
        if uid >= self.queues.len() {
            return;
        }

        let start_tag = self.last_finish[uid].max(self.virtual_time);
        let finish_tag = start_tag + f64::from(request.size_bytes) / self.weights[uid];
        self.last_finish[uid] = finish_tag;

        let was_empty = self.queues[uid].is_empty();
        self.queues[uid].push_back(TaggedRequest {
            request,
            finish_tag,
        });
        if was_empty {
            self.active_flows += 1;
        }
    }

    /// Tenant whose head carries the minimum finish tag; ties go to the
    /// lowest tenant id. Virtual time advances here, never at pop.
    pub fn pick_user(&mut self, now: f64) -> Option<u32> {
        if self.active_flows == 0 {
            return None;
        }
        self.virtual_time = self.virtual_time.max(now);

        let mut best: Option<(usize, f64)> = None;
        for (uid, queue) in self.queues.iter().enumerate() {
            if let Some(head) = queue.front() {
                if best.is_none_or(|(_, tag)| head.finish_tag < tag) {
                    best = Some((uid, head.finish_tag));
                }
            }
        }
        best.map(|(uid, _)| uid as u32)
    }

    /// Dequeue the head; decrements the active-flow count on a pop-to-empty
    /// transition.
    pub fn pop(&mut self, uid: u32) -> Option<Request> {
        let queue = self.queues.get_mut(uid as usize)?;
        let tagged = queue.pop_front()?;
        if queue.is_empty() {
            self.active_flows -= 1;
        }
        Some(tagged.request)
    }

    pub fn empty(&self) -> bool {
        self.queues.iter().all(|q| q.is_empty())
    }
}
