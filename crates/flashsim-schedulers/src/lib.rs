//! Admission scheduling policies for multi-tenant device simulation.
//!
//! Each policy keeps one FIFO per tenant and exposes the same operation set:
//! admit a request, pick the tenant to dispatch next, and pop that tenant's
//! head request. The simulator core drives the policy whenever a device
//! channel frees up.
//!
//! | Policy | Name | Strategy |
//! |--------|------|----------|
//! | [`RoundRobin`] | `rr` | Rotating cursor over tenants; sizes ignored |
//! | [`DeficitRoundRobin`] | `drr` | Byte credit per scan; weighted byte fairness |
//! | [`WeightedFair`] | `qfq` | Virtual-time finish tags; GPS-approximating order |
//! | [`StartGap`] | `sgfs` | Rotation wrapper over a base policy (WFQ by default) |

pub mod deficit_round_robin;
pub mod request;
pub mod round_robin;
pub mod start_gap;
pub mod weighted_fair;

pub use deficit_round_robin::DeficitRoundRobin;
pub use request::{OpKind, Request};
pub use round_robin::RoundRobin;
pub use start_gap::StartGap;
pub use weighted_fair::WeightedFair;

/// The scheduler family as one dispatchable sum type.
///
/// [`StartGap`] recursively owns a boxed base variant, so policy composition
/// nests without per-call virtual dispatch and every operation stays an
/// exhaustiveness-checked match.
///
/// Operations never fail: requests naming an out-of-range tenant are silently
/// dropped and `pop` on an empty queue yields `None`. The driver's invariant
/// that `pop(u)` immediately follows a `pick_user` returning `u` makes the
/// silent drop indistinguishable from an error in correct use.
#[derive(Debug)]
pub enum Scheduler {
    RoundRobin(RoundRobin),
    DeficitRoundRobin(DeficitRoundRobin),
    WeightedFair(WeightedFair),
    StartGap(StartGap),
}

impl Scheduler {
    /// Resize and reset per-tenant state for `n` tenants.
    pub fn set_users(&mut self, n: usize) {
        match self {
            Scheduler::RoundRobin(s) => s.set_users(n),
            Scheduler::DeficitRoundRobin(s) => s.set_users(n),
            Scheduler::WeightedFair(s) => s.set_users(n),
            Scheduler::StartGap(s) => s.set_users(n),
        }
    }

    /// Update per-tenant weights; tenants beyond the slice get the default
    /// 1.0. Round robin has no notion of weight and ignores the call.
    pub fn set_weights(&mut self, weights: &[f64]) {
        match self {
            Scheduler::RoundRobin(_) => {}
            Scheduler::DeficitRoundRobin(s) => s.set_weights(weights),
            Scheduler::WeightedFair(s) => s.set_weights(weights),
            Scheduler::StartGap(s) => s.set_weights(weights),
        }
    }

    /// Set the DRR quantum in bytes; the other policies ignore it.
    pub fn set_quantum(&mut self, quantum: f64) {
        match self {
            Scheduler::RoundRobin(_) | Scheduler::WeightedFair(_) => {}
            Scheduler::DeficitRoundRobin(s) => s.set_quantum(quantum),
            Scheduler::StartGap(s) => s.set_quantum(quantum),
        }
    }

    /// Admit a request into its tenant's FIFO.
    pub fn enqueue(&mut self, request: Request) {
        match self {
            Scheduler::RoundRobin(s) => s.enqueue(request),
            Scheduler::DeficitRoundRobin(s) => s.enqueue(request),
            Scheduler::WeightedFair(s) => s.enqueue(request),
            Scheduler::StartGap(s) => s.enqueue(request),
        }
    }

    /// Select the tenant to dispatch next without removing its request.
    /// `Some(u)` obligates the scheduler to answer the next `pop(u)` with the
    /// head of the corresponding queue.
    pub fn pick_user(&mut self, now: f64) -> Option<u32> {
        match self {
            Scheduler::RoundRobin(s) => s.pick_user(now),
            Scheduler::DeficitRoundRobin(s) => s.pick_user(now),
            Scheduler::WeightedFair(s) => s.pick_user(now),
            Scheduler::StartGap(s) => s.pick_user(now),
        }
    }

    /// Remove and return the head request for tenant `uid` (under any
    /// internal remapping). Valid only immediately after a successful
    /// `pick_user` returning `uid`.
    pub fn pop(&mut self, uid: u32) -> Option<Request> {
        match self {
            Scheduler::RoundRobin(s) => s.pop(uid),
            Scheduler::DeficitRoundRobin(s) => s.pop(uid),
            Scheduler::WeightedFair(s) => s.pop(uid),
            Scheduler::StartGap(s) => s.pop(uid),
        }
    }

    /// True iff every tenant queue is empty.
    pub fn empty(&self) -> bool {
        match self {
            Scheduler::RoundRobin(s) => s.empty(),
            Scheduler::DeficitRoundRobin(s) => s.empty(),
            Scheduler::WeightedFair(s) => s.empty(),
            Scheduler::StartGap(s) => s.empty(),
        }
    }
}

/// Create a scheduler from its CLI policy name.
///
/// `sgfs` composes the start-gap wrapper over weighted fair queueing with the
/// given rotation knobs; the other policies ignore them.
pub fn scheduler_by_name(name: &str, rotate_every: u32, gap: u32) -> Option<Scheduler> {
    match name {
        "rr" => Some(Scheduler::RoundRobin(RoundRobin::new())),
        "drr" => Some(Scheduler::DeficitRoundRobin(DeficitRoundRobin::new())),
        "qfq" => Some(Scheduler::WeightedFair(WeightedFair::new())),
        "sgfs" => {
            let mut sg = StartGap::new(Scheduler::WeightedFair(WeightedFair::new()));
            sg.set_rotation(rotate_every, gap);
            Some(Scheduler::StartGap(sg))
        }
        _ => None,
    }
}

/// List the recognized policy names.
pub fn available_policies() -> Vec<&'static str> {
    vec!["rr", "drr", "qfq", "sgfs"]
}
