//! Request model shared by the scheduling policies and the simulator core.
//!
//! A [`Request`] is the atomic unit of work: one tenant read or write of a
//! fixed byte size, stamped with its arrival time. The runtime `start_ts` /
//! `finish_ts` fields are written exactly once when the driver dispatches the
//! request onto a channel.

use serde::{Deserialize, Serialize};

/// Kind of I/O operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Read,
    Write,
}

impl OpKind {
    /// Lowercase name as it appears in trace files.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Read => "read",
            OpKind::Write => "write",
        }
    }
}

/// A single tenant I/O request flowing through the simulated device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Dense tenant identifier.
    pub user_id: u32,
    /// Operation kind.
    pub op: OpKind,
    /// Arrival time in simulation seconds.
    pub arrival_ts: f64,
    /// Request size in bytes.
    pub size_bytes: u32,
    /// Dispatch time, populated when the request reaches a channel.
    #[serde(default)]
    pub start_ts: f64,
    /// Completion time, populated together with `start_ts` at dispatch.
    #[serde(default)]
    pub finish_ts: f64,
}

impl Request {
    /// Create a request that has arrived but not yet been dispatched.
    pub fn new(user_id: u32, op: OpKind, arrival_ts: f64, size_bytes: u32) -> Self {
        Self {
            user_id,
            op,
            arrival_ts,
            size_bytes,
            start_ts: 0.0,
            finish_ts: 0.0,
        }
    }

    /// End-to-end latency in seconds; negative values clamp to zero.
    pub fn latency_s(&self) -> f64 {
        (self.finish_ts - self.arrival_ts).max(0.0)
    }
}
