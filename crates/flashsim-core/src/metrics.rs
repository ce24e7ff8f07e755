//! Per-tenant statistics and fairness computation.
//!
//! The driver hands every completed request to [`Metrics::on_finish`];
//! aggregation is order-insensitive. The fairness index is Jain's metric over
//! participating tenants only, so a configured-but-idle queue does not drag
//! the score toward zero.

use flashsim_schedulers::Request;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
struct UserStats {
    completed: u64,
    total_latency: f64,
    bytes: u64,
}

/// Collects per-tenant throughput and latency statistics.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    stats: Vec<UserStats>,
}

impl Metrics {
    pub fn new(num_users: usize) -> Self {
        Self {
            stats: vec![UserStats::default(); num_users],
        }
    }

    pub fn reset(&mut self, num_users: usize) {
        self.stats = vec![UserStats::default(); num_users];
    }

    /// Ingest a completed request. A tenant beyond the configured count grows
    /// the table on demand.
    pub fn on_finish(&mut self, request: &Request) {
        let uid = request.user_id as usize;
        if uid >= self.stats.len() {
            self.stats.resize(uid + 1, UserStats::default());
        }
        let stats = &mut self.stats[uid];
        stats.completed += 1;
        stats.total_latency += request.latency_s();
        stats.bytes += u64::from(request.size_bytes);
    }

    /// Mean latency in seconds for `user_id`; 0.0 with no completions.
    pub fn avg_latency(&self, user_id: usize) -> f64 {
        match self.stats.get(user_id) {
            Some(s) if s.completed > 0 => s.total_latency / s.completed as f64,
            _ => 0.0,
        }
    }

    /// Bytes served for `user_id`.
    pub fn total_bytes(&self, user_id: usize) -> u64 {
        self.stats.get(user_id).map_or(0, |s| s.bytes)
    }

    /// Completed request count for `user_id`.
    pub fn completed(&self, user_id: usize) -> u64 {
        self.stats.get(user_id).map_or(0, |s| s.completed)
    }

    pub fn num_users(&self) -> usize {
        self.stats.len()
    }

    /// Jain's fairness index `(Σx)² / (k·Σx²)` over served bytes of the `k`
    /// tenants with `bytes > 0`; 0.0 when no tenant participated.
    pub fn fairness_index(&self) -> f64 {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut participants = 0usize;
        for s in &self.stats {
            if s.bytes == 0 {
                continue;
            }
            participants += 1;
            let x = s.bytes as f64;
            sum += x;
            sum_sq += x * x;
        }
        if participants == 0 || sum_sq == 0.0 {
            return 0.0;
        }
        (sum * sum) / (participants as f64 * sum_sq)
    }

    /// Write the per-tenant summary CSV
    /// (`user_id,completed,avg_latency_s,total_bytes`), creating parent
    /// directories as needed.
    pub fn save_csv(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut out = String::from("user_id,completed,avg_latency_s,total_bytes\n");
        for (uid, s) in self.stats.iter().enumerate() {
            out.push_str(&format!(
                "{},{},{},{}\n",
                uid,
                s.completed,
                self.avg_latency(uid),
                s.bytes,
            ));
        }
        std::fs::write(path, out)
    }

    /// Build a serializable report of this run.
    pub fn report(&self, policy: &str) -> SimReport {
        SimReport {
            policy: policy.to_string(),
            fairness_index: self.fairness_index(),
            users: (0..self.stats.len())
                .map(|uid| UserSummary {
                    user_id: uid as u32,
                    completed: self.completed(uid),
                    avg_latency_s: self.avg_latency(uid),
                    total_bytes: self.total_bytes(uid),
                })
                .collect(),
        }
    }
}

/// Per-tenant summary row of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: u32,
    pub completed: u64,
    pub avg_latency_s: f64,
    pub total_bytes: u64,
}

/// Machine-readable result of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub policy: String,
    pub fairness_index: f64,
    pub users: Vec<UserSummary>,
}

/// Format a run report as a table for stdout.
pub fn format_table(report: &SimReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{:=<60}\n",
        format!("  {} results  ", report.policy)
    ));
    out.push_str(&format!(
        "  {:>7} {:>10} {:>15} {:>13}\n",
        "user_id", "completed", "avg_latency_s", "total_bytes"
    ));
    out.push_str(&format!("{:-<60}\n", ""));
    for user in &report.users {
        out.push_str(&format!(
            "  {:>7} {:>10} {:>15.6} {:>13}\n",
            user.user_id, user.completed, user.avg_latency_s, user.total_bytes
        ));
    }
    out.push_str(&format!("{:-<60}\n", ""));
    out.push_str(&format!(
        "  Fairness index: {:.4}\n",
        report.fairness_index
    ));
    out.push_str(&format!("{:=<60}\n", ""));
    out
}

/// Format a comparison table of several runs over the same trace.
pub fn format_comparison_table(reports: &[SimReport]) -> String {
    if reports.is_empty() {
        return String::from("No results to compare.\n");
    }

    let mut out = String::new();
    out.push_str(&format!("\n{:=<68}\n", "  Policy Comparison  "));
    out.push_str(&format!(
        "{:<8} {:>10} {:>14} {:>18} {:>10}\n",
        "Policy", "Completed", "Total bytes", "Mean latency (s)", "Jain's"
    ));
    out.push_str(&format!("{:-<68}\n", ""));

    for report in reports {
        let completed: u64 = report.users.iter().map(|u| u.completed).sum();
        let bytes: u64 = report.users.iter().map(|u| u.total_bytes).sum();
        let mean_latency = if completed > 0 {
            report
                .users
                .iter()
                .map(|u| u.avg_latency_s * u.completed as f64)
                .sum::<f64>()
                / completed as f64
        } else {
            0.0
        };
        out.push_str(&format!(
            "{:<8} {:>10} {:>14} {:>18.6} {:>10.4}\n",
            report.policy, completed, bytes, mean_latency, report.fairness_index
        ));
    }
    out.push_str(&format!("{:=<68}\n", ""));
    out
}
