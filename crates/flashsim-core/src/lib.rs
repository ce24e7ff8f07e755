//! flashsim — discrete-event simulator for multi-tenant SSD fairness
//! scheduling.
//!
//! Models a multi-channel flash device serving read/write requests from
//! competing tenants. Admission policies from `flashsim-schedulers` decide
//! which tenant dispatches next whenever a channel frees up; per-tenant
//! latency and throughput feed a Jain fairness index.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐     ┌───────────┐     ┌──────────────┐
//! │  Trace   │────▶│  Engine   │────▶│   Metrics    │
//! │ Ingestion│     │ (Events)  │     │  (Fairness)  │
//! └──────────┘     └─────┬─────┘     └──────────────┘
//!                        │
//!                ┌───────┴───────┐
//!                │   Scheduler   │
//!                │ rr/drr/qfq/   │
//!                │     sgfs      │
//!                └───────┬───────┘
//!                        │
//!          ┌─────────────┼─────────────┐
//!          ▼             ▼             ▼
//!    ┌──────────┐  ┌──────────┐  ┌──────────┐
//!    │ Channel 0│  │ Channel 1│  │ Channel N│
//!    │  free_at │  │  free_at │  │  free_at │
//!    └──────────┘  └──────────┘  └──────────┘
//! ```

pub mod channel;
pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod metrics;
pub mod trace;

// Re-export key types for convenience.
pub use channel::{ChannelState, Device, DeviceError};
pub use clock::SimClock;
pub use config::SimConfig;
pub use engine::SimulationEngine;
pub use events::{CompletionEvent, EventQueue};
pub use flashsim_schedulers::{scheduler_by_name, OpKind, Request, Scheduler};
pub use metrics::{Metrics, SimReport};
pub use trace::{load_trace_csv, parse_trace};

/// Run a complete simulation with the given config, scheduler, and trace.
pub fn run_simulation(
    config: &SimConfig,
    scheduler: Scheduler,
    trace: Vec<Request>,
) -> Result<Metrics, DeviceError> {
    let mut engine = SimulationEngine::new(config, scheduler, trace);
    engine.run()?;
    Ok(engine.metrics)
}

/// Run several policies over the same trace and collect their reports.
/// Unrecognized policy names are skipped.
pub fn compare_policies(
    config: &SimConfig,
    policy_names: &[&str],
    trace: &[Request],
) -> Result<Vec<SimReport>, DeviceError> {
    let mut reports = Vec::new();
    for name in policy_names {
        let Some(scheduler) = scheduler_by_name(
            name,
            config.scheduler.rotate_every,
            config.scheduler.gap,
        ) else {
            continue;
        };
        let metrics = run_simulation(config, scheduler, trace.to_vec())?;
        reports.push(metrics.report(name));
    }
    Ok(reports)
}
