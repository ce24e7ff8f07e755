//! Discrete-event simulation driver.
//!
//! Each iteration performs, strictly in order: admit every trace arrival with
//! timestamp <= now, dispatch while a channel is free and the scheduler
//! yields a tenant, then advance the clock to the earlier of the next
//! completion or the next arrival. Admitting before dispatch makes a request
//! arriving at the instant a channel frees up visible to the scheduler in the
//! same iteration; processing completions after dispatch keeps the driver
//! from idling while dispatchable work remains at the current time.

use crate::channel::{Device, DeviceError};
use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::events::{CompletionEvent, EventQueue};
use crate::metrics::Metrics;
use crate::trace;
use flashsim_schedulers::{Request, Scheduler};

/// The simulation driver: couples trace arrivals, the scheduling policy, the
/// channel model, and the completion event queue.
#[derive(Debug)]
pub struct SimulationEngine {
    clock: SimClock,
    trace: Vec<Request>,
    cursor: usize,
    scheduler: Scheduler,
    device: Device,
    events: EventQueue,
    /// Per-tenant statistics, fed by completion events.
    pub metrics: Metrics,
    num_users: usize,
}

impl SimulationEngine {
    /// Build an engine from a validated config, a policy, and a trace sorted
    /// by `(arrival_ts, user_id)`. The tenant count comes from the config
    /// when positive, otherwise it is inferred from the trace.
    pub fn new(config: &SimConfig, mut scheduler: Scheduler, trace: Vec<Request>) -> Self {
        debug_assert!(
            config.device.channels > 0,
            "SimConfig::validate enforces channels >= 1"
        );
        debug_assert!(
            trace.windows(2).all(|w| w[0].arrival_ts <= w[1].arrival_ts),
            "trace must be sorted by arrival time"
        );

        let num_users = if config.simulation.users > 0 {
            config.simulation.users as usize
        } else {
            trace::infer_user_count(&trace)
        };

        scheduler.set_users(num_users);
        scheduler.set_quantum(config.scheduler.quantum);
        if !config.scheduler.weights.is_empty() {
            scheduler.set_weights(&config.scheduler.weights);
        }

        Self {
            clock: SimClock::new(),
            trace,
            cursor: 0,
            scheduler,
            device: Device::new(
                config.device.channels as usize,
                config.device.read_bw_mbps,
                config.device.write_bw_mbps,
            ),
            events: EventQueue::new(),
            metrics: Metrics::new(num_users),
            num_users,
        }
    }

    /// Run the simulation until the trace is exhausted, every queue has
    /// drained, and no completion is pending.
    pub fn run(&mut self) -> Result<(), DeviceError> {
        while self.cursor < self.trace.len() || !self.scheduler.empty() || !self.events.is_empty()
        {
            let now = self.clock.now();

            // 1. Admit arrivals due at or before the current time.
            while self.cursor < self.trace.len() && self.trace[self.cursor].arrival_ts <= now {
                self.scheduler.enqueue(self.trace[self.cursor].clone());
                self.cursor += 1;
            }

            // 2. Dispatch while a channel is free and the scheduler yields
            // work. Each dispatch schedules the matching completion event.
            while let Some(chan) = self.device.first_free_channel(now) {
                let Some(uid) = self.scheduler.pick_user(now) else {
                    break;
                };
                let Some(mut request) = self.scheduler.pop(uid) else {
                    break;
                };
                request.start_ts = now;
                request.finish_ts = self.device.dispatch(chan, &request, now)?;
                self.events.push(CompletionEvent {
                    time: request.finish_ts,
                    channel: chan,
                    request,
                });
            }

            // 3. Advance to the next completion, else fast-forward to the
            // next arrival. With neither pending but queues still holding
            // work (DRR short on credit after the final completion), loop
            // again at the current time: every scan accrues more credit, so
            // the queues provably drain.
            if let Some(event) = self.events.pop() {
                self.clock.advance_to(event.time);
                self.metrics.on_finish(&event.request);
            } else if self.cursor < self.trace.len() {
                self.clock.advance_to(self.trace[self.cursor].arrival_ts);
            }
        }
        Ok(())
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Number of completion events still pending.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Tenant count this run was configured with.
    pub fn num_users(&self) -> usize {
        self.num_users
    }
}
