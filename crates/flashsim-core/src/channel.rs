//! Multi-channel device service model.
//!
//! Each channel is an independent, non-preemptive service station modeled by
//! a single monotonic `free_at` timestamp. That captures per-channel
//! serialization without any queueing inside the channel itself; queueing is
//! the scheduler's responsibility.

use flashsim_schedulers::{OpKind, Request};
use thiserror::Error;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("channel index {index} out of range for a {channels}-channel device")]
    ChannelOutOfRange { index: usize, channels: usize },
}

/// Per-channel record: the absolute time at which the channel frees up.
/// Monotonically non-decreasing; the channel is free at `now` iff
/// `free_at <= now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelState {
    pub free_at: f64,
}

/// A multi-channel flash device with per-channel service times.
///
/// Service time is `bytes / ((aggregate_bw / num_channels) * 2^20)` seconds,
/// with separate read and write aggregate bandwidths.
#[derive(Debug)]
pub struct Device {
    read_bw_mbps: f64,
    write_bw_mbps: f64,
    channels: Vec<ChannelState>,
}

impl Device {
    pub fn new(num_channels: usize, read_bw_mbps: f64, write_bw_mbps: f64) -> Self {
        Self {
            read_bw_mbps,
            write_bw_mbps,
            channels: vec![ChannelState::default(); num_channels],
        }
    }

    /// Dispatch `request` onto `channel_idx` at `now`; returns the completion
    /// time. An out-of-range index is a driver bug, not a workload condition,
    /// and surfaces as a fatal error.
    pub fn dispatch(
        &mut self,
        channel_idx: usize,
        request: &Request,
        now: f64,
    ) -> Result<f64, DeviceError> {
        if channel_idx >= self.channels.len() {
            return Err(DeviceError::ChannelOutOfRange {
                index: channel_idx,
                channels: self.channels.len(),
            });
        }

        let service = match request.op {
            OpKind::Read => self.read_service_time_s(request.size_bytes),
            OpKind::Write => self.write_service_time_s(request.size_bytes),
        };

        let channel = &mut self.channels[channel_idx];
        let start = now.max(channel.free_at);
        channel.free_at = start + service;
        Ok(channel.free_at)
    }

    /// Lowest-indexed channel idle at `now`, if any. The lowest-index
    /// tie-break keeps replays deterministic; channel counts are small enough
    /// that a linear scan suffices.
    pub fn first_free_channel(&self, now: f64) -> Option<usize> {
        self.channels.iter().position(|ch| ch.free_at <= now)
    }

    /// Service time in seconds for a read of `bytes`.
    pub fn read_service_time_s(&self, bytes: u32) -> f64 {
        service_time_s(bytes, self.read_bw_mbps, self.channels.len())
    }

    /// Service time in seconds for a write of `bytes`.
    pub fn write_service_time_s(&self, bytes: u32) -> f64 {
        service_time_s(bytes, self.write_bw_mbps, self.channels.len())
    }

    /// Whether channel `idx` is available at `now`.
    pub fn is_free(&self, idx: usize, now: f64) -> bool {
        self.channels.get(idx).is_some_and(|ch| ch.free_at <= now)
    }

    /// When channel `idx` next becomes idle; 0.0 for an unknown index.
    pub fn free_at(&self, idx: usize) -> f64 {
        self.channels.get(idx).map_or(0.0, |ch| ch.free_at)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
}

fn service_time_s(bytes: u32, bw_mbps: f64, num_channels: usize) -> f64 {
    if num_channels == 0 {
        return 0.0;
    }
    let rate = (bw_mbps / num_channels as f64) * BYTES_PER_MB;
    if rate <= 0.0 {
        return 0.0;
    }
    f64::from(bytes) / rate
}
