#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Anything a worker can drive: hosts, routers and the link layer.
pub trait Node: Send {
    /// Thread name and log prefix
    fn label(&self) -> String;
    /// Runs one non-blocking polling round. Returns how many packets were handled, 0 means idle.
    fn poll_round(&mut self) -> usize;
}

/// Per-router knobs
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct RouterConfig {
    /// Capacity of every interface queue, 0 for unbounded.
    pub queue_capacity: usize,
    /// Wait for room when enqueuing advertisements instead of dropping them.
    pub blocking_adverts: bool,
    /// Optional extension, off by default: leave routes out of the advertisement sent on the
    /// interface they were learned through. Without it changed routes are echoed back to
    /// their source, which allows transient loops and count-to-infinity.
    pub split_horizon: bool,
}

impl RouterConfig {
    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            ..Default::default()
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 0,
            blocking_adverts: false,
            split_horizon: false,
        }
    }
}
