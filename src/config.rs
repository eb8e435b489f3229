//! Cache Configuration

use std::time::Duration;

use tokio::runtime::Handle;

/// Cache configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// TTL applied when `set` is called with the default sentinel (zero = never expire)
    pub default_ttl: Duration,

    /// Interval between background sweeps (zero = no reaper)
    pub sweep_interval: Duration,

    /// Run the reaper as a task on this runtime instead of a dedicated thread
    pub runtime: Option<Handle>,
}

impl Config {
    /// Create a config with the given default TTL and sweep interval
    pub fn new(default_ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            default_ttl,
            sweep_interval,
            runtime: None,
        }
    }

    /// Set default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Drive the reaper from a tokio runtime. The runtime needs its time
    /// driver (`enable_time`); cache construction panics otherwise.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Whether a reaper will be started for this config
    pub fn reaper_enabled(&self) -> bool {
        !self.sweep_interval.is_zero()
    }
}
