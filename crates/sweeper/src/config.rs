use fichaje_core::delay::DelayThresholds;

/// Sweeper configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Minor/major lateness thresholds in minutes.
    pub thresholds: DelayThresholds,
    /// Page size for the shift scan.
    pub batch_size: i64,
    /// Interval between runs in `--watch` mode, in seconds.
    pub interval_secs: u64,
}

impl SweepConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `DELAY_MINOR_MINUTES` | `15`    |
    /// | `DELAY_MAJOR_MINUTES` | `60`    |
    /// | `SWEEP_BATCH_SIZE`    | `100`   |
    /// | `SWEEP_INTERVAL_SECS` | `3600`  |
    pub fn from_env() -> Self {
        let defaults = DelayThresholds::default();

        let minor_minutes: i64 = std::env::var("DELAY_MINOR_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.minor_minutes);

        let major_minutes: i64 = std::env::var("DELAY_MAJOR_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.major_minutes);

        let batch_size: i64 = std::env::var("SWEEP_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Self {
            thresholds: DelayThresholds {
                minor_minutes,
                major_minutes,
            },
            batch_size,
            interval_secs,
        }
    }
}
