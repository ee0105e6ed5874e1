//! Controller configuration
//!
//! Defines the orchestration service location and every tunable of the
//! poll loop: cadence, optional ceiling and the retry budget for failed
//! status reads.

use std::time::Duration;

/// Execution controller configuration
///
/// All intervals are configurable to allow tuning for different
/// deployments (fast local services vs slow remote pipelines).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Orchestration service base URL (e.g., "http://localhost:8084")
    ///
    /// The controller receives its `OrchestratorApi` ready-made; this is the
    /// address the caller builds that client from, checked by `validate`.
    pub orchestrator_url: String,

    /// Delay before the first status read and between successive reads
    pub poll_interval: Duration,

    /// Give up on an execution that reports no terminal status for this long
    pub poll_timeout: Option<Duration>,

    /// Consecutive failed status reads tolerated before the run is failed
    pub max_poll_retries: u32,

    /// Delay before retrying the first failed status read
    pub retry_initial_delay: Duration,

    /// Upper bound for the doubling retry delay
    pub retry_max_delay: Duration,
}

impl ControllerConfig {
    /// Creates a new configuration with defaults
    pub fn new(orchestrator_url: String) -> Self {
        Self {
            orchestrator_url,
            poll_interval: Duration::from_secs(5),
            poll_timeout: None,
            max_poll_retries: 3,
            retry_initial_delay: Duration::from_secs(2),
            retry_max_delay: Duration::from_secs(30),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DECKHAND_ORCHESTRATOR_URL (required)
    /// - DECKHAND_POLL_INTERVAL_MS (optional, default: 5000)
    /// - DECKHAND_POLL_TIMEOUT_SECS (optional, unset or 0 disables the ceiling)
    /// - DECKHAND_POLL_RETRIES (optional, default: 3)
    pub fn from_env() -> anyhow::Result<Self> {
        let orchestrator_url = std::env::var("DECKHAND_ORCHESTRATOR_URL").map_err(|_| {
            anyhow::anyhow!("DECKHAND_ORCHESTRATOR_URL environment variable not set")
        })?;

        let mut config = Self::new(orchestrator_url);

        if let Some(ms) = env_parse::<u64>("DECKHAND_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(ms);
        }

        config.poll_timeout = env_parse::<u64>("DECKHAND_POLL_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        if let Some(retries) = env_parse::<u32>("DECKHAND_POLL_RETRIES") {
            config.max_poll_retries = retries;
        }

        Ok(config)
    }

    /// Sets the polling ceiling
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    /// Delay before the retry following `failures` consecutive failed reads
    pub fn retry_delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.retry_initial_delay
            .saturating_mul(1 << exponent)
            .min(self.retry_max_delay)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.orchestrator_url.is_empty() {
            anyhow::bail!("orchestrator_url cannot be empty");
        }

        if !self.orchestrator_url.starts_with("http://")
            && !self.orchestrator_url.starts_with("https://")
        {
            anyhow::bail!("orchestrator_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.poll_timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("poll_timeout must be greater than 0 when set");
        }

        if self.retry_initial_delay.is_zero() {
            anyhow::bail!("retry_initial_delay must be greater than 0");
        }

        if self.retry_max_delay < self.retry_initial_delay {
            anyhow::bail!("retry_max_delay must not be shorter than retry_initial_delay");
        }

        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new("http://localhost:8084".to_string())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}
