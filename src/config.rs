//! Configuration types.

use std::time::Duration;

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name for identification.
    pub name: String,
    /// HTTP bind address.
    pub bind_addr: String,
    /// Path to the libSQL database file.
    pub db_path: String,
    /// Search orchestration settings.
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "flight-assist".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            db_path: "./data/flight-assist.db".to_string(),
            search: SearchConfig::default(),
        }
    }
}

/// Search orchestrator configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Wall-clock budget for a whole search task. A task that exceeds this is
    /// marked failed; partial results are discarded.
    pub task_budget: Duration,
    /// Timeout for a single provider query.
    pub provider_timeout: Duration,
    /// How long a finished (or abandoned) task stays readable before the
    /// sweep garbage-collects it.
    pub task_ttl: Duration,
    /// Sweep interval for expired tasks.
    pub sweep_interval: Duration,
    /// Maximum number of routing strategies generated per request.
    pub max_strategies: usize,
    /// Maximum offers kept per result group.
    pub max_offers_per_group: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            task_budget: Duration::from_secs(45),
            provider_timeout: Duration::from_secs(30),
            task_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            max_strategies: 8,
            max_offers_per_group: 5,
        }
    }
}
