use std::time::Duration;

use tracing::warn;

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REAP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = 100;
pub const DEFAULT_REAP_BATCH_SIZE: usize = 100;

/// Cadences and batch bounds for the periodic jobs, read from the
/// environment with defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub sweep_interval: Duration,
    pub reap_interval: Duration,
    pub sweep_batch_size: usize,
    pub reap_batch_size: usize,
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        SchedulerConfig {
            sweep_interval: Duration::from_secs(env_or(
                "SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )),
            reap_interval: Duration::from_secs(env_or(
                "REAP_INTERVAL_SECS",
                DEFAULT_REAP_INTERVAL_SECS,
            )),
            sweep_batch_size: env_or("SWEEP_BATCH_SIZE", DEFAULT_SWEEP_BATCH_SIZE),
            reap_batch_size: env_or("REAP_BATCH_SIZE", DEFAULT_REAP_BATCH_SIZE),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            reap_interval: Duration::from_secs(DEFAULT_REAP_INTERVAL_SECS),
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
            reap_batch_size: DEFAULT_REAP_BATCH_SIZE,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparseable {}={}", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_documented_cadences() {
        let config = SchedulerConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
        assert_eq!(config.reap_interval, Duration::from_secs(300));
        assert_eq!(config.sweep_batch_size, 100);
        assert_eq!(config.reap_batch_size, 100);
    }

    #[test]
    fn test_env_override_is_applied() {
        std::env::set_var("TEST_MATCHMAKER_INTERVAL", "45");
        assert_eq!(env_or("TEST_MATCHMAKER_INTERVAL", 30u64), 45);
        std::env::remove_var("TEST_MATCHMAKER_INTERVAL");
    }

    #[test]
    fn test_unparseable_env_falls_back_to_default() {
        std::env::set_var("TEST_MATCHMAKER_BAD", "soon");
        assert_eq!(env_or("TEST_MATCHMAKER_BAD", 30u64), 30);
        std::env::remove_var("TEST_MATCHMAKER_BAD");
    }

    #[test]
    fn test_missing_env_uses_default() {
        assert_eq!(env_or("TEST_MATCHMAKER_MISSING", 7usize), 7);
    }
}
