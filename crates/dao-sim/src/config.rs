//! Runtime configuration from environment.

use std::env;
use std::time::Duration;

use dao_core::AirspaceRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tick_interval_ms: u64,
    pub seed: u64,
    pub max_alerts: usize,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            seed: 42,
            max_alerts: 10,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_interval_ms: env::var("DAO_TICK_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.tick_interval_ms),
            seed: env::var("DAO_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seed),
            max_alerts: env::var("DAO_MAX_ALERTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_alerts),
            log_format: match env::var("DAO_LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn rules(&self) -> AirspaceRules {
        AirspaceRules {
            max_alerts: self.max_alerts,
            ..AirspaceRules::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_carry_alert_limit() {
        let config = Config {
            max_alerts: 25,
            ..Config::default()
        };
        assert_eq!(config.rules().max_alerts, 25);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }
}
