//! Pipeline configuration: defaults, overridden by environment variables.
//!
//! One [`PipelineConfig`] is built per invocation and handed to the pipeline,
//! which derives the HTTP client and retry policy from it.

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.natgasweather.com/modelData/images/2m";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Total attempts per image, first try included.
    pub max_attempts: u32,
    /// Multiplier for exponential backoff, in seconds.
    pub backoff_factor: f64,
    /// Concurrent fetch+classify units.
    pub workers: usize,
    /// Red/blue dominance margin on the 0–255 scale.
    pub dominance_threshold: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(15),
            max_attempts: 5,
            backoff_factor: 1.5,
            workers: 10,
            dominance_threshold: 20,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `NGW_*` process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `NGW_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("NGW_BASE_URL") {
            config.base_url = url;
        }
        if let Some(agent) = lookup("NGW_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "NGW_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "NGW_READ_TIMEOUT_SECS")? {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var(&lookup, "NGW_MAX_ATTEMPTS")? {
            config.max_attempts = n;
        }
        if let Some(f) = parse_var(&lookup, "NGW_BACKOFF_FACTOR")? {
            config.backoff_factor = f;
        }
        if let Some(n) = parse_var(&lookup, "NGW_WORKERS")? {
            config.workers = n;
        }
        if let Some(t) = parse_var(&lookup, "NGW_DOMINANCE_THRESHOLD")? {
            config.dominance_threshold = t;
        }

        Ok(config.normalized())
    }

    /// Clamps counts to at least one and rejects negative backoff.
    pub fn normalized(mut self) -> Self {
        self.max_attempts = self.max_attempts.max(1);
        self.workers = self.workers.max(1);
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            self.backoff_factor = 0.0;
        }
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: {raw:?}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.workers, 10);
        assert_eq!(config.dominance_threshold, 20);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, Duration::from_secs(15));
        assert_eq!(config.backoff_factor, 1.5);
    }

    #[test]
    fn test_env_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("NGW_WORKERS", "4"),
            ("NGW_BACKOFF_FACTOR", "0.5"),
            ("NGW_BASE_URL", "http://localhost:9000/img"),
        ]))
        .unwrap();

        assert_eq!(config.workers, 4);
        assert_eq!(config.backoff_factor, 0.5);
        assert_eq!(config.base_url, "http://localhost:9000/img");
    }

    #[test]
    fn test_invalid_value_names_the_variable() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("NGW_WORKERS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("NGW_WORKERS"));
    }

    #[test]
    fn test_zero_counts_are_clamped() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("NGW_WORKERS", "0"),
            ("NGW_MAX_ATTEMPTS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.workers, 1);
        assert_eq!(config.max_attempts, 1);
    }
}
