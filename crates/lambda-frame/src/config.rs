//! Framework configuration snapshot.
//!
//! The pipeline never reads the process environment directly. Callers hand it
//! a [`FrameworkConfig`] built from an explicit string map; only
//! [`FrameworkConfig::from_process_env`] touches the real environment, and it
//! should be called once at the outermost composition point (the Lambda
//! `main`). Tests construct snapshots from plain maps.

use std::collections::BTreeMap;

/// Environment variable enabling verbose (live) framework logging.
pub const VERBOSE_LOGS_VAR: &str = "FRAMEWORK_LOGS";

/// Default bounded capacity of the per-invocation log store.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// Immutable configuration for one pipeline instance.
#[derive(Debug, Clone)]
pub struct FrameworkConfig {
    env: BTreeMap<String, String>,
    verbose_logs: bool,
    log_capacity: Option<usize>,
}

impl FrameworkConfig {
    /// Build a configuration from an explicit environment snapshot.
    ///
    /// The verbose-logging flag is derived from the snapshot itself
    /// (`FRAMEWORK_LOGS == "true"`), so overriding the environment for a test
    /// also controls log buffering.
    pub fn new(env: BTreeMap<String, String>) -> Self {
        let verbose_logs = env.get(VERBOSE_LOGS_VAR).map(String::as_str) == Some("true");
        Self {
            env,
            verbose_logs,
            log_capacity: Some(DEFAULT_LOG_CAPACITY),
        }
    }

    /// Snapshot the real process environment.
    pub fn from_process_env() -> Self {
        Self::new(std::env::vars().collect())
    }

    /// Override the verbose-logging flag.
    #[must_use]
    pub fn with_verbose_logs(mut self, verbose: bool) -> Self {
        self.verbose_logs = verbose;
        self
    }

    /// Override the log store capacity; `None` means unbounded.
    #[must_use]
    pub fn with_log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// The environment snapshot declared env schemas decode against.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Whether log entries are emitted live instead of buffered.
    pub fn verbose_logs(&self) -> bool {
        self.verbose_logs
    }

    /// Log store capacity for each invocation.
    pub fn log_capacity(&self) -> Option<usize> {
        self.log_capacity
    }
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_derived_from_snapshot() {
        let mut env = BTreeMap::new();
        env.insert(VERBOSE_LOGS_VAR.to_string(), "true".to_string());
        assert!(FrameworkConfig::new(env).verbose_logs());

        let mut env = BTreeMap::new();
        env.insert(VERBOSE_LOGS_VAR.to_string(), "false".to_string());
        assert!(!FrameworkConfig::new(env).verbose_logs());

        assert!(!FrameworkConfig::default().verbose_logs());
    }

    #[test]
    fn capacity_defaults_to_500() {
        assert_eq!(
            FrameworkConfig::default().log_capacity(),
            Some(DEFAULT_LOG_CAPACITY)
        );
        let config = FrameworkConfig::default().with_log_capacity(None);
        assert_eq!(config.log_capacity(), None);
    }
}
