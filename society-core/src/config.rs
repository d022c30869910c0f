//! # Console configuration
//!
//! A minimal, framework-agnostic configuration store based on string
//! keys and values. Crates read it through an immutable snapshot and
//! parse the values they care about.
//!
//! ```rust
//! use society_core::ConsoleConfig;
//! let mut config = ConsoleConfig::new();
//!
//! config.set("tenancy.retry_delay_ms", "250");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get_u64("tenancy.retry_delay_ms"), Some(250));
//! ```
//!
//! ## Environment overrides
//! `load_env` copies every variable carrying the given prefix, lowercased,
//! with `__` turned into `.`:
//!
//! ```bash
//! export SOCIETY__TENANCY__RETRY_DELAY_MS=500   # tenancy.retry_delay_ms
//! ```

use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ConsoleConfig {
    values: HashMap<String, String>,
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Load overrides from the process environment.
    pub fn load_env(&mut self, prefix: &str) -> usize {
        self.load_vars(prefix, std::env::vars())
    }

    /// Same as [`load_env`](Self::load_env) over an explicit variable list.
    pub fn load_vars<I>(&mut self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut loaded = 0;
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped
                    .trim_start_matches('_')
                    .to_lowercase()
                    .replace("__", ".");
                if normalized.is_empty() {
                    continue;
                }
                self.set(normalized, value);
                loaded += 1;
            }
        }
        loaded
    }

    pub fn snapshot(&self) -> ConsoleConfigSnapshot {
        ConsoleConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsoleConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConsoleConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.trim().parse::<u32>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse::<bool>().ok())
    }

    /// Reads an integer number of milliseconds.
    pub fn get_duration_ms(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_are_normalized() {
        let mut config = ConsoleConfig::new();
        let loaded = config.load_vars(
            "SOCIETY",
            vec![
                ("SOCIETY__TENANCY__RETRY_DELAY_MS".to_string(), "750".to_string()),
                ("OTHER__KEY".to_string(), "x".to_string()),
            ],
        );

        assert_eq!(loaded, 1);
        assert_eq!(config.get("tenancy.retry_delay_ms"), Some("750"));
        assert!(!config.has("other.key"));
    }

    #[test]
    fn snapshot_parses_typed_values() {
        let mut config = ConsoleConfig::new();
        config.set("a", "12");
        config.set("b", "true");
        config.set("c", "nope");

        let snap = config.snapshot();
        config.set("a", "99");

        assert_eq!(snap.get_u64("a"), Some(12));
        assert_eq!(snap.get_duration_ms("a"), Some(Duration::from_millis(12)));
        assert_eq!(snap.get_bool("b"), Some(true));
        assert_eq!(snap.get_u32("c"), None);
    }
}
