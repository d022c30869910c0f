use std::time::Duration;

use society_core::ConsoleConfigSnapshot;

/// Fixed storage key for the persisted tenant selection.
pub const SELECTION_KEY: &str = "selectedSocietyId";

/// Configuration for the tenant resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Automatic retries after a failed directory load before the
    /// error is surfaced
    pub auto_retry_limit: u32,
    /// Delay before an automatic directory retry
    pub retry_delay: Duration,
    /// Upper bound for the switch step's side effects to settle
    pub switch_timeout: Duration,
    /// Key the persisted selection is stored under
    pub selection_key: String,
    /// Capacity of the resolution event channel
    pub event_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            auto_retry_limit: 1,
            retry_delay: Duration::from_millis(500),
            switch_timeout: Duration::from_secs(2),
            selection_key: SELECTION_KEY.to_string(),
            event_capacity: 64,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from a console config snapshot.
    ///
    /// Recognized keys: `tenancy.auto_retry_limit`, `tenancy.retry_delay_ms`,
    /// `tenancy.switch_timeout_ms`, `tenancy.selection_key`,
    /// `tenancy.event_capacity`. Unparseable values keep the default.
    pub fn from_snapshot(snapshot: &ConsoleConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            auto_retry_limit: snapshot
                .get_u32("tenancy.auto_retry_limit")
                .unwrap_or(defaults.auto_retry_limit),
            retry_delay: snapshot
                .get_duration_ms("tenancy.retry_delay_ms")
                .unwrap_or(defaults.retry_delay),
            switch_timeout: snapshot
                .get_duration_ms("tenancy.switch_timeout_ms")
                .unwrap_or(defaults.switch_timeout),
            selection_key: snapshot
                .get_string("tenancy.selection_key")
                .filter(|k| !k.trim().is_empty())
                .unwrap_or(defaults.selection_key),
            event_capacity: snapshot
                .get_u64("tenancy.event_capacity")
                .map(|c| c.max(1) as usize)
                .unwrap_or(defaults.event_capacity),
        }
    }

    pub fn with_auto_retry_limit(mut self, limit: u32) -> Self {
        self.auto_retry_limit = limit;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_switch_timeout(mut self, timeout: Duration) -> Self {
        self.switch_timeout = timeout;
        self
    }

    pub fn with_selection_key<S: Into<String>>(mut self, key: S) -> Self {
        self.selection_key = key.into();
        self
    }
}
