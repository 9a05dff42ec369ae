#![forbid(unsafe_code)]

use std::time::Duration;

pub const LOCK_TIMEOUT_ENV: &str = "NESTKV_LOCK_TIMEOUT_MS";
pub const CREATE_IF_MISSING_ENV: &str = "NESTKV_CREATE_IF_MISSING";

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    /// Upper bound on waiting for the file lock, at open and per transaction.
    pub lock_timeout: Duration,
    pub create_if_missing: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            create_if_missing: true,
        }
    }
}

impl StoreOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(raw) = lookup(LOCK_TIMEOUT_ENV)
            && let Ok(ms) = raw.trim().parse::<u64>()
        {
            options.lock_timeout = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup(CREATE_IF_MISSING_ENV)
            && let Some(flag) = parse_flag(&raw)
        {
            options.create_if_missing = flag;
        }
        options
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
