//! # Runtime Configuration Module
//!
//! Environment-driven knobs for the coroutine runtime.
//!
//! ## Environment Variables
//!
//! ### `DOGS_STACK_SIZE`
//!
//! Stack size for handler coroutines. Accepts decimal (`65536`) or
//! hexadecimal (`0x10000`). Unparseable values fall back to the default.
//!
//! Default: `0x10000` (64 KB)
//!
//! Memory use is roughly `stack_size × handler coroutines`; with one coroutine
//! per route the total stays small, so the default favours headroom for the
//! JSON and SQLite call chains over footprint.
//!
//! ## Usage
//!
//! ```rust
//! use dogs_api::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

pub const STACK_SIZE_ENV: &str = "DOGS_STACK_SIZE";
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes.
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_size = lookup(STACK_SIZE_ENV)
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
    .filter(|size| *size > 0)
}
