//! Process configuration, read from the environment at startup.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{Error, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STREAM_INTERVAL_MS: u64 = 1_000;
const STREAM_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=60_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `METRICS_STREAM_INTERVAL_MS`, tick of the SSE snapshot feed.
    pub stream_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            stream_interval: Duration::from_millis(DEFAULT_STREAM_INTERVAL_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|_| Error::Config(format!("BIND_ADDR must be host:port, got {bind_addr:?}")))?;

        let stream_interval_ms = match lookup("METRICS_STREAM_INTERVAL_MS") {
            None => DEFAULT_STREAM_INTERVAL_MS,
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("METRICS_STREAM_INTERVAL_MS must be an integer, got {raw:?}"))
            })?,
        };
        if !STREAM_INTERVAL_RANGE_MS.contains(&stream_interval_ms) {
            return Err(Error::Config(
                "METRICS_STREAM_INTERVAL_MS must be between 100 and 60000".into(),
            ));
        }

        Ok(Self {
            bind_addr,
            stream_interval: Duration::from_millis(stream_interval_ms),
        })
    }
}
