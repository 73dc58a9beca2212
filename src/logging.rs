// SPDX-License-Identifier: MIT
//
// Log setup.
//
// The display owns the terminal while the kiosk runs, so events go to an
// append-only file instead of stderr. `RUST_LOG` overrides the configured
// filter.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub fn init(config: &LogConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .with_context(|| format!("open log file {}", config.file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(config)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install log subscriber: {e}"))
}

fn filter(config: &LogConfig) -> Result<EnvFilter> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(env.as_deref(), config)
}

/// An unparsable environment filter falls back to the configured one.
fn filter_from(env: Option<&str>, config: &LogConfig) -> Result<EnvFilter> {
    if let Some(filter) = env.and_then(|env| EnvFilter::try_new(env).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid log filter {:?}", config.filter))
}
