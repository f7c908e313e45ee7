// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File logging for the terminal UI.
//!
//! The UI owns the terminal, so events go to a daily rolling file
//! (`<log dir>/tasklist.log.YYYY-MM-DD`) instead of stderr. `TASKLIST_LOG`
//! takes any `EnvFilter` directive and overrides `[log].level`, for example
//! `TASKLIST_LOG=tasklist_app=debug,warn`.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "TASKLIST_LOG";
const LOG_FILE_PREFIX: &str = "tasklist.log";

pub fn init(dir: &Path, configured_level: &str) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| {
        format!(
            "create log directory {}; set [log].dir to a writable path",
            dir.display()
        )
    })?;

    let filter = resolve_filter(std::env::var(LOG_ENV).ok().as_deref(), configured_level)?;
    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .map_err(|error| anyhow!("install tracing subscriber: {error}"))
}

fn resolve_filter(env_value: Option<&str>, configured_level: &str) -> Result<EnvFilter> {
    match env_value {
        Some(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} filter {directives:?}")),
        _ => EnvFilter::try_new(configured_level)
            .with_context(|| format!("invalid [log].level filter {configured_level:?}")),
    }
}
