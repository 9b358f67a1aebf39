// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File logging. The terminal belongs to the TUI, so events go to
//! `<data dir>/arya/arya.log`.

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::APP_NAME;

pub const LOG_ENV: &str = "ARYA_LOG";
pub const LOG_FILE: &str = "arya.log";
const DEFAULT_FILTER: &str = "arya=info";

pub fn log_path() -> Result<PathBuf> {
    let data_root = dirs::data_dir()
        .ok_or_else(|| anyhow!("cannot resolve data directory for {LOG_FILE}"))?;
    Ok(data_root.join(APP_NAME).join(LOG_FILE))
}

/// `RUST_LOG` wins over `ARYA_LOG`; blank values fall through.
fn filter_directives(rust_log: Option<String>, arya_log: Option<String>) -> String {
    rust_log
        .into_iter()
        .chain(arya_log)
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_owned())
}

pub fn initialize_logging(path: &Path) -> Result<()> {
    if let Some(directory) = path.parent() {
        fs::create_dir_all(directory)
            .with_context(|| format!("create log directory {}", directory.display()))?;
    }
    let log_file =
        File::create(path).with_context(|| format!("create log file {}", path.display()))?;

    let directives = filter_directives(env::var("RUST_LOG").ok(), env::var(LOG_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter {directives:?} in RUST_LOG/{LOG_ENV}"))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(log_file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(filter);
    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("install log subscriber")?;
    Ok(())
}
