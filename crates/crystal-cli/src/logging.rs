// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt};

/// The console owns the terminal, so log lines go to a file. `RUST_LOG`
/// takes precedence over the configured level.
pub fn init(level: &str, path: &Path) -> Result<()> {
    let filter = env_filter(level)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {}; set [log].file to a writable path",
                path.display()
            )
        })?;

    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).with_context(|| {
        format!("invalid log.level {level:?}; use e.g. \"info\" or \"crystal_api=debug\"")
    })
}

#[cfg(test)]
mod tests {
    use super::env_filter;

    #[test]
    fn accepts_level_and_target_directives() {
        assert!(env_filter("info").is_ok());
        assert!(env_filter("warn,crystal_api=debug").is_ok());
    }

    #[test]
    fn rejects_malformed_directive() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let error = env_filter("crystal_api=loud").expect_err("bad level should fail");
        assert!(error.to_string().contains("invalid log.level"));
    }
}
