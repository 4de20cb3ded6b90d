// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use crystal_app::{DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_CHOICES, SearchScope, ViewOptions};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "crystal-admin";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_API_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_PATH_ENV: &str = "CRYSTAL_ADMIN_CONFIG_PATH";
const TOKEN_ENV: &str = "CRYSTAL_ADMIN_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            table: Table::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_API_BASE_URL.to_owned()),
            token: None,
            timeout: Some(DEFAULT_API_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    pub rows_per_page: Option<usize>,
    pub search_scope: Option<String>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows_per_page: Some(DEFAULT_ROWS_PER_PAGE),
            search_scope: Some(SearchScope::AllFields.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [table], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().is_empty()
        {
            bail!(
                "api.base_url in {} must not be empty; remove it to use {DEFAULT_API_BASE_URL}",
                path.display()
            );
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(rows) = self.table.rows_per_page
            && !ROWS_PER_PAGE_CHOICES.contains(&rows)
        {
            bail!(
                "table.rows_per_page in {} must be one of {:?}, got {}",
                path.display(),
                ROWS_PER_PAGE_CHOICES,
                rows
            );
        }

        if let Some(scope) = &self.table.search_scope
            && SearchScope::parse(scope).is_none()
        {
            bail!(
                "table.search_scope in {} must be \"all_fields\" or \"searchable_columns\", got {:?}",
                path.display(),
                scope
            );
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!(
                "log.level in {} must not be empty; use a filter such as \"info\" or \"crystal_api=debug\"",
                path.display()
            );
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim()
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    /// The environment wins over the file so tokens can stay out of config.
    pub fn api_token(&self) -> Option<String> {
        env::var(TOKEN_ENV)
            .ok()
            .or_else(|| self.api.token.clone())
            .filter(|token| !token.trim().is_empty())
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            rows_per_page: self.table.rows_per_page.unwrap_or(DEFAULT_ROWS_PER_PAGE),
            search_scope: self
                .table
                .search_scope
                .as_deref()
                .and_then(SearchScope::parse)
                .unwrap_or_default(),
            ..ViewOptions::default()
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set log.file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# crystal-admin config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\n# Admin session token; CRYSTAL_ADMIN_TOKEN overrides it.\n# token = \"...\"\ntimeout = \"{}\"\n\n[table]\n# One of {:?}\nrows_per_page = {}\n# \"all_fields\" or \"searchable_columns\"\nsearch_scope = \"all_fields\"\n\n[log]\n# tracing filter directive; RUST_LOG overrides it.\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/crystal-admin/crystal-admin.log)\n# file = \"/absolute/path/to/crystal-admin.log\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_TIMEOUT,
            ROWS_PER_PAGE_CHOICES,
            DEFAULT_ROWS_PER_PAGE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
