// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use arya_api::{Client, Geocoder, geocode};
use arya_app::{DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "arya";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const MAX_PAGE_SIZE: usize = 100;
const ANON_KEY_ENV: &str = "ARYA_ANON_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub geocoding: Geocoding,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            search: Search::default(),
            geocoding: Geocoding::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub anon_key: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: None,
            anon_key: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
    pub debounce: Option<String>,
    pub page_size: Option<usize>,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            debounce: Some(format!("{}ms", DEFAULT_DEBOUNCE.as_millis())),
            page_size: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geocoding {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for Geocoding {
    fn default() -> Self {
        Self {
            base_url: Some(geocode::DEFAULT_GEOCODER_URL.to_owned()),
            user_agent: Some(geocode::DEFAULT_USER_AGENT.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ARYA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ARYA_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
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
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [search], and [geocoding]",
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
            && !is_http_url(base_url)
        {
            bail!(
                "api.base_url in {} must start with http:// or https://, got {:?}",
                path.display(),
                base_url
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

        if let Some(debounce) = &self.search.debounce {
            parse_duration(debounce)
                .with_context(|| format!("search.debounce in {}", path.display()))?;
        }

        if let Some(page_size) = self.search.page_size
            && !(1..=MAX_PAGE_SIZE).contains(&page_size)
        {
            bail!(
                "search.page_size in {} must be between 1 and {MAX_PAGE_SIZE}, got {}",
                path.display(),
                page_size
            );
        }

        if let Some(base_url) = &self.geocoding.base_url
            && !is_http_url(base_url)
        {
            bail!(
                "geocoding.base_url in {} must start with http:// or https://, got {:?}",
                path.display(),
                base_url
            );
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> Result<&str> {
        self.api
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| {
                anyhow!("api.base_url is not set; add it under [api] or run with --demo")
            })
    }

    /// The anon key from the config file, falling back to `ARYA_ANON_KEY`.
    pub fn anon_key(&self) -> Result<String> {
        if let Some(key) = self.api.anon_key.as_deref()
            && !key.trim().is_empty()
        {
            return Ok(key.trim().to_owned());
        }
        env::var(ANON_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("api.anon_key is not set; add it under [api] or set {ANON_KEY_ENV}"))
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn debounce(&self) -> Result<Duration> {
        match &self.search.debounce {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_DEBOUNCE),
        }
    }

    /// Fixed page size, or `None` to size pages from the terminal width.
    pub fn page_size(&self) -> Option<usize> {
        self.search.page_size
    }

    pub fn geocoding_base_url(&self) -> &str {
        self.geocoding
            .base_url
            .as_deref()
            .unwrap_or(geocode::DEFAULT_GEOCODER_URL)
            .trim_end_matches('/')
    }

    pub fn geocoding_user_agent(&self) -> &str {
        self.geocoding
            .user_agent
            .as_deref()
            .unwrap_or(geocode::DEFAULT_USER_AGENT)
    }

    pub fn client(&self) -> Result<Client> {
        Client::new(self.api_base_url()?, &self.anon_key()?, self.api_timeout()?)
    }

    pub fn geocoder(&self) -> Result<Geocoder> {
        Geocoder::new(
            self.geocoding_base_url(),
            self.geocoding_user_agent(),
            self.api_timeout()?,
        )
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# arya config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"https://<project>.supabase.co\"\n# Or leave unset and export {ANON_KEY_ENV}\nanon_key = \"<anon key>\"\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[search]\ndebounce = \"{}ms\"\n# Unset: pages follow the terminal width\n# page_size = {DEFAULT_PAGE_SIZE}\n\n[geocoding]\nbase_url = \"{}\"\nuser_agent = \"{}\"\n",
            path.display(),
            DEFAULT_DEBOUNCE.as_millis(),
            geocode::DEFAULT_GEOCODER_URL,
            geocode::DEFAULT_USER_AGENT,
        )
    }
}

fn is_http_url(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
