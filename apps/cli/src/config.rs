use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{FeedOptions, HttpApiOptions, PagingMode};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "hackmate.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub session_db: String,
    pub request_timeout_secs: u64,
    pub page_size: u32,
    pub paging_mode: PagingMode,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080/".into(),
            session_db: "sqlite://./data/hackmate_session.db".into(),
            request_timeout_secs: 30,
            page_size: 20,
            paging_mode: PagingMode::Append,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn http_options(&self) -> HttpApiOptions {
        HttpApiOptions {
            base_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            page_size: self.page_size.max(1),
            paging_mode: self.paging_mode,
            ..FeedOptions::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_url: Option<String>,
    session_db: Option<String>,
    request_timeout_secs: Option<u64>,
    page_size: Option<u32>,
    paging_mode: Option<PagingMode>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicitly requested config file must exist; the default
/// `hackmate.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && config_path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.session_db = normalize_session_db_url(&settings.session_db);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file.session_db {
        settings.session_db = v;
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file.paging_mode {
        settings.paging_mode = v;
    }
    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

/// Later keys win, so `APP__*` beats the `HACKMATE_*` spelling.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("HACKMATE_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("HACKMATE_SESSION_DB") {
        settings.session_db = v;
    }
    if let Some(v) = lookup("APP__SESSION_DB") {
        settings.session_db = v;
    }

    if let Some(parsed) = lookup("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = parsed;
    }
    if let Some(parsed) = lookup("APP__PAGE_SIZE").and_then(|v| v.parse().ok()) {
        settings.page_size = parsed;
    }
    if let Some(parsed) = lookup("APP__PAGING_MODE").and_then(|v| v.parse().ok()) {
        settings.paging_mode = parsed;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

pub fn normalize_session_db_url(raw: &str) -> String {
    let raw = raw.trim();

    if raw.is_empty() {
        return Settings::default().session_db;
    }

    if raw.starts_with("sqlite::memory:") || raw.starts_with("sqlite://") || raw.contains("://") {
        return raw.to_string();
    }

    if let Some(path) = raw.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
