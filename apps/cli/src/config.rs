use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{
    feed::{DEFAULT_FEED_BASE_URL, DEFAULT_FEED_LANGUAGE, DEFAULT_FEED_TIMEOUT, DEFAULT_USER_AGENT},
    FeedSettings,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "born_today.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub feed_base_url: String,
    pub feed_language: String,
    pub feed_timeout_ms: u64,
    pub user_agent: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_base_url: DEFAULT_FEED_BASE_URL.into(),
            feed_language: DEFAULT_FEED_LANGUAGE.into(),
            feed_timeout_ms: DEFAULT_FEED_TIMEOUT.as_millis() as u64,
            user_agent: DEFAULT_USER_AGENT.into(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            base_url: self.feed_base_url.clone(),
            language: self.feed_language.clone(),
            timeout: Duration::from_millis(self.feed_timeout_ms),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    feed_base_url: Option<String>,
    feed_language: Option<String>,
    feed_timeout_ms: Option<u64>,
    user_agent: Option<String>,
    log_filter: Option<String>,
}

/// Defaults, then the TOML file, then `APP__*` environment variables.
///
/// An explicitly named file must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let raw = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    if let Some(raw) = raw {
        apply_file(&mut settings, &raw)?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw).context("failed to parse config file")?;
    if let Some(v) = file.feed_base_url {
        settings.feed_base_url = v;
    }
    if let Some(v) = file.feed_language {
        settings.feed_language = v;
    }
    if let Some(v) = file.feed_timeout_ms {
        settings.feed_timeout_ms = v;
    }
    if let Some(v) = file.user_agent {
        settings.user_agent = v;
    }
    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__FEED_BASE_URL") {
        settings.feed_base_url = v;
    }
    if let Some(v) = var("APP__FEED_LANGUAGE") {
        settings.feed_language = v;
    }
    if let Some(v) = var("APP__FEED_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.feed_timeout_ms = parsed;
        }
    }
    if let Some(v) = var("APP__USER_AGENT") {
        settings.user_agent = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
