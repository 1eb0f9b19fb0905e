use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::protocol::{is_valid_page_size, DEFAULT_PAGE_SIZE};
use tracing::warn;
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base: String,
    pub search_debounce_ms: u64,
    pub toast_duration_ms: u64,
    pub default_page_size: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            search_debounce_ms: 400,
            toast_duration_ms: 3000,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientSettings {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base: Option<String>,
    search_debounce_ms: Option<u64>,
    toast_duration_ms: Option<u64>,
    default_page_size: Option<u32>,
}

/// Defaults, then `client.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    load_settings_with(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => warn!(path = %path.display(), %error, "ignoring malformed settings file"),
        }
    }

    if let Some(v) = env("API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }

    if let Some(v) = env("APP__SEARCH_DEBOUNCE_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.search_debounce_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__SEARCH_DEBOUNCE_MS"),
        }
    }
    if let Some(v) = env("APP__TOAST_DURATION_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.toast_duration_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__TOAST_DURATION_MS"),
        }
    }
    if let Some(v) = env("APP__DEFAULT_PAGE_SIZE") {
        match v.parse::<u32>() {
            Ok(parsed) if is_valid_page_size(parsed) => settings.default_page_size = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__DEFAULT_PAGE_SIZE"),
        }
    }

    settings
}

fn apply_file(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base {
        settings.api_base = v;
    }
    if let Some(v) = file_cfg.search_debounce_ms {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = file_cfg.toast_duration_ms {
        settings.toast_duration_ms = v;
    }
    match file_cfg.default_page_size {
        Some(v) if is_valid_page_size(v) => settings.default_page_size = v,
        Some(v) => warn!(value = v, "ignoring invalid default_page_size"),
        None => {}
    }
}

/// Checks the base URL is http(s) and strips trailing slashes so paths can
/// be appended directly.
pub fn normalize_api_base(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_API_BASE.to_string());
    }

    let url = Url::parse(raw).with_context(|| format!("invalid api base url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api base url '{raw}' must use http or https");
    }
    if url.host_str().is_none() {
        bail!("api base url '{raw}' has no host");
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
