use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HtbError, Result};

pub const DEFAULT_BASE_URL: &str = "https://labs.hackthebox.com/api/v4";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

pub const TOKEN_VAR: &str = "HTB_TOKEN";
pub const BASE_URL_VAR: &str = "HTB_BASE_URL";
pub const TIMEOUT_VAR: &str = "HTB_TIMEOUT";

/// Values read from a `.env`-style file. Blank entries count as unset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoredConfig {
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

/// Effective configuration, resolved once per process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_token: String,
    pub base_url: String,
    pub timeout_seconds: f64,
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("htbcli").join(".env");
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("htbcli")
        .join(".env")
}

pub fn load_stored_from(path: &Path) -> StoredConfig {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(_) => return StoredConfig::default(),
    };

    let mut stored = StoredConfig::default();
    for item in iter {
        let Ok((key, value)) = item else {
            log::warn!("skipping malformed line in {}", path.display());
            continue;
        };
        let value = non_empty(&value).map(str::to_owned);
        match key.as_str() {
            TOKEN_VAR => stored.token = value,
            BASE_URL_VAR => stored.base_url = value,
            TIMEOUT_VAR => stored.timeout = value,
            _ => {}
        }
    }
    stored
}

/// Layers the stored sources; earlier entries win field by field.
pub fn merge_stored(layers: &[StoredConfig]) -> StoredConfig {
    fn first_set(
        layers: &[StoredConfig],
        field: impl Fn(&StoredConfig) -> Option<&String>,
    ) -> Option<String> {
        layers.iter().find_map(|layer| field(layer).cloned())
    }
    StoredConfig {
        token: first_set(layers, |c| c.token.as_ref()),
        base_url: first_set(layers, |c| c.base_url.as_ref()),
        timeout: first_set(layers, |c| c.timeout.as_ref()),
    }
}

/// `./.env` first, then the stored config file.
pub fn load_stored() -> StoredConfig {
    merge_stored(&[
        load_stored_from(Path::new(".env")),
        load_stored_from(&config_path()),
    ])
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn resolve_from_env(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .as_deref()
        .and_then(non_empty)
        .map(str::to_owned)
}

fn resolve_field(stored: Option<&str>, env_var: &str) -> Option<String> {
    resolve_from_env(env_var).or_else(|| stored.and_then(non_empty).map(str::to_owned))
}

pub fn resolve_token(stored: &StoredConfig) -> Result<String> {
    resolve_field(stored.token.as_deref(), TOKEN_VAR).ok_or(HtbError::MissingToken)
}

pub fn resolve_base_url(stored: &StoredConfig) -> String {
    resolve_field(stored.base_url.as_deref(), BASE_URL_VAR)
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Positive seconds that also fit in a [`Duration`].
pub fn parse_timeout(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| *secs > 0.0 && Duration::try_from_secs_f64(*secs).is_ok())
        .ok_or_else(|| {
            HtbError::InvalidConfig(format!("{TIMEOUT_VAR} must be a positive number, got {raw:?}"))
        })
}

pub fn resolve_timeout(stored: &StoredConfig) -> Result<f64> {
    match resolve_field(stored.timeout.as_deref(), TIMEOUT_VAR) {
        None => Ok(DEFAULT_TIMEOUT_SECS),
        Some(raw) => parse_timeout(&raw),
    }
}

impl Config {
    pub fn resolve(stored: &StoredConfig) -> Result<Self> {
        Ok(Self {
            api_token: resolve_token(stored)?,
            base_url: resolve_base_url(stored),
            timeout_seconds: resolve_timeout(stored)?,
        })
    }

    pub fn load() -> Result<Self> {
        Self::resolve(&load_stored())
    }
}

/// Base URL for the v5 endpoints, derived from the configured v4 base.
pub fn v5_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    match trimmed.strip_suffix("/v4") {
        Some(prefix) => format!("{prefix}/v5"),
        None => trimmed.to_string(),
    }
}

fn quote_env_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

pub fn save_stored_to(path: &Path, stored: &StoredConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = String::new();
    for (key, value) in [
        (TOKEN_VAR, &stored.token),
        (BASE_URL_VAR, &stored.base_url),
        (TIMEOUT_VAR, &stored.timeout),
    ] {
        if let Some(value) = value {
            content.push_str(&format!("{key}={}\n", quote_env_value(value)));
        }
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, &content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&temp_path, perms)?;
    }

    std::fs::rename(&temp_path, path)?;
    Ok(())
}

pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}
