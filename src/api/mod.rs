//! Request builders and response shapes, one module per API resource.
//!
//! Builders return the raw [`ApiResponse`](crate::client::ApiResponse) so the
//! caller can either dump it (`--debug`) or decode it into the types below.

pub mod badges;
pub mod catalog;
pub mod challenges;
pub mod home;
pub mod machines;
pub mod platform;
pub mod pwnbox;
pub mod review;
pub mod season;
pub mod sherlocks;
pub mod tracks;
pub mod universities;
pub mod user;
pub mod vm;
pub mod vpn;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfoEnvelope<T> {
    pub info: T,
}

/// Most endpoints answer under `data`; a few older ones still use `info`.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoOrData<T> {
    #[serde(alias = "info")]
    pub data: T,
}

/// Paginated endpoints nest the rows one level deeper than plain lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Nested { data: Vec<T> },
    Flat(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Nested { data } | Listing::Flat(data) => data,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEntry {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
}

impl ActivityEntry {
    /// Machine activity names the user, profile activity names the target.
    pub fn subject(&self) -> Option<&str> {
        self.user_name.as_deref().or(self.name.as_deref())
    }

    pub fn when(&self) -> Option<&str> {
        self.created_at.as_deref().or(self.date.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityInfo {
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// The API sends flags as `true`, `1` or `"1"` depending on the endpoint.
pub fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
        Some(Value::String(s)) => match s.as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Numbers and strings both render as text; some counters arrive as either.
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Writes a downloaded payload. The handle is closed on every path; a failed
/// write can leave a partial file behind.
pub fn save_download(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    log::info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
