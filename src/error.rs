use std::io;
use std::path::PathBuf;

use crate::resolve::EntityKind;

#[derive(Debug, thiserror::Error)]
pub enum HtbError {
    #[error("missing API token: set HTB_TOKEN or run `htbcli config set --token <token>`")]
    MissingToken,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{}", http_message(.status, .message))]
    Http {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("{kind} not found: {reference}")]
    NotFound { kind: EntityKind, reference: String },

    #[error("no active {0}")]
    NoActiveTarget(EntityKind),

    #[error("flag rejected (HTTP {status}): {message}")]
    FlagRejected { status: u16, message: String },

    #[error("no flag given: pass it as an argument or pipe it on stdin")]
    EmptyFlag,

    #[error("{0}")]
    ConflictingFlags(String),

    #[error("nothing to update: provide --token/--base-url/--timeout")]
    NothingToUpdate,

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("swagger file not found: {}", .0.display())]
    SwaggerMissing(PathBuf),

    #[error("swagger parse error: {0}")]
    Swagger(#[from] serde_yaml::Error),
}

fn http_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(msg) => format!("HTTP {status}: {msg}"),
        None => format!("HTTP {status}"),
    }
}

impl HtbError {
    /// The raw HTTP exchange behind this error, if the server answered at all.
    pub fn raw_exchange(&self) -> Option<String> {
        match self {
            HtbError::Http { status, body, .. } => Some(format!("HTTP {status}\n{body}")),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HtbError>;
