//! Error types for roadctl

use thiserror::Error;

/// Main error type for roadctl
#[derive(Error, Debug)]
pub enum RoadError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unknown target or unusable configuration. Raised before any side effect.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Zone lookup, record lookup or upsert failed at the DNS provider.
    #[error("DNS error: {0}")]
    DnsError(String),

    /// Reading or writing the journal or the genesis snapshot failed.
    #[error("Audit write error: {0}")]
    AuditWriteError(String),

    /// The entry command could not be spawned.
    #[error("Process launch error: {0}")]
    ProcessLaunchError(String),

    /// The entry command exited with a non-zero code (-1 when killed by a signal).
    #[error("Process exit error: entry command exited with code {code}")]
    ProcessExitError { code: i32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoadError {
    /// Process exit code to report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RoadError::ProcessExitError { code } if *code > 0 => *code,
            _ => 1,
        }
    }
}
