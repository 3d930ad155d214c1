//! Error types for presence publishing and settings loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::presence::PublisherState;

/// Failures reported by a presence provider or by the publisher lifecycle.
#[derive(Debug, Error)]
pub enum PresenceError {
    /// The provider could not open its connection (Discord not running, no IPC pipe, ...).
    #[error("{provider} is not available: {message}")]
    Unavailable {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} handshake timed out after {secs}s")]
    HandshakeTimeout { provider: &'static str, secs: u64 },

    /// The service closed the connection before or during a call.
    #[error("{provider} disconnected: {reason}")]
    Disconnected {
        provider: &'static str,
        reason: String,
    },

    /// The service accepted the connection but refused the status update.
    #[error("{provider} rejected the status update: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },

    #[error("cannot publish before a connection is established (state: {state:?})")]
    NotConnected { state: PublisherState },

    #[error("cannot {operation} while {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: PublisherState,
    },

    #[error("invalid application id {0:?}: expected a numeric snowflake")]
    InvalidApplicationId(String),
}

/// Failures while assembling settings from file, environment and command line.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize settings for {path}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no application id configured; set application_id, DM_PRESENCE_APP_ID or --app-id")]
    MissingApplicationId,

    #[error("invalid value for {option}: {message}")]
    Invalid {
        option: &'static str,
        message: String,
    },

    #[error(transparent)]
    ApplicationId(#[from] PresenceError),
}
