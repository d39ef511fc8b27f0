//! Error types for sitegen-core
//!
//! Every failure is recoverable at the screen level: the user can retry the
//! triggering action or navigate away. Nothing here is retried automatically.

use crate::gate::TokenShortfall;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sitegen operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Session Errors
    // ===================
    #[error("Please login first")]
    AuthRequired,

    #[error("Login failed: {message}")]
    LoginRejected { message: String },

    // ===================
    // Token Gate
    // ===================
    #[error("{0}")]
    InsufficientTokens(TokenShortfall),

    // ===================
    // Workflow Errors
    // ===================
    #[error("{message}")]
    EmptyInput { message: String },

    #[error("Another request is already in progress")]
    Busy,

    #[error("Cannot {action} while the workflow is in the {state} state")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    // ===================
    // Backend Errors
    // ===================
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Unexpected response from {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    // ===================
    // Storage Errors
    // ===================
    #[error("Failed to read storage file: {path}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write storage file: {path}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse storage file {path}: {message}")]
    StorageParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Export Errors
    // ===================
    #[error("Failed to write {path}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown token package: {id}")]
    UnknownPackage { id: String },

    #[error("Invalid route: {path}")]
    InvalidRoute { path: String },
}

impl CoreError {
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput {
            message: message.into(),
        }
    }

    /// Backend or transport failure (the `NetworkOrBackendError` family)
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Backend { .. } | CoreError::Network { .. } | CoreError::Decode { .. }
        )
    }

    /// Messages meant for the end user as-is (everything else is internal
    /// plumbing and gets a generic wording in the UI)
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CoreError::AuthRequired
                | CoreError::LoginRejected { .. }
                | CoreError::InsufficientTokens(_)
                | CoreError::EmptyInput { .. }
                | CoreError::Backend { .. }
                | CoreError::UnknownPackage { .. }
        )
    }

    /// Errors that should send the user to the sign-in screen
    pub fn requires_login(&self) -> bool {
        matches!(self, CoreError::AuthRequired)
    }

    /// Actionable hint for terminal users
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CoreError::AuthRequired => Some("Run 'sitegen login --id-token <TOKEN>' first".to_string()),
            CoreError::InsufficientTokens(_) => {
                Some("Run 'sitegen packages' and 'sitegen buy <package>' to top up".to_string())
            }
            CoreError::Network { .. } => {
                Some("Check that the backend is reachable (see --api-url / --auth-url)".to_string())
            }
            CoreError::StorageParse { path, .. } => Some(format!(
                "Remove the corrupted file and sign in again: rm {}",
                path.display()
            )),
            CoreError::UnknownPackage { .. } => {
                Some("Run 'sitegen packages' to list available packages".to_string())
            }
            _ => None,
        }
    }
}
