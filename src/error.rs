//! Error taxonomy for repver operations.
//!
//! Every fatal failure maps to a stable process exit code: 100s for
//! configuration and user-input errors, 200s for git branch/workflow
//! errors, 500s for internal errors that validation should have made
//! impossible.

use thiserror::Error;

/// Convenience type alias for Results in repver
pub type Result<T> = std::result::Result<T, RepverError>;

#[derive(Error, Debug)]
pub enum RepverError {
    #[error(".repver file not found")]
    ConfigNotFound,

    #[error(".repver failed to load: {0}")]
    ConfigLoad(String),

    #[error(".repver validation failed\n{0}")]
    Validation(String),

    #[error("No command specified")]
    NoCommand,

    #[error("Command not found")]
    CommandNotFound(String),

    #[error("Missing required parameters")]
    MissingParameters { help: String },

    #[error("Not in git repository")]
    NotRepositoryRoot,

    #[error("Git workspace not clean")]
    WorkspaceDirty,

    #[error("Parameter '{name}' validation failed: {reason}")]
    ParameterInvalid { name: String, reason: String },

    #[error("Failed to extract groups from parameter '{name}': {reason}")]
    Extraction { name: String, reason: String },

    #[error("Branch '{0}' already exists")]
    BranchExists(String),

    #[error("Failed to create new branch: {0}")]
    BranchCreate(String),

    #[error("Failed to execute command on target: {0}")]
    Execution(String),

    #[error("Failed to create GitHub pull request: {0}")]
    PullRequest(String),

    #[error("Internal error: {message}")]
    Internal { code: i32, message: String },
}

impl RepverError {
    /// Create an internal error carrying an explicit 500-series exit code
    pub fn internal(code: i32, message: impl Into<String>) -> Self {
        RepverError::Internal {
            code,
            message: message.into(),
        }
    }

    /// Create a validation error with a human-readable cause
    pub fn validation(msg: impl Into<String>) -> Self {
        RepverError::Validation(msg.into())
    }

    /// The process exit code for this failure. These values are a stable
    /// contract with automation built on top of repver.
    pub fn exit_code(&self) -> i32 {
        match self {
            RepverError::ConfigNotFound => 100,
            RepverError::ConfigLoad(_) => 101,
            RepverError::Validation(_) => 102,
            RepverError::NoCommand => 103,
            RepverError::CommandNotFound(_) => 104,
            RepverError::MissingParameters { .. } => 105,
            RepverError::NotRepositoryRoot => 106,
            RepverError::WorkspaceDirty => 107,
            RepverError::ParameterInvalid { .. } => 108,
            RepverError::Extraction { .. } => 109,
            RepverError::BranchExists(_) => 200,
            RepverError::BranchCreate(_) => 201,
            RepverError::Execution(_) => 202,
            RepverError::PullRequest(_) => 508,
            RepverError::Internal { code, .. } => *code,
        }
    }
}
