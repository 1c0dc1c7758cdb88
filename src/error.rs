use std::path::PathBuf;

use thiserror::Error;

use crate::models::AvalStatus;

/// Failures of the aval submit/decide rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Missing required field: {field}")]
    Validation { field: &'static str },

    #[error("Cannot move an aval from '{from}' to '{to}'")]
    InvalidTransition { from: AvalStatus, to: AvalStatus },

    #[error("A rejection must include a reason")]
    MissingReason,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt data file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode {collection}: {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("No record with id {id} in {collection}")]
    NotFound { collection: &'static str, id: u64 },

    #[error("File not found: {0}")]
    MissingFile(PathBuf),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required (run `avales login`)")]
    AuthenticationRequired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Crate-level error returned by the command layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid date '{input}': {source}. Use YYYY-MM-DD.")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
