//! Error types for the storage and controller collaborators.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for controller calls.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Errors raised by a [`crate::store::RouteStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No network row with this id.
    #[error("network not found: {nwid}")]
    NetworkNotFound { nwid: String },

    /// A network row with this id exists already.
    #[error("network already exists: {nwid}")]
    NetworkExists { nwid: String },

    /// Update or delete referenced a route row that is not there.
    #[error("route {id} not found in network {nwid}")]
    RouteNotFound { nwid: String, id: String },

    /// A write would give two rows the same `(target, via)` key.
    #[error("duplicate route {key} in network {nwid}")]
    DuplicateRoute { nwid: String, key: String },

    /// The transaction was rolled back, nothing was written.
    #[error("transaction aborted: {reason}")]
    TransactionAborted { reason: String },
}

/// Errors raised by a [`crate::controller::Controller`].
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("network not found on controller: {nwid}")]
    NetworkNotFound { nwid: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid controller payload at {path}: {message}")]
    Payload { path: String, message: String },
}

/// Result type for the sync service.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the sync service and network provisioning.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The chosen block cannot be turned into network parameters.
    #[error("invalid address block: {0}")]
    Addressing(String),
}
