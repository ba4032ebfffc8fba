// This module defines the error types for value presentation using the thiserror crate.
// PresentError covers what can go wrong while building a presenter from a raw value: the
// value's type does not match the presenter (ShapeMismatch), a sub-field the presenter relies
// on is absent (FieldMissing), or a sub-field exists but has a kind the presenter cannot use
// (UnexpectedFieldShape). The last two indicate version skew between a presenter and the
// library layout it describes. HostError covers failures reported by the host itself: an
// unavailable registration scope, unreadable memory, or a rejected request. RegistrationError
// is returned when neither registration scope accepted a registry and keeps both causes.
// PresentResult<T> is the convenience alias used throughout the crate.

//! Error types for value presentation.

use thiserror::Error;

/// Errors raised while building or querying a presenter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentError {
    #[error("type `{found}` does not match `{expected}`")]
    ShapeMismatch {
        expected: String,
        found: String,
    },

    #[error("field `{path}` not found")]
    FieldMissing {
        path: String,
    },

    #[error("field `{path}` has an unexpected shape: {reason}")]
    UnexpectedFieldShape {
        path: String,
        reason: String,
    },
}

/// Errors reported by the host inspection or plugin API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("{scope} scope is not available")]
    ScopeUnavailable {
        scope: &'static str,
    },

    #[error("cannot read {len} bytes at {address:#x}")]
    UnreadableMemory {
        address: u64,
        len: usize,
    },

    #[error("host rejected the request: {reason}")]
    Rejected {
        reason: String,
    },
}

/// Neither the current module nor the whole program accepted the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot register presenters: current module: {module}; program: {program}")]
pub struct RegistrationError {
    /// Why the current-module scope failed.
    pub module: HostError,
    /// Why the program scope failed.
    pub program: HostError,
}

/// Result type alias for presenter operations.
pub type PresentResult<T> = Result<T, PresentError>;
