//! Dispatch error taxonomy.
//!
//! Unknown or already-resolved offer ids are not errors: resolving one is a
//! no-op by contract, so nothing here models "not found".

use std::fmt;

#[derive(Debug)]
pub enum DispatchError {
    /// Malformed coordinates or payload. Rejected before any shared-state
    /// mutation; reported to the originating connection only.
    InvalidInput(String),
    /// Unexpected scheduler or transport fault. Logged by the transport,
    /// never fatal.
    Internal(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            DispatchError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}
