//! Error types for binding operations.
//!
//! Every fallible operation in the workspace reports a [`BindingError`]. Keys
//! and offending inputs are rendered to text when the error is built, so the
//! error type stays independent of the key and value types of the stack that
//! produced it.
//!
//! ## Error Kinds
//!
//! ```text
//! BindingError
//! ├── UnboundVariable  - get/set/restore on a key with no binding
//! ├── MalformedPair    - replace_all given something that is not a (key, value) pair
//! ├── InvalidSequence  - replace_for_key given something that is not a sequence
//! ├── MissingBody      - scope run without a body
//! └── Host             - an external host refused a read or write
//! ```

use std::fmt;

use thiserror::Error;

/// Errors produced by binding stacks, accessors, scopes and hosts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// No binding exists for the key.
    #[error("unbound variable {key}")]
    UnboundVariable { key: String },

    /// An element handed to `replace_all` is not a two-element pair.
    #[error("expected (variable, value) pair at index {index}, got {received}")]
    MalformedPair { index: usize, received: String },

    /// The value list handed to `replace_for_key` is not a sequence.
    #[error("expected bindings to be a sequence, got {received}")]
    InvalidSequence { received: String },

    /// A scope was run without a body.
    #[error("no scope body given")]
    MissingBody,

    /// An external host rejected a read or write.
    #[error("host rejected {key}: {reason}")]
    Host { key: String, reason: String },
}

impl BindingError {
    /// Build an `UnboundVariable` error for `key`.
    pub fn unbound<K: fmt::Debug + ?Sized>(key: &K) -> Self {
        BindingError::UnboundVariable {
            key: format!("{key:?}"),
        }
    }

    /// Build a `Host` error for `key`.
    pub fn host<K: fmt::Debug + ?Sized>(key: &K, reason: impl Into<String>) -> Self {
        BindingError::Host {
            key: format!("{key:?}"),
            reason: reason.into(),
        }
    }

    /// Returns true if this is an `UnboundVariable` error.
    pub fn is_unbound(&self) -> bool {
        matches!(self, BindingError::UnboundVariable { .. })
    }
}

/// Result alias used throughout the workspace.
pub type BindingResult<T> = Result<T, BindingError>;
