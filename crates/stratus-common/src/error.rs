//! Unified error types for the Stratus workspace.
//!
//! Composition fails synchronously at the first violated invariant and
//! never returns a partial resource graph.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StratusError {
    /// A composition option is missing or invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid option.
        message: String,
    },

    /// Two resources or declarations were registered under the same name.
    #[error("duplicate logical name: {logical_name}")]
    DuplicateLogicalName {
        /// The colliding logical name.
        logical_name: String,
    },

    /// Resource references form a cycle.
    #[error("cyclic dependency: {message}")]
    CyclicDependency {
        /// Description of the cycle.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StratusError>;
