//! Error types for the tuple cache
//!
//! Cache operations are infallible; errors only arise while loading
//! configuration.

use thiserror::Error;

// == Tuple Cache Error Enum ==
/// Unified error type for the tuple cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TupleCacheError {
    /// A configuration value could not be used
    #[error("Invalid configuration: {var}={value:?} ({reason})")]
    InvalidConfig {
        /// Name of the setting, e.g. the environment variable
        var: &'static str,
        /// The rejected raw value
        value: String,
        reason: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the tuple cache.
pub type Result<T> = std::result::Result<T, TupleCacheError>;
