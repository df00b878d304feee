//! Error types for the peering engine

use thiserror::Error;

/// Peering engine error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeeringError {
    /// A value that must be an IP address literal could not be parsed
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// An attribute name not exposed by the object it was looked up on
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A filter name not present in the registry
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// A filter applied to a value kind it does not accept
    #[error("filter {filter} cannot be applied to {subject}")]
    InvalidSubject {
        /// Registry name of the filter
        filter: &'static str,
        /// Kind of the value the filter was applied to
        subject: &'static str,
    },

    /// A malformed argument passed to a filter
    #[error("invalid argument for {filter}: {reason}")]
    InvalidArgument {
        /// Registry name of the filter
        filter: &'static str,
        /// What was wrong with the argument
        reason: String,
    },
}

/// Result type for the peering engine
pub type PeeringResult<T> = Result<T, PeeringError>;
