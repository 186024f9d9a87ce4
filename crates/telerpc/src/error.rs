//! # Error Definitions
//!
//! Codec-level failures and the fault arm of a Reply.

use crate::value::Value;

use telepack::Error as PackError;

/// Operational failures within the protocol layer itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The underlying telepack layer failed (truncated buffer, bad tag).
    Serialization(PackError),
    /// A required envelope field was absent.
    MissingField(String),
    /// An unknown variant or top-level frame type was encountered.
    UnknownVariant(String),
    /// The structure of the message was malformed.
    ProtocolViolation(String),
    /// The nested depth of the values exceeded the safety limit.
    RecursionLimitExceeded,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialization(e) => write!(f, "serialization failed: {}", e),
            Self::MissingField(name) => write!(f, "missing envelope field '{}'", name),
            Self::UnknownVariant(name) => write!(f, "unknown variant '{}'", name),
            Self::ProtocolViolation(msg) => write!(f, "protocol violation: {}", msg),
            Self::RecursionLimitExceeded => write!(f, "value nesting exceeds the recursion limit"),
        }
    }
}

impl std::error::Error for Error {}

impl From<PackError> for Error {
    fn from(e: PackError) -> Self {
        Self::Serialization(e)
    }
}

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The "Err" side of a Reply envelope.
///
/// These are distinct from [`Error`]: a `Fault` is the *remote side* reporting
/// that the call did not produce a value, whereas `Error` means the bytes
/// themselves could not be understood.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// The implementation raised an error during a resolved invocation.
    /// The payload is carried opaquely and re-raised verbatim at the caller.
    App(Value),
    /// No method on the remote contract matched the call's name, arity,
    /// or argument shapes.
    NoMethod(String),
}
