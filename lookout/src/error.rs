use std::sync::Arc;

use crate::TimeoutError;

/// The single error type for all lookout operations.
///
/// Mismatches are not errors: the matcher returns them as data and a wait
/// keeps listening after one. A wait only fails with [`Error::Timeout`],
/// once, after its listener has been removed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Timeout(Box<TimeoutError>),

    #[error("Serialization error: {0}")]
    Serialization(#[source] Arc<serde_json::Error>),
}

impl Error {
    /// Returns the timeout details if this is a timeout.
    pub fn as_timeout(&self) -> Option<&TimeoutError> {
        match self {
            Error::Timeout(timeout) => Some(timeout),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<TimeoutError> for Error {
    fn from(e: TimeoutError) -> Self {
        Error::Timeout(Box::new(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(Arc::new(e))
    }
}
