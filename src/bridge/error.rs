use thiserror::Error;

use crate::{
    bridge::exception::ExceptionRecord,
    config::ConfigError,
    embedded::Selector,
    host::HostError,
};

/// Failure of a bridge operation.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A required reference (target, name, argument) was absent.
    #[error("null reference: {0}")]
    NullReference(&'static str),

    /// A handle issued by another bridge; its value lives in another heap.
    #[error("foreign handle: {0} was issued by another bridge")]
    ForeignHandle(&'static str),

    #[error("callback not found: {0}")]
    CallbackNotFound(String),

    #[error("invalid method id: {0}")]
    InvalidMethodId(Selector),

    #[error("argument stack overflow: at most {limit} slots per call")]
    ArgumentStackOverflow { limit: usize },

    #[error("result mismatch: expected {expected}, found {found}")]
    ResultMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The embedded runtime raised an exception that reached the host.
    #[error("uncaught embedded exception: {}", .0.message)]
    Embedded(Box<ExceptionRecord>),

    /// A host method called from embedded code failed; the record's cause is
    /// the original host error.
    #[error("{}", .0.message)]
    Host(Box<ExceptionRecord>),

    #[error("bridge used from a thread other than its owner")]
    WrongThread,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BridgeError {
    /// Exception record of an `Embedded` or `Host` error.
    pub fn exception(&self) -> Option<&ExceptionRecord> {
        match self {
            BridgeError::Embedded(record) | BridgeError::Host(record) => Some(record),
            _ => None,
        }
    }

    pub fn host_cause(&self) -> Option<&HostError> {
        match self {
            BridgeError::Host(record) => record.cause.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            BridgeError::CallbackNotFound("not_found".into()).to_string(),
            "callback not found: not_found"
        );
        assert_eq!(
            BridgeError::ArgumentStackOverflow { limit: 16 }.to_string(),
            "argument stack overflow: at most 16 slots per call"
        );
        assert_eq!(
            BridgeError::ResultMismatch {
                expected: "int",
                found: "string"
            }
            .to_string(),
            "result mismatch: expected int, found string"
        );
        assert_eq!(
            BridgeError::NullReference("name").to_string(),
            "null reference: name"
        );
    }

    #[test]
    fn exception_accessor() {
        let record = ExceptionRecord {
            message: "Failure(\"boom\")".into(),
            cause: None,
            frames: Vec::new(),
        };
        let err = BridgeError::Embedded(Box::new(record));
        assert_eq!(err.to_string(), "uncaught embedded exception: Failure(\"boom\")");
        assert!(err.exception().is_some());
        assert!(err.host_cause().is_none());
        assert!(BridgeError::WrongThread.exception().is_none());
    }
}
