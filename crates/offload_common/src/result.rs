//! Result type for coordination bugs.

/// Result of an operation that can only fail because of a bug in the pipeline.
///
/// User-facing build problems are reported as diagnostics on the compilation;
/// `Err` here means an invariant of the pipeline itself was violated, such as a
/// host hook arriving in an order the coordinator cannot be in.
pub type OffloadResult<T> = Result<T, InternalError>;

/// An internal error: a logic error in the pipeline, not a problem with user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("after-compile before the worker pass finished");
        assert_eq!(
            err.to_string(),
            "internal error: after-compile before the worker pass finished"
        );
    }

    #[test]
    fn from_string() {
        let err: InternalError = "bad transition".to_string().into();
        assert_eq!(err.message, "bad transition");
    }

    #[test]
    fn result_alias() {
        let r: OffloadResult<u8> = Err(InternalError::new("x"));
        assert!(r.is_err());
    }
}
