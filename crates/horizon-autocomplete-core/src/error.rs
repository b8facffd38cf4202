//! Error types for the autocomplete foundations.

/// The main error type for core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Timer-related error.
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Async runtime error.
    #[error("Async runtime error: {0}")]
    Runtime(#[from] AsyncRuntimeError),
}

/// Timer-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The timer ID is invalid or has already been removed.
    #[error("Invalid or expired timer ID")]
    InvalidTimerId,
}

/// Errors that can occur with the async runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AsyncRuntimeError {
    /// The runtime has already been initialized.
    #[error("Async runtime already initialized")]
    AlreadyInitialized,

    /// Failed to create the runtime.
    #[error("Failed to create async runtime: {0}")]
    CreationFailed(String),
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: CoreError = TimerError::InvalidTimerId.into();
        assert_eq!(err.to_string(), "Timer error: Invalid or expired timer ID");

        let err: CoreError = AsyncRuntimeError::CreationFailed("no threads".into()).into();
        assert_eq!(
            err.to_string(),
            "Async runtime error: Failed to create async runtime: no threads"
        );
    }
}
