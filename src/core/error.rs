//! Error conditions raised around the windowing engine.

/// Errors surfaced by series construction, data sources and input validation.
///
/// Boundary cases of the windowing algorithm itself (clicks outside the
/// data, empty windows) are not errors and never produce one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowError {
    /// A caller supplied a value the engine cannot work with
    InvalidArgument(String),
    /// The requested series could not be fetched or parsed
    DataUnavailable(String),
}

impl WindowError {
    /// Stable machine-readable code for this condition.
    pub fn code(&self) -> &'static str {
        match self {
            WindowError::InvalidArgument(_) => "INVALID_ARGUMENT",
            WindowError::DataUnavailable(_) => "DATA_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            WindowError::DataUnavailable(msg) => write!(f, "Data unavailable: {msg}"),
        }
    }
}

impl std::error::Error for WindowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_display() {
        let err = WindowError::InvalidArgument("window size must be positive".to_string());
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert_eq!(
            err.to_string(),
            "Invalid argument: window size must be positive"
        );

        let err = WindowError::DataUnavailable("unknown series 'foo'".to_string());
        assert_eq!(err.code(), "DATA_UNAVAILABLE");
        assert!(err.to_string().contains("foo"));
    }
}
