// src/error.rs

use std::fmt;

/// Failure categories of a reduction run. Every error is fatal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Domain,
    Range,
    Shape,
    NotMonotonic,
    Config,
    Output,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Domain | ErrorKind::Range | ErrorKind::Shape | ErrorKind::NotMonotonic => 3,
            ErrorKind::Config => 2,
            ErrorKind::Output => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Domain => "DomainError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Shape => "ShapeError",
            ErrorKind::NotMonotonic => "NotMonotonicError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Output => "OutputError",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReductionError {
    kind: ErrorKind,
    message: String,
}

impl ReductionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Invalid input to a logarithmic, power or ratio model.
    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, message)
    }

    /// Interpolation query outside the calibration domain.
    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, message)
    }

    /// Mismatched lengths or too few points.
    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape, message)
    }

    pub fn not_monotonic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotMonotonic, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Output, message)
    }

    /// Prefixes the message with the step that failed, keeping the kind.
    pub fn context(self, step: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{step}: {}", self.message),
        }
    }
}

impl fmt::Display for ReductionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ReductionError {}

impl From<std::io::Error> for ReductionError {
    fn from(err: std::io::Error) -> Self {
        Self::output(err.to_string())
    }
}

impl From<csv::Error> for ReductionError {
    fn from(err: csv::Error) -> Self {
        Self::output(format!("csv: {err}"))
    }
}

pub type ReductionResult<T> = Result<T, ReductionError>;

/// Checks that two paired series have the same length.
pub fn ensure_same_len(what: &str, left: usize, right: usize) -> ReductionResult<()> {
    if left != right {
        return Err(ReductionError::shape(format!(
            "{what}: length mismatch ({left} vs {right})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = ReductionError::range("query 5 outside [1, 2]");
        assert_eq!(err.to_string(), "RangeError: query 5 outside [1, 2]");
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn context_keeps_kind() {
        let err = ReductionError::domain("R must be positive").context("Steinhart-Hart");
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(err.message(), "Steinhart-Hart: R must be positive");
    }

    #[test]
    fn exit_codes_by_kind() {
        assert_eq!(ErrorKind::Config.exit_code(), 2);
        for kind in [
            ErrorKind::Domain,
            ErrorKind::Range,
            ErrorKind::Shape,
            ErrorKind::NotMonotonic,
        ] {
            assert_eq!(kind.exit_code(), 3, "{kind:?}");
        }
        assert_eq!(ErrorKind::Output.exit_code(), 4);
        // Context keeps the kind, so the exit code survives wrapping.
        let wrapped = ReductionError::config("bad json").context("speed of light");
        assert_eq!(wrapped.exit_code(), 2);
        let io: ReductionError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert_eq!(io.exit_code(), 4);
    }

    #[test]
    fn ensure_same_len_rejects_mismatch() {
        assert!(ensure_same_len("x/y", 3, 3).is_ok());
        let err = ensure_same_len("x/y", 3, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }
}
