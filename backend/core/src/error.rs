use thiserror::Error;

/// A recoverable, user-facing argument-parse failure.
///
/// Carries exactly the text shown back to the user (typically naming the
/// offending token). Programmer errors — e.g. a malformed enum parser
/// configuration — are separate construction-time errors, never this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseFailure {
    pub message: String,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Failure for a token that cannot be read as the expected kind.
    pub fn bad_token(token: &str, expected: &str) -> Self {
        Self::new(format!("cannot parse \"{token}\" as {expected}"))
    }
}
