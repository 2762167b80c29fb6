//! Error types for the regex bridge.
//!
//! Engine diagnostics (compile failures, match-time failures) carry the
//! Oniguruma error code and message untouched. Caller contract violations get
//! their own variants so they can never be mistaken for a failed match.

use std::fmt;

use thiserror::Error;

/// Engine diagnostic: numeric Oniguruma code plus the engine's message.
///
/// The message is kept as bytes: the engine quotes pattern fragments (group
/// names, escapes) into it, and those are not necessarily UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    code: i32,
    message: Vec<u8>,
}

impl ErrorInfo {
    pub fn new(code: i32, message: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Oniguruma error code (`ONIGERR_*`, always negative for real errors).
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Message bytes exactly as the engine produced them.
    pub fn message(&self) -> &[u8] {
        &self.message
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.message))
    }
}

impl From<onig::Error> for ErrorInfo {
    fn from(e: onig::Error) -> Self {
        ErrorInfo::new(e.code(), e.description().as_bytes())
    }
}

#[derive(Debug, Error)]
pub enum RegexError {
    /// Pattern rejected by the engine. No handle was produced.
    #[error("{0}")]
    Compile(ErrorInfo),

    /// The engine failed while matching (e.g. a retry limit was exceeded).
    #[error("{0}")]
    Engine(ErrorInfo),

    /// Match offset past the end of the subject.
    #[error("offset {offset} out of range for subject of {len} bytes")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// Pattern or subject bytes are not valid UTF-8 under a UTF-8 pattern.
    #[error("{input} is not valid UTF-8: invalid sequence at byte {valid_up_to} of {len}")]
    InvalidUtf8 {
        input: &'static str,
        valid_up_to: usize,
        len: usize,
    },

    /// Option bits that are unknown or not valid for the call they were
    /// passed to.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The pattern handle was released before this call.
    #[error("pattern handle has been released")]
    Released,

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RegexError {
    /// Engine diagnostic for `Compile` / `Engine` errors.
    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            RegexError::Compile(info) | RegexError::Engine(info) => Some(info),
            _ => None,
        }
    }

    /// True for errors caused by a caller bug rather than by the pattern or
    /// subject contents.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            RegexError::OffsetOutOfRange { .. }
                | RegexError::InvalidUtf8 { .. }
                | RegexError::InvalidOptions(_)
                | RegexError::Released
        )
    }
}

/// Result type for regex bridge operations.
pub type Result<T> = std::result::Result<T, RegexError>;
