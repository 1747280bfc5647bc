//! Error types for clidrive.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for session operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The channel reported not-alive while a poll loop was waiting.
    ///
    /// Fatal to the current call; surfaced immediately, never retried
    /// internally.
    #[error("session terminated while waiting for device output")]
    SessionTerminated,

    /// Polling exhausted the read timeout with a live but silent channel
    /// and no stable non-empty line was observed.
    ///
    /// Callers may fall back to a cached prompt and retry at their level.
    #[error("prompt not found after waiting {waited:?}")]
    PromptNotFound { waited: Duration },

    /// A command was issued but the completion pattern never matched
    /// within the allotted time or iteration budget.
    ///
    /// `output` carries the accumulated partial output for diagnostics;
    /// partial results are never discarded on timeout.
    #[error("pattern {pattern:?} not detected in output: {output:?}")]
    PatternNotFound { pattern: String, output: String },

    /// Prompt discovery failed before a command could be sent.
    ///
    /// Raised when no expect pattern was supplied and auto-discovery
    /// did not produce a usable prompt.
    #[error("prompt not found before sending command: {source}")]
    PromptDiscovery {
        #[source]
        source: Box<Error>,
    },

    /// A caller-supplied expect pattern failed to compile.
    #[error("invalid expect pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// I/O error from the underlying channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias using clidrive's Error.
pub type Result<T> = std::result::Result<T, Error>;
