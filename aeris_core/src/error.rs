//! Unified error handling for the AERIS core.
//!
//! Every failure in this crate is recoverable by skipping the offending
//! record — nothing here is fatal to the process. Per-record decode
//! failures surface as `Option`/`Result` values at the call site; this
//! enum exists for callers that need to report *why* something was
//! skipped (and for the batch reader's diagnostics).

use thiserror::Error;

/// Main error type for AERIS core operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AerisError {
    /// Not enough words remain to decode the declared variant
    #[error("truncated packet: '{tag}' needs {needed} words, {available} remain")]
    Truncated {
        tag: &'static str,
        needed: usize,
        available: usize,
    },

    /// Tag string not present in the type registry
    #[error("unknown event tag: '{0}'")]
    UnknownTag(String),

    /// Raw device stream lost word alignment (timestamp marker missing)
    #[error("byte stream misaligned: dropped {dropped} bytes before resync")]
    Misaligned { dropped: u64 },

    /// Skin address/value halves arrived out of sequence
    #[error("skin pairing violation: {0}")]
    PairingViolation(String),

    /// A window, filter or surface was configured with unusable parameters
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for AERIS core operations
pub type AerisResult<T> = std::result::Result<T, AerisError>;
