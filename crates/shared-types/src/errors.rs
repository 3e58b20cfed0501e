//! # Error Types
//!
//! Errors raised by the pure conversions in this crate.

use thiserror::Error;

/// Errors from address, word and unit conversions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Value cannot be canonicalized to a 40-hex-digit address.
    #[error("Not a valid address: {0}")]
    InvalidAddress(String),

    /// Text is not a 32-byte hex word.
    #[error("Not a valid 32-byte word: {0}")]
    InvalidWord(String),

    /// Amount text is malformed or has more precision than the unit allows.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
