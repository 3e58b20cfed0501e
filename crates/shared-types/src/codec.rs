//! # Address Codec
//!
//! Canonicalizes numeric and hex values into fixed-width addresses and
//! decodes 32-byte ABI words.
//!
//! ## Normalization rule
//!
//! The input is read as an unsigned integer (hex when `0x`-prefixed, decimal
//! otherwise). Leading zero digits carry no weight, so a 64-digit word whose
//! top 12 bytes are zero still fits. The significant hex digits are left-padded
//! to 40; anything wider than 40 digits is rejected.

use primitive_types::U256;

use crate::entities::{Address, Word};
use crate::errors::CodecError;

/// Number of hex digits in a canonical address.
pub const ADDRESS_HEX_DIGITS: usize = 40;

/// How a 32-byte word should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordMode {
    /// Low-order 160 bits as an address.
    Address,
    /// Base-10 text of the unsigned value.
    Decimal,
    /// Raw 256-bit unsigned value.
    Numeric,
    /// Bytes as text, NUL padding removed.
    Text,
}

/// Result of [`decode_word`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedWord {
    Address(Address),
    Decimal(String),
    Numeric(U256),
    Text(String),
}

impl DecodedWord {
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            DecodedWord::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&U256> {
        match self {
            DecodedWord::Numeric(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedWord::Decimal(s) | DecodedWord::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Canonicalize a hex (`0x`-prefixed) or decimal value into an address.
///
/// # Errors
/// `CodecError::InvalidAddress` if the value is empty, not a non-negative
/// integer, or needs more than 40 hex digits.
pub fn normalize_address(value: &str) -> Result<Address, CodecError> {
    let invalid = || CodecError::InvalidAddress(value.to_string());
    let trimmed = value.trim();

    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        return address_from_hex_digits(digits).ok_or_else(invalid);
    }

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    // Anything past 256 bits is far past 160 bits anyway.
    let number = U256::from_dec_str(trimmed).map_err(|_| invalid())?;
    normalize_numeric(number).map_err(|_| invalid())
}

/// Canonicalize an unsigned integer into an address.
pub fn normalize_numeric(value: U256) -> Result<Address, CodecError> {
    let digits = format!("{:x}", value);
    address_from_hex_digits(&digits)
        .ok_or_else(|| CodecError::InvalidAddress(format!("0x{}", digits)))
}

fn address_from_hex_digits(digits: &str) -> Option<Address> {
    let significant = digits.trim_start_matches('0');
    if significant.len() > ADDRESS_HEX_DIGITS {
        return None;
    }

    let padded = format!("{:0>width$}", significant, width = ADDRESS_HEX_DIGITS);
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(padded, &mut bytes).ok()?;
    Some(Address(bytes))
}

/// Parse a hex word as returned by the node (`0x` optional, up to 64 digits,
/// left-padded).
pub fn parse_word(text: &str) -> Result<Word, CodecError> {
    let invalid = || CodecError::InvalidWord(text.to_string());
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    if digits.is_empty() || digits.len() > 64 {
        return Err(invalid());
    }

    let padded = format!("{:0>64}", digits);
    let mut word = [0u8; 32];
    hex::decode_to_slice(padded, &mut word).map_err(|_| invalid())?;
    Ok(word)
}

/// Interpret a 32-byte word.
///
/// # Errors
/// Only `WordMode::Address` can fail, when the value exceeds 160 bits.
pub fn decode_word(word: &Word, mode: WordMode) -> Result<DecodedWord, CodecError> {
    let value = U256::from_big_endian(word);

    match mode {
        WordMode::Address => normalize_numeric(value).map(DecodedWord::Address),
        WordMode::Decimal => Ok(DecodedWord::Decimal(value.to_string())),
        WordMode::Numeric => Ok(DecodedWord::Numeric(value)),
        WordMode::Text => Ok(DecodedWord::Text(word_to_text(word))),
    }
}

fn word_to_text(word: &Word) -> String {
    let start = word.iter().position(|&b| b != 0).unwrap_or(word.len());
    let end = word.iter().rposition(|&b| b != 0).map_or(start, |i| i + 1);
    String::from_utf8_lossy(&word[start..end]).into_owned()
}
