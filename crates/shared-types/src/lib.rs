//! # Shared Types Crate
//!
//! Types and pure conversions used across the Blade client crates.
//!
//! ## Contents
//!
//! - `entities`: `Address`, `Hash`, `Word`
//! - `codec`: address canonicalization and 32-byte word decoding
//! - `units`: wei / ether style unit conversion
//! - `errors`: `CodecError`
//!
//! Everything in this crate is stateless and safe to call from any thread.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod units;

pub use codec::{decode_word, normalize_address, normalize_numeric, parse_word, DecodedWord, WordMode};
pub use entities::{Address, Hash, Word};
pub use errors::CodecError;
pub use primitive_types::U256;
pub use units::{from_wei, to_wei, Unit};
