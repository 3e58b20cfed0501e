//! # Domain Module
//!
//! Proof value type and errors.

pub mod errors;
pub mod proof;

pub use errors::*;
pub use proof::*;
