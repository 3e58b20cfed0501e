//! # Domain Module

pub mod errors;
pub mod message;

pub use errors::*;
pub use message::*;
