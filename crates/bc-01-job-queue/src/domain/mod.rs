//! # Domain Module

pub mod descriptor;
pub mod errors;
pub mod job;
pub mod session;

pub use descriptor::*;
pub use errors::*;
pub use job::*;
pub use session::*;
