//! # Blade Client Test Suite
//!
//! Cross-crate flows, run against either the in-process `MockChannel` or a
//! scripted WebSocket node on localhost.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── helpers.rs        # scripted node, signer fixtures
//! └── integration/      # flows across the client crates
//!     ├── job_flow.rs
//!     ├── pubsub_flow.rs
//!     ├── proof_flow.rs
//!     └── ws_node.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bc-tests
//! cargo test -p bc-tests integration::ws_node
//! ```

pub mod helpers;
pub mod integration;
