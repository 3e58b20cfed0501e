//! # Ports
//!
//! The outbound side is `shared_rpc::RemoteChannel`.

pub mod inbound;
