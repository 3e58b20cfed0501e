//! # BC-02 Pub/Sub Registry
//!
//! Topic subscriptions on the storage network's pub/sub, multiplexed over the
//! single node connection.
//!
//! The node pushes every message for every topic as one
//! `ipfs_pubsub_incomming` event. The registry holds exactly one
//! transport-level subscription to that event while at least one topic is
//! subscribed, and a dispatcher task routes each message to its topic's
//! handler.
//!
//! | Message for | Outcome |
//! |-------------|---------|
//! | subscribed topic with handler | `Delivered` |
//! | subscribed topic, no handler | `Unhandled` (debug log) |
//! | any other topic | `Dropped` (silent) |

pub mod domain;
pub mod registry;

pub use domain::{handler, DispatchOutcome, PubSubError, PubSubMessage, TopicHandler};
pub use registry::{methods, PubSubRegistry, TransportSubscription, PUBSUB_EVENT};
