//! # antnet-engine::net
//!
//! The network subsystem: one-directional links with FIFO or priority
//! inboxes, per-packet transmission delays derived from size and rate,
//! TTL enforcement with waste accounting, and delivery to the peer
//! endpoint's handler.

mod link;
mod queue;

pub use link::{transmission_delay, Link};
pub use queue::Inbox;
