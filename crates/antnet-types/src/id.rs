//! # antnet-types::id
//!
//! Defines the core identifier types used throughout the simulation.
//! Using distinct aliases for different kinds of IDs documents intent at
//! call sites even though the compiler does not enforce the distinction.

/// A unique identifier for a forwarding node.
/// Invariant: nodes built from a topology have contiguous IDs from 0 to N-1.
pub type NodeId = u32;

/// A unique identifier for one half of a bidirectional link (one interface).
pub type LinkId = u32;

/// A unique identifier for a consumer endpoint.
pub type ConsumerId = u32;

/// A unique identifier for a producer endpoint.
pub type ProducerId = u32;

/// A unique identifier for a packet, assigned by its creator.
pub type PacketId = u64;

/// A unique identifier for a scheduled event in the simulation's queue.
pub type EventId = u64;
