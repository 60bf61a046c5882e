//! # antnet-engine::ids
//!
//! Provides a generator for unique, monotonic IDs for events, packets,
//! and queue insertion sequence numbers.

use antnet_types::id::{EventId, PacketId};

/// A generator for the various kinds of simulation IDs.
pub struct IdGen {
    event_id: EventId,
    packet_id: PacketId,
    /// Used for deterministic tie-breaking in the event queue.
    insertion_seq: u64,
}

impl IdGen {
    pub fn new() -> Self {
        Self {
            event_id: 0,
            packet_id: 0,
            insertion_seq: 0,
        }
    }

    pub fn next_event_id(&mut self) -> EventId {
        let id = self.event_id;
        self.event_id = self.event_id.checked_add(1).expect("EventId overflow");
        id
    }

    pub fn next_packet_id(&mut self) -> PacketId {
        let id = self.packet_id;
        self.packet_id = self.packet_id.checked_add(1).expect("PacketId overflow");
        id
    }

    pub fn next_insertion_seq(&mut self) -> u64 {
        let id = self.insertion_seq;
        self.insertion_seq = self
            .insertion_seq
            .checked_add(1)
            .expect("InsertionSeq overflow");
        id
    }
}

impl Default for IdGen {
    fn default() -> Self {
        Self::new()
    }
}
