//! # antnet-engine::events
//!
//! Defines the core `Event` enum and the `Queued` wrapper struct.
//! The `Event` enum is the continuation-callback form of the simulated
//! tasks: every suspension point of a node, link, consumer, or monitor is
//! an event that re-enters its handler. The `Queued` struct adds the
//! scheduled time and an insertion sequence number for deterministic
//! tie-breaking, making it suitable for the `BinaryHeap` used as the
//! simulation's priority queue.

use antnet_types::id::{ConsumerId, EventId, LinkId, NodeId};
use antnet_types::time::SimTime;
use std::cmp::Ordering;

/// A discriminant for stable tie-breaking in the event queue.
/// The tuple is (event_type_priority, subject_id).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventDiscriminant(pub u8, pub u32);

impl EventDiscriminant {
    pub fn timer(node: NodeId) -> Self {
        Self(1, node)
    }
    pub fn delivery(link: LinkId) -> Self {
        Self(2, link)
    }
    pub fn wake(consumer: ConsumerId) -> Self {
        Self(3, consumer)
    }
    pub fn monitor() -> Self {
        Self(255, u32::MAX)
    } // Monitor ticks have lowest priority
}

/// All events that can be scheduled in the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A link finished transmitting its in-flight packet.
    LinkDone { link: LinkId },
    /// Resume one of a consumer's request plans.
    ConsumerWake { consumer: ConsumerId, task: usize },
    /// Run one evaporation pass on a node's tables.
    Evaporate { node: NodeId },
    /// Ant-mode area seeding: emit probes for the next foreign area.
    Prepare { node: NodeId, area_index: usize },
    /// Sample every node's tables for the time-series monitor.
    MonitorTick,
}

impl Event {
    /// A short label for trace records.
    pub fn label(&self) -> &'static str {
        match self {
            Event::LinkDone { .. } => "link-done",
            Event::ConsumerWake { .. } => "consumer-wake",
            Event::Evaporate { .. } => "evaporate",
            Event::Prepare { .. } => "prepare",
            Event::MonitorTick => "monitor-tick",
        }
    }

    /// The id of the entity the event concerns, for trace records.
    pub fn subject(&self) -> u32 {
        match self {
            Event::LinkDone { link } => *link,
            Event::ConsumerWake { consumer, .. } => *consumer,
            Event::Evaporate { node } | Event::Prepare { node, .. } => *node,
            Event::MonitorTick => u32::MAX,
        }
    }
}

/// A wrapper for an `Event` with its scheduling information. This is the
/// type stored in the simulation's priority queue.
#[derive(Debug)]
pub struct Queued<T> {
    pub id: EventId,
    pub time: SimTime,
    /// A monotonic sequence number giving a stable order to events
    /// scheduled at the exact same time.
    pub insert_seq: u64,
    pub discriminant: EventDiscriminant,
    pub payload: T,
}

impl<T> Queued<T> {
    pub fn new(
        id: EventId,
        time: SimTime,
        insert_seq: u64,
        discriminant: EventDiscriminant,
        payload: T,
    ) -> Self {
        Self {
            id,
            time,
            insert_seq,
            discriminant,
            payload,
        }
    }
}

// The following implementations make `BinaryHeap` behave as a min-heap
// with deterministic ordering.

impl<T> PartialEq for Queued<T> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
            && self.insert_seq == other.insert_seq
            && self.discriminant == other.discriminant
    }
}

impl<T> Eq for Queued<T> {}

impl<T> PartialOrd for Queued<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Queued<T> {
    /// `BinaryHeap` is a max-heap, so the ordering is reversed to make it
    /// a min-heap. The primary key is `time`, then `insert_seq`, then the
    /// discriminant for stable tie-breaking.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.insert_seq.cmp(&self.insert_seq))
            .then_with(|| other.discriminant.cmp(&self.discriminant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn heap_pops_earliest_time_first() {
        let mut heap = BinaryHeap::new();
        heap.push(Queued::new(0, 20, 0, EventDiscriminant::monitor(), Event::MonitorTick));
        heap.push(Queued::new(1, 10, 1, EventDiscriminant::monitor(), Event::MonitorTick));
        heap.push(Queued::new(2, 15, 2, EventDiscriminant::monitor(), Event::MonitorTick));
        assert_eq!(heap.pop().unwrap().time, 10);
        assert_eq!(heap.pop().unwrap().time, 15);
        assert_eq!(heap.pop().unwrap().time, 20);
    }

    #[test]
    fn same_time_resolves_by_insertion_order() {
        let mut heap = BinaryHeap::new();
        heap.push(Queued::new(0, 5, 7, EventDiscriminant::delivery(0), Event::LinkDone { link: 0 }));
        heap.push(Queued::new(1, 5, 3, EventDiscriminant::delivery(1), Event::LinkDone { link: 1 }));
        assert_eq!(heap.pop().unwrap().insert_seq, 3);
        assert_eq!(heap.pop().unwrap().insert_seq, 7);
    }
}
