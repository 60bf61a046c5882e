//! # antnet-engine::net::queue
//!
//! The inbox of a link. Under FIFO discipline, packets leave in arrival
//! order. Under priority discipline, Data overtakes Interest and, within
//! a mode, lower packet ids leave first; packets with equal keys keep
//! their arrival order via a per-inbox sequence number.

use antnet_types::config::QueueDiscipline;
use antnet_types::id::PacketId;
use antnet_types::packet::Packet;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

/// A queued packet with its priority key and arrival sequence.
struct Ranked {
    key: (u8, PacketId),
    seq: u64,
    pkt: Packet,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}
impl Eq for Ranked {}
impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key).then_with(|| self.seq.cmp(&other.seq))
    }
}

/// A link's pending-packet queue.
pub enum Inbox {
    Fifo(VecDeque<Packet>),
    Priority {
        heap: BinaryHeap<Reverse<Ranked>>,
        seq: u64,
    },
}

impl Inbox {
    pub fn new(discipline: QueueDiscipline) -> Self {
        match discipline {
            QueueDiscipline::Fifo => Inbox::Fifo(VecDeque::new()),
            QueueDiscipline::Priority => Inbox::Priority {
                heap: BinaryHeap::new(),
                seq: 0,
            },
        }
    }

    pub fn push(&mut self, pkt: Packet) {
        match self {
            Inbox::Fifo(q) => q.push_back(pkt),
            Inbox::Priority { heap, seq } => {
                let ranked = Ranked {
                    key: pkt.priority_key(),
                    seq: *seq,
                    pkt,
                };
                *seq += 1;
                heap.push(Reverse(ranked));
            }
        }
    }

    pub fn pop(&mut self) -> Option<Packet> {
        match self {
            Inbox::Fifo(q) => q.pop_front(),
            Inbox::Priority { heap, .. } => heap.pop().map(|Reverse(r)| r.pkt),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Inbox::Fifo(q) => q.len(),
            Inbox::Priority { heap, .. } => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
