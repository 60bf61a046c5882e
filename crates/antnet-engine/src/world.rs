//! # antnet-engine::world
//!
//! The top-level container for the simulation's state. All entities live
//! in arenas indexed by their ids; links refer to peers and owners by
//! index, never by reference, so the cyclic node ↔ link structure of the
//! fabric needs no reference counting and tears down trivially.

use crate::{consumer::Consumer, net::Link, node::Node, producer::Producer};
use antnet_types::id::{ConsumerId, LinkId, NodeId, ProducerId};

/// The kind and arena index of a packet-handling endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Node(NodeId),
    Consumer(ConsumerId),
    Producer(ProducerId),
}

/// Every node, link, consumer, and producer in a run.
#[derive(Default)]
pub struct World {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub consumers: Vec<Consumer>,
    pub producers: Vec<Producer>,
}

impl World {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id as usize]
    }

    /// Total link-level waste, split into probe and content buckets.
    pub fn link_waste(&self) -> (u64, u64) {
        self.links
            .iter()
            .fold((0, 0), |(a, c), l| (a + l.ant_waste, c + l.content_waste))
    }
}
