//! # antnet-engine::node::tables
//!
//! The four per-node tables of the forwarding engine: the FIB with its
//! pheromone weights, the PIT for outstanding content Interests, the PAT
//! for outstanding ant probes, and the CS cache. `IndexMap` keeps the
//! iteration order that feeds the roulette draw and Data fan-out stable
//! across replays.

use antnet_types::id::{LinkId, PacketId};
use antnet_types::name::Name;
use antnet_types::packet::Payload;
use fxhash::FxHashMap;
use indexmap::IndexMap;

/// One FIB entry: an outgoing-link → pheromone-weight table.
///
/// Invariant: every weight is at least 1, except transiently between the
/// evaporation decrement and the delete-empty check.
#[derive(Debug, Clone)]
pub struct FibEntry {
    pub name: Name,
    pub weights: IndexMap<LinkId, f64>,
}

impl FibEntry {
    /// A fresh entry gives every interface of the owning node the baseline
    /// weight of 1 and adds the increment to the link the first Data
    /// arrival came from.
    pub fn new(name: Name, incoming: LinkId, interfaces: &[LinkId], increment: f64) -> Self {
        let mut weights: IndexMap<LinkId, f64> =
            interfaces.iter().map(|&l| (l, 1.0)).collect();
        *weights.entry(incoming).or_insert(1.0) += increment;
        Self { name, weights }
    }
}

/// The Forwarding Information Base, keyed by content name.
#[derive(Debug, Default)]
pub struct Fib {
    pub table: IndexMap<Name, FibEntry>,
}

impl Fib {
    /// Adds the pheromone increment to `incoming`'s weight for `name`,
    /// creating the entry with baseline weights when absent.
    pub fn reinforce(
        &mut self,
        name: &Name,
        incoming: LinkId,
        interfaces: &[LinkId],
        increment: f64,
    ) {
        self.table
            .entry(name.clone())
            .and_modify(|entry| {
                *entry.weights.entry(incoming).or_insert(1.0) += increment;
            })
            .or_insert_with(|| FibEntry::new(name.clone(), incoming, interfaces, increment));
    }
}

/// One pending content Interest: the ids seen for the name, and each
/// incoming link with its remaining lifetime in evaporation ticks.
///
/// Invariant: while the entry lives, `ids` and `incoming` are non-empty;
/// Data for the name fans out to every incoming link.
#[derive(Debug, Clone)]
pub struct PitEntry {
    pub name: Name,
    pub ids: Vec<PacketId>,
    pub incoming: IndexMap<LinkId, u32>,
}

impl PitEntry {
    pub fn new(name: Name, id: PacketId, incoming: LinkId, lifetime: u32) -> Self {
        let mut links = IndexMap::new();
        links.insert(incoming, lifetime);
        Self {
            name,
            ids: vec![id],
            incoming: links,
        }
    }
}

/// The Pending Interest Table, keyed by content name.
#[derive(Debug, Default)]
pub struct Pit {
    pub table: IndexMap<Name, PitEntry>,
}

/// One pending ant probe: the first interface the id arrived on is the
/// pinned return path. Later arrivals of the same id never overwrite it.
#[derive(Debug, Clone)]
pub struct PatEntry {
    pub name: Name,
    pub first: LinkId,
    pub lifetime: u32,
}

/// The Pending Ant Table, keyed by probe packet id.
#[derive(Debug, Default)]
pub struct Pat {
    pub table: FxHashMap<PacketId, PatEntry>,
}

/// One cached Data object.
#[derive(Debug, Clone)]
pub struct CsEntry {
    pub payload: Option<Payload>,
    pub producer: String,
    pub lifetime: u32,
}

/// The Content Store, keyed by name. Every node also carries a permanent
/// self-entry keyed by its own area tag to advertise locality.
#[derive(Debug, Default)]
pub struct ContentStore {
    pub table: FxHashMap<Name, CsEntry>,
}
