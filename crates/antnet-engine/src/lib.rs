//! # antnet-engine
//!
//! The core of the antnet simulator: the discrete-event loop, the world
//! state (forwarding nodes, links, consumers, producers), the pheromone
//! forwarding engine with its PAT/PIT/FIB/CS tables, the monitor, and the
//! experiment harness that wires scenarios into runs and aggregates
//! seeded replicates into reports.

pub mod consumer;
pub mod events;
pub mod experiment;
pub mod ids;
pub mod monitor;
pub mod net;
pub mod node;
pub mod prelude;
pub mod producer;
pub mod rng;
pub mod sim;
pub mod trace;
pub mod world;
