//! # antnet-engine::monitor
//!
//! Periodic sampler of every node's table state. Each tick records the
//! virtual time, per-node PAT sizes, summed PIT incoming counts, CS key
//! lists, and per-link per-name FIB weights, producing the time-series
//! the experiment reports are built from.

use crate::node::Node;
use antnet_types::id::LinkId;
use antnet_types::name::Name;
use antnet_types::time::SimTime;

/// One tick of the monitor.
#[derive(Debug, Clone)]
pub struct MonitorSample {
    pub at: SimTime,
    /// PAT entry count per node.
    pub pat_sizes: Vec<usize>,
    /// Summed PIT incoming-link counts per node.
    pub pit_depths: Vec<usize>,
    /// CS keys per node.
    pub cs_keys: Vec<Vec<Name>>,
    /// Flattened (name, link, weight) FIB triples per node.
    pub fib_weights: Vec<Vec<(Name, LinkId, f64)>>,
}

/// Collects samples over a run.
#[derive(Default)]
pub struct NodeMonitor {
    pub samples: Vec<MonitorSample>,
}

impl NodeMonitor {
    pub fn sample(&mut self, at: SimTime, nodes: &[Node]) {
        let mut sample = MonitorSample {
            at,
            pat_sizes: Vec::with_capacity(nodes.len()),
            pit_depths: Vec::with_capacity(nodes.len()),
            cs_keys: Vec::with_capacity(nodes.len()),
            fib_weights: Vec::with_capacity(nodes.len()),
        };
        for node in nodes {
            sample.pat_sizes.push(node.pat.table.len());
            sample
                .pit_depths
                .push(node.pit.table.values().map(|e| e.incoming.len()).sum());
            sample.cs_keys.push(node.cs.table.keys().cloned().collect());
            let mut weights = Vec::new();
            for entry in node.fib.table.values() {
                for (&link, &w) in &entry.weights {
                    weights.push((entry.name.clone(), link, w));
                }
            }
            sample.fib_weights.push(weights);
        }
        self.samples.push(sample);
    }
}
