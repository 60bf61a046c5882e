//! # antnet-engine::experiment::report
//!
//! Turns a finished run into numbers: the per-run counters, per-delivery
//! latency and stretch samples (hops traversed over the shortest-path hop
//! count between the consumer and producer attachments), the monitor
//! time-series, and the cross-replicate per-name latency summary with
//! 95% confidence intervals.

use crate::experiment::Wiring;
use crate::sim::Simulation;
use antnet_types::name::Name;
use antnet_types::time::secs_from_sim;
use antnet_types::topology::Topology;
use fxhash::FxHashMap;
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The per-run counters of spec'd outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    /// Distinct contents delivered to consumers.
    pub retrieved: u64,
    /// Duplicate deliveries plus unsolicited Data dropped at nodes.
    pub wasted: u64,
    /// Data that arrived after its PIT entry expired.
    pub timeout: u64,
    /// Interests dropped for lack of a usable outgoing interface.
    pub interest_drop: u64,
    pub producer_unique_names_served: u64,
    /// Content Interests consumers issued.
    pub consumer_sent: u64,
    /// Probe packets dropped at links on an exhausted hop budget.
    pub ant_waste: u64,
    /// Content packets dropped at links on an exhausted hop budget.
    pub content_waste: u64,
}

/// One delivered content object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySample {
    pub consumer: String,
    pub name: Name,
    pub rtt_secs: f64,
    /// Hops traversed over shortest-path hops; `None` when the Data's
    /// creator is not a known producer.
    pub stretch: Option<f64>,
}

/// One monitor tick, reduced to totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorPoint {
    pub at_secs: f64,
    pub pat_entries: usize,
    pub pit_entries: usize,
}

/// Everything measured in one replicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub counters: RunCounters,
    pub latencies: Vec<LatencySample>,
    pub monitor: Vec<MonitorPoint>,
}

/// Per-name latency across replicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameLatency {
    pub name: Name,
    pub samples: usize,
    pub mean_secs: f64,
    /// Half-width of the 95% normal-approximation confidence interval.
    pub ci95_secs: f64,
}

/// The aggregated output of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub scenario: String,
    pub runs: Vec<RunReport>,
    pub latency_summary: Vec<NameLatency>,
}

/// Collects a finished replicate into a report.
pub fn collect(seed: u64, sim: &Simulation, wiring: &Wiring, topo: &Topology) -> RunReport {
    let world = &sim.world;
    let (ant_waste, content_waste) = world.link_waste();

    let mut counters = RunCounters {
        ant_waste,
        content_waste,
        ..RunCounters::default()
    };
    for node in &world.nodes {
        counters.wasted += node.stats.wasted;
        counters.timeout += node.stats.timeout;
        counters.interest_drop += node.stats.interest_drop;
    }
    for consumer in &world.consumers {
        counters.retrieved += consumer.received.len() as u64;
        counters.wasted += consumer.wasted;
        counters.consumer_sent += consumer.sent_interests;
    }
    for producer in &world.producers {
        counters.producer_unique_names_served += producer.served.len() as u64;
    }

    let oracle = HopOracle::new(topo, wiring, sim);
    let mut latencies = Vec::new();
    for (ci, consumer) in world.consumers.iter().enumerate() {
        for (name, rec) in &consumer.received {
            let hops = sim.config.default_ttl.saturating_sub(rec.remaining_ttl);
            latencies.push(LatencySample {
                consumer: consumer.name.clone(),
                name: name.clone(),
                rtt_secs: secs_from_sim(rec.rtt),
                stretch: oracle.stretch(ci, &rec.creator, hops),
            });
        }
    }

    let monitor = sim
        .monitor
        .samples
        .iter()
        .map(|s| MonitorPoint {
            at_secs: secs_from_sim(s.at),
            pat_entries: s.pat_sizes.iter().sum(),
            pit_entries: s.pit_depths.iter().sum(),
        })
        .collect();

    RunReport {
        seed,
        counters,
        latencies,
        monitor,
    }
}

/// Aggregates replicates: per-name mean RTT with a 95% CI.
pub fn summarize(scenario: &str, runs: Vec<RunReport>) -> ExperimentReport {
    let mut by_name: BTreeMap<Name, Vec<f64>> = BTreeMap::new();
    for run in &runs {
        for sample in &run.latencies {
            by_name.entry(sample.name.clone()).or_default().push(sample.rtt_secs);
        }
    }
    let latency_summary = by_name
        .into_iter()
        .map(|(name, rtts)| {
            let n = rtts.len();
            let mean = rtts.iter().sum::<f64>() / n as f64;
            let ci95 = if n > 1 {
                let var = rtts.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                1.96 * (var / n as f64).sqrt()
            } else {
                0.0
            };
            NameLatency {
                name,
                samples: n,
                mean_secs: mean,
                ci95_secs: ci95,
            }
        })
        .collect();

    ExperimentReport {
        scenario: scenario.to_string(),
        runs,
        latency_summary,
    }
}

/// Shortest-path hop counts between endpoint attachments, on the
/// undirected topology graph with consumers and producers as leaf nodes.
struct HopOracle {
    /// Per consumer: producer name → hop count.
    sp: Vec<FxHashMap<String, u32>>,
}

impl HopOracle {
    fn new(topo: &Topology, wiring: &Wiring, sim: &Simulation) -> Self {
        let mut graph: UnGraph<(), ()> = UnGraph::new_undirected();
        let vertex_nodes: Vec<NodeIndex> =
            topo.vertices.iter().map(|_| graph.add_node(())).collect();
        let mut undirected: BTreeSet<(usize, usize)> = BTreeSet::new();
        for arc in &topo.arcs {
            let key = (arc.src.min(arc.dst), arc.src.max(arc.dst));
            if undirected.insert(key) {
                graph.add_edge(vertex_nodes[key.0], vertex_nodes[key.1], ());
            }
        }

        let mut producer_nodes: Vec<(String, NodeIndex)> = Vec::new();
        for (pi, producer) in sim.world.producers.iter().enumerate() {
            let idx = graph.add_node(());
            graph.add_edge(idx, vertex_nodes[wiring.producer_vertex[pi]], ());
            producer_nodes.push((producer.name.clone(), idx));
        }

        let mut sp = Vec::new();
        for &vertex in &wiring.consumer_vertex {
            let consumer_node = graph.add_node(());
            graph.add_edge(consumer_node, vertex_nodes[vertex], ());
            let costs = dijkstra(&graph, consumer_node, None, |_| 1u32);
            let mut per_producer = FxHashMap::default();
            for (name, idx) in &producer_nodes {
                if let Some(&cost) = costs.get(idx) {
                    per_producer.insert(name.clone(), cost);
                }
            }
            sp.push(per_producer);
        }
        Self { sp }
    }

    fn stretch(&self, consumer: usize, creator: &str, hops: u32) -> Option<f64> {
        let sp = *self.sp.get(consumer)?.get(creator)?;
        if sp == 0 {
            return None;
        }
        Some(hops as f64 / sp as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_computes_mean_and_ci() {
        let runs = vec![
            RunReport {
                seed: 2,
                counters: RunCounters::default(),
                latencies: vec![LatencySample {
                    consumer: "C0".into(),
                    name: Name::new("a"),
                    rtt_secs: 1.0,
                    stretch: None,
                }],
                monitor: vec![],
            },
            RunReport {
                seed: 3,
                counters: RunCounters::default(),
                latencies: vec![LatencySample {
                    consumer: "C0".into(),
                    name: Name::new("a"),
                    rtt_secs: 3.0,
                    stretch: None,
                }],
                monitor: vec![],
            },
        ];
        let report = summarize("t", runs);
        assert_eq!(report.latency_summary.len(), 1);
        let lat = &report.latency_summary[0];
        assert_eq!(lat.samples, 2);
        assert!((lat.mean_secs - 2.0).abs() < 1e-9);
        // sd = sqrt(2), ci = 1.96 * sqrt(2)/sqrt(2) = 1.96
        assert!((lat.ci95_secs - 1.96).abs() < 1e-9);
    }

    #[test]
    fn single_sample_has_zero_ci() {
        let runs = vec![RunReport {
            seed: 2,
            counters: RunCounters::default(),
            latencies: vec![LatencySample {
                consumer: "C0".into(),
                name: Name::new("a"),
                rtt_secs: 1.5,
                stretch: None,
            }],
            monitor: vec![],
        }];
        let report = summarize("t", runs);
        assert_eq!(report.latency_summary[0].ci95_secs, 0.0);
    }
}
