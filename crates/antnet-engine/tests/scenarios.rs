//! End-to-end scenarios driving the full engine: small topologies, seeded
//! runs, and assertions on deliveries, table state, waste accounting, and
//! replay determinism.

use antnet_engine::experiment::report;
use antnet_engine::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

const SEED: u64 = 2;

fn base_config() -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.pheromone_increment = 1.5;
    cfg
}

fn consumer(name: &str, attach: &str, request: &str) -> ConsumerSpec {
    ConsumerSpec {
        name: Some(name.to_string()),
        attach: AttachSpec::Vertex(attach.to_string()),
        start_delay: 0.0,
        requests: vec![RequestSpec {
            name: request.to_string(),
            extra_delay: 0.0,
        }],
    }
}

fn producer(name: &str, attach: &str, contents: &[(&str, bool)]) -> ProducerSpec {
    ProducerSpec {
        name: name.to_string(),
        area: "lab".to_string(),
        attach: attach.to_string(),
        contents: contents
            .iter()
            .map(|(n, chunked)| ContentSpec {
                name: n.to_string(),
                chunked: *chunked,
            })
            .collect(),
    }
}

fn scenario(
    name: &str,
    config: SimConfig,
    topology: TopologySpec,
    producers: Vec<ProducerSpec>,
    consumers: Vec<ConsumerSpec>,
    stop_at: f64,
) -> Scenario {
    Scenario {
        name: name.to_string(),
        seed: Some(SEED),
        replicates: 1,
        stop_at,
        config,
        topology: TopologySource::Builder(topology),
        producers,
        consumers,
    }
}

/// Which of a node's interfaces leads to the given kind of endpoint.
fn iface_toward(sim: &Simulation, node: &Node, pred: impl Fn(Endpoint) -> bool) -> LinkId {
    node.interfaces
        .iter()
        .copied()
        .find(|&l| {
            let peer = sim.world.links[l as usize].peer;
            pred(sim.world.links[peer as usize].owner)
        })
        .expect("no interface toward that endpoint")
}

#[test]
fn linear_retrieval_reinforces_the_producer_side() {
    let sc = scenario(
        "linear",
        base_config(),
        TopologySpec::Line { nodes: 1, area: "lab".into(), rate_bps: 1e8 },
        vec![producer("P01", "N1", &[("video", false), ("audio", false)])],
        vec![consumer("C0", "N1", "lab/video")],
        30.0,
    );
    let exp = Experiment::new(sc).unwrap();
    let (mut sim, _) = exp.build(SEED).unwrap();
    sim.run_until(sim_from_secs(30.0));

    let c = &sim.world.consumers[0];
    assert_eq!(c.received.len(), 1, "exactly one Data with payload");
    let rec = c.received.get(&Name::new("lab/video")).unwrap();
    assert!(rec.rtt > 0);
    assert!(matches!(rec.payload, Payload::Chunk(_)));
    assert!(rec.remaining_ttl >= 1, "no packet is delivered at ttl 0");

    // The trail starts at the minting producer, ends at the consumer, and
    // is monotonically increasing in virtual time.
    assert_eq!(rec.trail.first().unwrap().node, "P01");
    assert_eq!(rec.trail.last().unwrap().node, "C0");
    assert!(rec.trail.windows(2).all(|w| w[0].at <= w[1].at));

    let node = &sim.world.nodes[0];
    let entry = &node.fib.table[&Name::new("lab/video")];
    let to_producer = iface_toward(&sim, node, |e| matches!(e, Endpoint::Producer(_)));
    let to_consumer = iface_toward(&sim, node, |e| matches!(e, Endpoint::Consumer(_)));
    assert!(
        entry.weights[&to_producer] > entry.weights[&to_consumer],
        "pheromone must accumulate on the producer side"
    );
    // Every weight obeys the floor invariant.
    for entry in sim.world.nodes[0].fib.table.values() {
        for &w in entry.weights.values() {
            assert!(w >= 1.0);
        }
    }
}

#[test]
fn diamond_delivers_once_over_either_branch() {
    let mut cfg = base_config();
    cfg.ant_burst_size = 10;
    let topo = TopologySpec::FromArcs {
        vertices: ["N1", "N2", "N3", "N4"]
            .iter()
            .map(|n| VertexSpec { name: n.to_string(), area: "lab".into() })
            .collect(),
        arcs: vec![
            ArcSpec { src: "N1".into(), dst: "N2".into(), rate_bps: 1e8 },
            ArcSpec { src: "N1".into(), dst: "N3".into(), rate_bps: 1e8 },
            ArcSpec { src: "N2".into(), dst: "N4".into(), rate_bps: 1e8 },
            ArcSpec { src: "N3".into(), dst: "N4".into(), rate_bps: 1e8 },
        ],
    };
    let sc = scenario(
        "diamond",
        cfg,
        topo,
        vec![producer("P01", "N4", &[("video", false)])],
        vec![consumer("C0", "N1", "lab/video")],
        30.0,
    );
    let exp = Experiment::new(sc).unwrap();
    let (mut sim, _) = exp.build(SEED).unwrap();
    sim.run_until(sim_from_secs(30.0));

    let c = &sim.world.consumers[0];
    assert_eq!(c.received.len(), 1);
    let rec = c.received.get(&Name::new("lab/video")).unwrap();
    // Two fabric hops per direction plus the endpoint stubs.
    assert!(rec.rtt >= 2 * transmission_delay(1500, 1e8));
    assert_eq!(sim.config.default_ttl - rec.remaining_ttl, 4);

    let name = Name::new("lab/video");
    let n1 = &sim.world.nodes[0];
    assert!(n1.fib.table.contains_key(&name));
    let branch_reinforced = sim.world.nodes[1].fib.table.contains_key(&name)
        || sim.world.nodes[2].fib.table.contains_key(&name);
    assert!(branch_reinforced, "the Data path must reinforce a branch node");
}

#[test]
fn shared_last_hop_aggregates_in_the_pit() {
    let sc = scenario(
        "shared-hop",
        base_config(),
        TopologySpec::Line { nodes: 1, area: "lab".into(), rate_bps: 1e8 },
        vec![producer("P01", "N1", &[("video", false)])],
        vec![
            consumer("C1", "N1", "lab/video"),
            consumer("C2", "N1", "lab/video"),
        ],
        30.0,
    );
    let exp = Experiment::new(sc).unwrap();
    let (mut sim, wiring) = exp.build(SEED).unwrap();
    sim.run_until(sim_from_secs(30.0));

    for c in &sim.world.consumers {
        assert_eq!(c.received.len(), 1, "{} must receive exactly one Data", c.name);
        assert_eq!(c.wasted, 0, "{} must see no duplicates", c.name);
    }

    // Both pending Interests shared one PIT entry, emptied on Data return.
    let node = &sim.world.nodes[0];
    assert!(node.served.iter().any(|s| s.name == Name::new("lab/video") && s.fanout == 2));
    assert!(!node.pit.table.contains_key(&Name::new("lab/video")));

    let rep = report::collect(SEED, &sim, &wiring, &exp.topology);
    assert_eq!(rep.counters.retrieved, 2);
    assert_eq!(rep.counters.producer_unique_names_served, 1);
}

#[test]
fn chunked_retrieval_completes_the_manifest() {
    let sc = scenario(
        "chunked",
        base_config(),
        TopologySpec::Line { nodes: 1, area: "lab".into(), rate_bps: 1e8 },
        vec![producer("P01", "N1", &[("video", true)])],
        vec![consumer("C0", "N1", "lab/video")],
        90.0,
    );
    let exp = Experiment::new(sc).unwrap();
    let (mut sim, _) = exp.build(SEED).unwrap();
    sim.run_until(sim_from_secs(90.0));

    let c = &sim.world.consumers[0];
    assert_eq!(c.received.len(), 11, "manifest plus ten chunks");
    match &c.received.get(&Name::new("lab/video")).unwrap().payload {
        Payload::Manifest(chunks) => {
            assert_eq!(chunks.len(), 10);
            for chunk in chunks {
                assert!(
                    matches!(&c.received.get(chunk).unwrap().payload, Payload::Chunk(_)),
                    "chunk {} must arrive with its bytes",
                    chunk
                );
            }
        }
        other => panic!("expected a manifest, got {:?}", other),
    }
}

#[test]
fn flood_wastes_more_than_ant_routing() {
    let topo = || TopologySpec::FromArcs {
        vertices: ["N1", "N2", "N3", "N4", "N5"]
            .iter()
            .map(|n| VertexSpec { name: n.to_string(), area: "lab".into() })
            .collect(),
        arcs: vec![
            ArcSpec { src: "N1".into(), dst: "N2".into(), rate_bps: 1e8 },
            ArcSpec { src: "N2".into(), dst: "N3".into(), rate_bps: 1e8 },
            ArcSpec { src: "N3".into(), dst: "N4".into(), rate_bps: 1e8 },
            ArcSpec { src: "N4".into(), dst: "N5".into(), rate_bps: 1e8 },
            ArcSpec { src: "N5".into(), dst: "N1".into(), rate_bps: 1e8 },
            ArcSpec { src: "N1".into(), dst: "N3".into(), rate_bps: 1e8 },
            ArcSpec { src: "N2".into(), dst: "N5".into(), rate_bps: 1e8 },
            ArcSpec { src: "N2".into(), dst: "N4".into(), rate_bps: 1e8 },
        ],
    };
    let producers = || vec![producer("P01", "N1", &[("v1", false), ("v2", false), ("v3", false)])];
    let consumers = || {
        vec![
            consumer("C0", "N3", "lab/v1"),
            consumer("C1", "N4", "lab/v2"),
            consumer("C2", "N5", "lab/v3"),
        ]
    };

    let mut ant_cfg = base_config();
    ant_cfg.ant_burst_size = 5;
    let ant = Experiment::new(scenario("ant", ant_cfg, topo(), producers(), consumers(), 60.0))
        .unwrap()
        .run_replicate(SEED)
        .unwrap();

    let mut flood_cfg = base_config();
    flood_cfg.mode = ForwardingMode::Flood;
    let flood = Experiment::new(scenario("flood", flood_cfg, topo(), producers(), consumers(), 60.0))
        .unwrap()
        .run_replicate(SEED)
        .unwrap();

    assert!(ant.counters.retrieved > 0);
    assert!(flood.counters.retrieved > 0);
    assert!(
        flood.counters.wasted > ant.counters.wasted,
        "flooding ({} wasted) must out-waste ant routing ({} wasted)",
        flood.counters.wasted,
        ant.counters.wasted
    );

    // Delivered content never beats the shortest path.
    for sample in &ant.latencies {
        let stretch = sample.stretch.expect("creator is a known producer");
        assert!(stretch >= 1.0 - 1e-9, "stretch {} below 1 for {}", stretch, sample.name);
    }
}

#[test]
fn exhausted_ttl_drops_every_interest_in_a_link() {
    let mut cfg = base_config();
    cfg.mode = ForwardingMode::Flood;
    cfg.default_ttl = 2;
    let sc = scenario(
        "short-ttl",
        cfg,
        TopologySpec::Line { nodes: 4, area: "lab".into(), rate_bps: 1e8 },
        vec![producer("P01", "N4", &[("video", false)])],
        vec![consumer("C0", "N1", "lab/video")],
        30.0,
    );
    let exp = Experiment::new(sc).unwrap();
    let rep = exp.run_replicate(SEED).unwrap();

    assert_eq!(rep.counters.retrieved, 0);
    assert_eq!(rep.counters.consumer_sent, 1);
    assert_eq!(
        rep.counters.ant_waste + rep.counters.content_waste,
        rep.counters.consumer_sent,
        "every Interest must die in a link"
    );
}

#[test]
fn same_seed_replays_identically() {
    let sc = scenario(
        "replay",
        base_config(),
        TopologySpec::Line { nodes: 2, area: "lab".into(), rate_bps: 1e8 },
        vec![producer("P01", "N2", &[("video", false)])],
        vec![consumer("C0", "N1", "lab/video")],
        20.0,
    );
    let exp = Experiment::new(sc).unwrap();

    let run = || {
        let (mut sim, wiring) = exp.build(SEED).unwrap();
        let records = Rc::new(RefCell::new(Vec::new()));
        let sink = records.clone();
        sim.set_trace(Box::new(move |r| sink.borrow_mut().push(r.clone())));
        sim.run_until(sim_from_secs(20.0));
        let rep = report::collect(SEED, &sim, &wiring, &exp.topology);
        let trace = records.borrow().clone();
        (rep, trace)
    };

    let (report_a, trace_a) = run();
    let (report_b, trace_b) = run();
    assert_eq!(report_a, report_b, "counters and samples must replay identically");
    assert_eq!(trace_a, trace_b, "the event sequence must replay identically");
    assert!(!trace_a.is_empty());
}

#[test]
fn distinct_seeds_diverge() {
    let sc = scenario(
        "seeds",
        base_config(),
        TopologySpec::Line { nodes: 2, area: "lab".into(), rate_bps: 1e8 },
        vec![producer("P01", "N2", &[("video", false)])],
        vec![consumer("C0", "N1", "lab/video")],
        20.0,
    );
    let exp = Experiment::new(sc).unwrap();
    let a = exp.run_replicate(2).unwrap();
    let b = exp.run_replicate(3).unwrap();
    // Both deliver, but the sampled RTTs differ with the packet sizes.
    assert_eq!(a.counters.retrieved, 1);
    assert_eq!(b.counters.retrieved, 1);
    assert_ne!(a.latencies[0].rtt_secs, b.latencies[0].rtt_secs);
}
