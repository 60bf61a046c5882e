//! # antnet-engine::experiment
//!
//! The experiment harness: resolves a scenario's topology, wires nodes,
//! links, consumers, and producers into a world, runs seeded replicates,
//! and aggregates their reports. All wiring randomness (attachment draws,
//! generated content payloads) comes from the same seeded stream the run
//! itself uses, so a (scenario, seed) pair is fully reproducible.

pub mod report;

use crate::{
    consumer::Consumer,
    net::Link,
    node::Node,
    producer::Producer,
    rng::{Recorder, RngDiscipline},
    sim::Simulation,
    world::{Endpoint, World},
};
use antnet_types::config::SimConfig;
use antnet_types::errors::{ConfigError, TopologyError};
use antnet_types::id::{ConsumerId, LinkId, NodeId, ProducerId};
use antnet_types::name::Name;
use antnet_types::pajek;
use antnet_types::scenario::{AttachSpec, Scenario, TopologySource};
use antnet_types::time::sim_from_secs;
use antnet_types::topology::Topology;
use fxhash::FxHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use self::report::{ExperimentReport, RunReport};

/// Rate of the stub links hanging consumers and producers off their
/// attachment nodes.
const ENDPOINT_LINK_RATE: f64 = 100_000_000.0;

/// Where each endpoint was attached, for the shortest-path oracle.
pub struct Wiring {
    pub consumer_vertex: Vec<usize>,
    pub producer_vertex: Vec<usize>,
}

/// A validated scenario with its topology resolved.
pub struct Experiment {
    pub scenario: Scenario,
    pub topology: Topology,
}

impl Experiment {
    pub fn new(scenario: Scenario) -> anyhow::Result<Self> {
        scenario.validate().map_err(|message| ConfigError::Validation {
            name: scenario.name.clone(),
            message,
        })?;
        let topology = match &scenario.topology {
            TopologySource::Pajek { path } => pajek::load(path)?,
            TopologySource::Builder(spec) => spec.build()?,
        };
        Ok(Self { scenario, topology })
    }

    /// Runs every replicate and aggregates the reports.
    pub fn run(&self) -> anyhow::Result<ExperimentReport> {
        let base_seed = self.scenario.seed.unwrap_or(2);
        let mut runs = Vec::with_capacity(self.scenario.replicates as usize);
        for replicate in 0..self.scenario.replicates {
            let seed = base_seed.wrapping_add(replicate as u64);
            tracing::info!(scenario = %self.scenario.name, seed, replicate, "starting replicate");
            runs.push(self.run_replicate(seed)?);
        }
        Ok(report::summarize(&self.scenario.name, runs))
    }

    /// Builds, runs, and reports one seeded replicate.
    pub fn run_replicate(&self, seed: u64) -> anyhow::Result<RunReport> {
        let (mut sim, wiring) = self.build(seed)?;
        sim.run_until(sim_from_secs(self.scenario.stop_at));
        Ok(report::collect(seed, &sim, &wiring, &self.topology))
    }

    /// Wires one replicate's world and schedules its requests. Exposed so
    /// tests can inspect the world after running.
    pub fn build(&self, seed: u64) -> anyhow::Result<(Simulation, Wiring)> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut recorder = Recorder::new(seed);
        let cfg = self.scenario.config.clone();
        let mut world = World::default();

        // Forwarding nodes, one per vertex.
        for (i, v) in self.topology.vertices.iter().enumerate() {
            world
                .nodes
                .push(Node::new(i as NodeId, v.name.clone(), v.area.clone()));
        }
        let mut areas = self.topology.areas();
        for p in &self.scenario.producers {
            if !areas.contains(&p.area) {
                areas.push(p.area.clone());
            }
        }
        for node in &mut world.nodes {
            node.areas = areas.clone();
        }

        // Directional links; both halves of a bidirectional pair must be
        // present in the arc list.
        let mut half: FxHashMap<(usize, usize), LinkId> = FxHashMap::default();
        for arc in &self.topology.arcs {
            if half.contains_key(&(arc.src, arc.dst)) {
                return Err(TopologyError::DuplicateInterface(arc.name.clone()).into());
            }
            let id = world.links.len() as LinkId;
            world.links.push(Link::new(
                id,
                arc.name.clone(),
                Endpoint::Node(arc.src as NodeId),
                arc.rate_bps,
                cfg.link_queue_discipline,
            ));
            if !world.nodes[arc.src].add_interface(id) {
                return Err(TopologyError::DuplicateInterface(arc.name.clone()).into());
            }
            half.insert((arc.src, arc.dst), id);
        }
        for arc in &self.topology.arcs {
            let lid = half[&(arc.src, arc.dst)];
            match half.get(&(arc.dst, arc.src)) {
                Some(&peer) => world.links[lid as usize].peer = peer,
                None => {
                    return Err(TopologyError::UnpairedArc(arc.name.clone()).into());
                }
            }
        }

        // Producers and their stub links.
        let mut producer_vertex = Vec::new();
        for (pi, spec) in self.scenario.producers.iter().enumerate() {
            let vertex = self
                .topology
                .vertex_index(&spec.attach)
                .ok_or_else(|| TopologyError::UnknownVertex(spec.attach.clone()))?;
            producer_vertex.push(vertex);
            let mut producer = Producer::new(pi as ProducerId, spec.name.clone(), spec.area.clone());
            for content in &spec.contents {
                producer.register(
                    RngDiscipline::new(&mut rng, &mut recorder, "producer.content"),
                    &content.name,
                    content.chunked,
                );
            }
            let (p_if, _) = attach_endpoint(
                &mut world,
                Endpoint::Producer(pi as ProducerId),
                &spec.name,
                vertex,
                &cfg,
            )?;
            producer.iface = p_if;
            world.producers.push(producer);
        }

        // Consumers and their stub links.
        let mut consumer_vertex = Vec::new();
        for (ci, spec) in self.scenario.consumers.iter().enumerate() {
            let vertex = match &spec.attach {
                AttachSpec::Vertex(name) => self
                    .topology
                    .vertex_index(name)
                    .ok_or_else(|| TopologyError::UnknownVertex(name.clone()))?,
                AttachSpec::Random => RngDiscipline::new(&mut rng, &mut recorder, "wiring.attach")
                    .gen_range(0..self.topology.vertices.len()),
            };
            consumer_vertex.push(vertex);
            let name = spec
                .name
                .clone()
                .unwrap_or_else(|| format!("C{}", ci));
            let mut consumer =
                Consumer::new(ci as ConsumerId, name, sim_from_secs(spec.start_delay));
            let (c_if, _) = attach_endpoint(
                &mut world,
                Endpoint::Consumer(ci as ConsumerId),
                &consumer.name.clone(),
                vertex,
                &cfg,
            )?;
            consumer.iface = c_if;
            world.consumers.push(consumer);
        }

        let mut sim = Simulation::from_parts(world, cfg, rng, recorder);
        sim.init();
        for (ci, spec) in self.scenario.consumers.iter().enumerate() {
            for req in &spec.requests {
                sim.spawn_request(
                    ci as ConsumerId,
                    Name::new(req.name.clone()),
                    sim_from_secs(req.extra_delay),
                );
            }
        }

        Ok((
            sim,
            Wiring {
                consumer_vertex,
                producer_vertex,
            },
        ))
    }
}

/// Creates the paired stub links hanging an endpoint off a node, mirrors
/// of each other, and registers the node-side half as a node interface.
fn attach_endpoint(
    world: &mut World,
    endpoint: Endpoint,
    endpoint_name: &str,
    vertex: usize,
    cfg: &SimConfig,
) -> Result<(LinkId, LinkId), TopologyError> {
    let node_name = world.nodes[vertex].name.clone();
    let e_id = world.links.len() as LinkId;
    world.links.push(Link::new(
        e_id,
        format!("{}-{}", endpoint_name, node_name),
        endpoint,
        ENDPOINT_LINK_RATE,
        cfg.link_queue_discipline,
    ));
    let n_id = world.links.len() as LinkId;
    world.links.push(Link::new(
        n_id,
        format!("{}-{}", node_name, endpoint_name),
        Endpoint::Node(vertex as NodeId),
        ENDPOINT_LINK_RATE,
        cfg.link_queue_discipline,
    ));
    world.links[e_id as usize].peer = n_id;
    world.links[n_id as usize].peer = e_id;
    if !world.nodes[vertex].add_interface(n_id) {
        return Err(TopologyError::DuplicateInterface(format!(
            "{}-{}",
            node_name, endpoint_name
        )));
    }
    Ok((e_id, n_id))
}
