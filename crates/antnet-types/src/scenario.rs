//! # antnet-types::scenario
//!
//! The Rust structs that map directly to the scenario files (YAML/TOML).
//! This is the authoritative schema for defining simulation experiments:
//! topology source, endpoint placement, request schedule, and the core
//! configuration knobs.

use crate::{config::SimConfig, topology::TopologySpec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The top-level structure of a scenario definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: Option<u64>,
    /// Independent seeded repetitions aggregated into the final report.
    #[serde(default = "default_replicates")]
    pub replicates: u32,
    /// Virtual seconds to run each replicate for.
    pub stop_at: f64,
    #[serde(default)]
    pub config: SimConfig,
    pub topology: TopologySource,
    pub producers: Vec<ProducerSpec>,
    pub consumers: Vec<ConsumerSpec>,
}

/// Where the topology comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TopologySource {
    /// A Pajek-format file on disk.
    Pajek { path: PathBuf },
    /// One of the declarative builders.
    Builder(TopologySpec),
}

/// A producer endpoint, attached to one topology vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerSpec {
    pub name: String,
    /// Content is registered under `area/content-name`.
    pub area: String,
    /// Vertex name to attach to.
    pub attach: String,
    pub contents: Vec<ContentSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSpec {
    pub name: String,
    /// Chunked content serves a manifest of chunk names; unchunked content
    /// serves its payload directly.
    #[serde(default)]
    pub chunked: bool,
}

/// A consumer endpoint and its request schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerSpec {
    /// Defaults to `C<index>` when omitted.
    pub name: Option<String>,
    #[serde(default)]
    pub attach: AttachSpec,
    /// Seconds to wait before the first request fires.
    #[serde(default)]
    pub start_delay: f64,
    pub requests: Vec<RequestSpec>,
}

/// Which vertex a consumer hangs off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AttachSpec {
    Vertex(String),
    /// A uniformly drawn vertex, re-drawn per replicate.
    #[default]
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Full content name, e.g. `Trondheim/video`.
    pub name: String,
    /// Extra delay on top of the consumer's start delay, in seconds.
    #[serde(default)]
    pub extra_delay: f64,
}

fn default_replicates() -> u32 {
    1
}

impl Scenario {
    /// Validates the scenario for logical consistency.
    pub fn validate(&self) -> Result<(), String> {
        self.config.validate()?;
        if self.replicates == 0 {
            return Err("replicates must be at least 1".to_string());
        }
        if self.stop_at <= 0.0 {
            return Err("stop_at must be a positive number of seconds".to_string());
        }
        if self.producers.is_empty() {
            return Err("a scenario needs at least one producer".to_string());
        }
        for p in &self.producers {
            if p.contents.is_empty() {
                return Err(format!("producer '{}' serves no contents", p.name));
            }
        }
        for (i, c) in self.consumers.iter().enumerate() {
            if c.requests.is_empty() {
                return Err(format!("consumer {} has no requests", i));
            }
            for r in &c.requests {
                if r.name.is_empty() {
                    return Err(format!("consumer {} has an empty request name", i));
                }
                if r.extra_delay < 0.0 || c.start_delay < 0.0 {
                    return Err(format!("consumer {} has a negative delay", i));
                }
            }
        }
        Ok(())
    }
}
