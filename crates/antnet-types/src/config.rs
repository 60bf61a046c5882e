//! # antnet-types::config
//!
//! Strongly-typed simulation configuration, parsed by `serde` from the
//! scenario file. Defaults follow the reference parameterization: slow
//! evaporation, generous table lifetimes, priority inboxes.

use serde::{Deserialize, Serialize};

/// The forwarding strategy every node in a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardingMode {
    /// Pheromone-weighted stochastic forwarding seeded by ant probes.
    Ant,
    /// Duplicate every new Interest onto all interfaces but the incoming one.
    Flood,
}

/// Queueing discipline of link inboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueDiscipline {
    /// Strict arrival order.
    Fifo,
    /// Data overtakes Interest; within a mode, lower packet id first.
    Priority,
}

/// All tunables the core recognizes. Scenario files may override any
/// subset; everything else takes the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub mode: ForwardingMode,
    /// FIB weight decrement per evaporation tick, in (0, 1).
    pub evaporation_rate: f64,
    /// Added to a link's pheromone weight on each Data arrival.
    pub pheromone_increment: f64,
    /// Initial hop budget of consumer-issued packets.
    pub default_ttl: u32,
    /// Lifetimes of table entries, in evaporation ticks.
    pub pat_timeout: u32,
    pub pit_timeout: u32,
    pub cs_timeout: u32,
    /// Ants sent before a content Interest, and their spacing in seconds.
    pub ant_burst_size: u32,
    pub ant_burst_interval: f64,
    /// Ants sent before each chunk Interest of a manifest follow-up.
    pub chunk_burst_size: u32,
    /// Pacing between chunk Interests after the first few, in seconds.
    pub chunk_pacing: f64,
    pub link_queue_discipline: QueueDiscipline,
    /// Ant-mode area seeding at startup.
    pub prepare_enabled: bool,
    /// Whether a duplicate content Interest may be re-forwarded on an
    /// interface that has not carried this request yet (else it drops).
    pub duplicate_interest_retry: bool,
    /// Node monitor sampling period in seconds.
    pub monitor_interval: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: ForwardingMode::Ant,
            evaporation_rate: 0.05,
            pheromone_increment: 1.0,
            default_ttl: 100,
            pat_timeout: 1500,
            pit_timeout: 1500,
            cs_timeout: 1500,
            ant_burst_size: 20,
            ant_burst_interval: 0.1,
            chunk_burst_size: 10,
            chunk_pacing: 3.0,
            link_queue_discipline: QueueDiscipline::Priority,
            prepare_enabled: false,
            duplicate_interest_retry: true,
            monitor_interval: 0.2,
        }
    }
}

impl SimConfig {
    /// Sanity-checks ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.evaporation_rate > 0.0 && self.evaporation_rate < 1.0) {
            return Err(format!(
                "evaporation_rate must lie in (0, 1), got {}",
                self.evaporation_rate
            ));
        }
        if self.pheromone_increment <= 0.0 {
            return Err("pheromone_increment must be positive".to_string());
        }
        if self.default_ttl < 2 {
            return Err("default_ttl below 2 cannot cross a single link".to_string());
        }
        if self.ant_burst_interval <= 0.0 || self.monitor_interval <= 0.0 {
            return Err("intervals must be positive".to_string());
        }
        Ok(())
    }
}
