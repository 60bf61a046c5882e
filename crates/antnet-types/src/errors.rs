//! # antnet-types::errors
//!
//! Common error types for the antnet workspace. `thiserror` keeps the
//! variants descriptive; every variant has a deterministic `Debug` form so
//! failures reproduce bit-identically under a fixed seed.

use crate::time::SimTime;
use thiserror::Error;

/// A general-purpose error for the simulation engine.
#[derive(Error, Debug, Clone)]
pub enum SimError {
    #[error("simulation time overflow: {base} + {offset}")]
    TimeOverflow { base: SimTime, offset: SimTime },
    #[error("monotonic id counter overflowed")]
    IdOverflow,
    #[error("node with id {0} not found")]
    NodeNotFound(u32),
    #[error("link with id {0} not found")]
    LinkNotFound(u32),
}

/// An error parsing or validating a scenario file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("i/o error reading scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("validation error in scenario '{name}': {message}")]
    Validation { name: String, message: String },
    #[error("unsupported scenario file extension: {0}")]
    UnknownExtension(String),
}

/// An error reading or wiring a topology.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("i/o error reading topology file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed topology at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("arc references unknown vertex '{0}'")]
    UnknownVertex(String),
    #[error("interface '{0}' registered twice on the same endpoint")]
    DuplicateInterface(String),
    #[error("arc '{0}' has no reverse direction to pair with")]
    UnpairedArc(String),
}
