//! # antnet-engine::prelude
//!
//! Re-exports of the most commonly used types from the engine and its
//! `antnet-types` dependency, to simplify imports in the CLI and in tests.

pub use crate::{
    consumer::Consumer,
    events::{Event, EventDiscriminant, Queued},
    experiment::{report::ExperimentReport, report::RunReport, Experiment},
    monitor::NodeMonitor,
    net::{transmission_delay, Link},
    node::Node,
    producer::Producer,
    sim::Simulation,
    trace::TraceRecord,
    world::{Endpoint, World},
};

pub use antnet_types::{
    self, config::*, errors::*, id::*, metrics::*, name::Name, packet::*, scenario::*, time::*,
    topology::*,
};
