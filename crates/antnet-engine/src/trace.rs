//! # antnet-engine::trace
//!
//! The event-level observability seam. Just before each event is
//! dispatched, the simulation invokes the installed hook with the event's
//! time, queue discriminant, insertion sequence, and a compact summary.
//! This is the only place event-level recording happens; the experiment
//! harness installs a recorder here, and the replay test compares two
//! runs' records verbatim.

use crate::events::{Event, EventDiscriminant};
use antnet_types::time::SimTime;

/// One traced event, captured before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub at: SimTime,
    pub prio: EventDiscriminant,
    pub seq: u64,
    pub label: &'static str,
    pub subject: u32,
}

impl TraceRecord {
    pub fn of(at: SimTime, prio: EventDiscriminant, seq: u64, event: &Event) -> Self {
        Self {
            at,
            prio,
            seq,
            label: event.label(),
            subject: event.subject(),
        }
    }
}

/// The hook signature. Installed with [`crate::sim::Simulation::set_trace`].
pub type TraceHook = Box<dyn FnMut(&TraceRecord)>;
