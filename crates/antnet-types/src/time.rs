//! # antnet-types::time
//!
//! Representation of virtual time. All simulation time is discrete and
//! measured in nanoseconds; one "time unit" of the network model (the unit
//! transmission delays and table lifetimes are quoted in) is one second.

/// The fundamental unit of time in the simulation, measured in nanoseconds.
/// A `u128` prevents overflow for any practical simulation duration.
pub type SimTime = u128;

/// The start of simulation time.
pub const SIM_EPOCH: SimTime = 0;

/// The maximum representable simulation time.
pub const MAX_SIM_TIME: SimTime = u128::MAX;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Converts whole milliseconds to `SimTime`.
pub fn sim_from_ms(ms: u64) -> SimTime {
    (ms as u128) * 1_000_000
}

/// Converts whole microseconds to `SimTime`.
pub fn sim_from_us(us: u64) -> SimTime {
    (us as u128) * 1_000
}

/// Converts fractional seconds (the unit used by scenario files and the
/// network model) to `SimTime`. Negative inputs clamp to zero.
pub fn sim_from_secs(secs: f64) -> SimTime {
    if secs <= 0.0 {
        return SIM_EPOCH;
    }
    (secs * NANOS_PER_SEC).round() as SimTime
}

/// Converts `SimTime` back to fractional seconds for reporting.
pub fn secs_from_sim(t: SimTime) -> f64 {
    t as f64 / NANOS_PER_SEC
}
