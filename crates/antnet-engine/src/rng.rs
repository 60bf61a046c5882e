//! # antnet-engine::rng
//!
//! Discipline for using the master random number generator. All draws in
//! a run come from one seeded `ChaCha20Rng`; the `RngDiscipline` wrapper
//! associates every draw with a site label and records it, so two runs
//! can be audited draw-for-draw when chasing a replay divergence.

use antnet_types::time::{sim_from_secs, SimTime};
use rand::{Rng, RngCore};
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;

/// A wrapper around the master RNG that records every use.
pub struct RngDiscipline<'a> {
    rng: &'a mut ChaCha20Rng,
    recorder: &'a mut Recorder,
    site_label: &'static str,
}

impl<'a> RngDiscipline<'a> {
    pub fn new(
        rng: &'a mut ChaCha20Rng,
        recorder: &'a mut Recorder,
        site_label: &'static str,
    ) -> Self {
        Self {
            rng,
            recorder,
            site_label,
        }
    }
}

/// Delegate `RngCore` to the inner RNG, recording each call.
impl RngCore for RngDiscipline<'_> {
    fn next_u32(&mut self) -> u32 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.recorder.record_draw(self.site_label);
        self.rng.fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.recorder.record_draw(self.site_label);
        self.rng.try_fill_bytes(dest)
    }
}

/// Records the deterministic decisions made during a run.
pub struct Recorder {
    #[allow(dead_code)]
    seed: u64,
    rng_sites: BTreeMap<&'static str, u64>,
}

impl Recorder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng_sites: BTreeMap::new(),
        }
    }

    /// Records that a random number was drawn at a specific site.
    pub fn record_draw(&mut self, site_label: &'static str) {
        *self.rng_sites.entry(site_label).or_insert(0) += 1;
    }

    /// Total draws per site, for audit output.
    pub fn draws(&self) -> &BTreeMap<&'static str, u64> {
        &self.rng_sites
    }
}

/// Samples an exponentially distributed interval with the given mean, by
/// inverse transform. Used for the evaporation tick cadence.
pub fn exp_interval(mut rng: RngDiscipline<'_>, mean_secs: f64) -> SimTime {
    // Draw from (0, 1]; ln(0) would be -inf.
    let u: f64 = 1.0 - rng.gen::<f64>();
    sim_from_secs(-u.ln() * mean_secs)
}
