//! # antnet-engine::node::forward
//!
//! The stochastic interface selection at the core of ant routing. Exact
//! FIB matches draw by roulette over pheromone weights raised to an
//! exponent (ants explore with 1.5, content exploits with 2); partial
//! prefix matches sum weights across every matching entry with exponent
//! 1; with no match at all the draw is uniform. Callers can exclude
//! interfaces (the incoming link, or every link a duplicate Interest has
//! already used); the draw renormalizes over what remains.

use super::tables::FibEntry;
use super::Node;
use crate::sim::EngineCtx;
use antnet_types::id::LinkId;
use antnet_types::name::Name;
use antnet_types::packet::Packet;
use indexmap::IndexMap;
use rand::Rng;

impl Node {
    /// The FIB entries sharing the longest matching prefix with `name`,
    /// walking from the full name down by stripping `/`-separated
    /// suffixes until a non-empty match exists.
    pub fn domain_matching(&self, name: &Name) -> Vec<&FibEntry> {
        for prefix in name.ancestors() {
            let hits: Vec<&FibEntry> = self
                .fib
                .table
                .values()
                .filter(|entry| entry.name.has_prefix(prefix))
                .collect();
            if !hits.is_empty() {
                return hits;
            }
        }
        Vec::new()
    }

    /// Per-interface pheromone sums across all partially matching FIB
    /// entries, initialized to 0 for every interface of the node.
    fn domain_weights(&self, matches: &[&FibEntry]) -> IndexMap<LinkId, f64> {
        let mut sums: IndexMap<LinkId, f64> =
            self.interfaces.iter().map(|&l| (l, 0.0)).collect();
        for entry in matches {
            for (&link, &w) in &entry.weights {
                *sums.entry(link).or_insert(0.0) += w;
            }
        }
        sums
    }

    /// Draws one outgoing interface for `pkt`, never returning a link in
    /// `exclude`. Returns `None` only when every interface is excluded.
    pub fn forward_engine(
        &self,
        ctx: &mut EngineCtx<'_>,
        pkt: &Packet,
        exclude: &[LinkId],
    ) -> Option<LinkId> {
        let (candidates, pwr): (Vec<(LinkId, f64)>, f64) =
            if let Some(entry) = self.fib.table.get(&pkt.name) {
                let pwr = if pkt.ant { 1.5 } else { 2.0 };
                let cands = entry
                    .weights
                    .iter()
                    .filter(|(l, _)| !exclude.contains(l))
                    .map(|(&l, &w)| (l, w))
                    .collect();
                (cands, pwr)
            } else {
                let matches = self.domain_matching(&pkt.name);
                if matches.is_empty() {
                    return self.uniform_pick(ctx, exclude);
                }
                let sums = self.domain_weights(&matches);
                let cands = sums
                    .iter()
                    .filter(|(l, _)| !exclude.contains(l))
                    .map(|(&l, &w)| (l, w))
                    .collect();
                (cands, 1.0)
            };

        if candidates.is_empty() {
            return None;
        }
        match roulette(ctx, &candidates, pwr) {
            Some(link) => Some(link),
            // All remaining weight is zero (a partial match whose mass sits
            // entirely on excluded interfaces): fall back to uniform.
            None => {
                let idx = ctx.rng("node.forward.uniform").gen_range(0..candidates.len());
                Some(candidates[idx].0)
            }
        }
    }

    fn uniform_pick(&self, ctx: &mut EngineCtx<'_>, exclude: &[LinkId]) -> Option<LinkId> {
        let allowed: Vec<LinkId> = self
            .interfaces
            .iter()
            .copied()
            .filter(|l| !exclude.contains(l))
            .collect();
        if allowed.is_empty() {
            return None;
        }
        let idx = ctx.rng("node.forward.uniform").gen_range(0..allowed.len());
        Some(allowed[idx])
    }
}

/// Roulette selection over `w^pwr`: draw `r ~ U(0, Σ wᵢ^pwr)` and walk the
/// wheel subtracting until it dips below zero. `None` when the wheel has
/// no mass.
fn roulette(
    ctx: &mut EngineCtx<'_>,
    candidates: &[(LinkId, f64)],
    pwr: f64,
) -> Option<LinkId> {
    let total: f64 = candidates.iter().map(|(_, w)| w.powf(pwr)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut r = ctx.rng("node.forward.roulette").gen_range(0.0..total);
    for &(link, w) in candidates {
        let slice = w.powf(pwr);
        if r < slice {
            return Some(link);
        }
        r -= slice;
    }
    // Floating-point edge: r landed on the top boundary.
    candidates.last().map(|&(link, _)| link)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{harness, probe, content};
    use antnet_types::name::Name;

    #[test]
    fn exact_match_prefers_the_heavy_link() {
        let (mut node, mut parts) = harness(3);
        node.fib.reinforce(&Name::new("a/b"), 1, &node.interfaces.clone(), 50.0);
        let pkt = content("a/b");
        let mut heavy = 0;
        for _ in 0..50 {
            let mut ctx = parts.ctx();
            if node.forward_engine(&mut ctx, &pkt, &[]) == Some(1) {
                heavy += 1;
            }
        }
        // With weights {51, 1, 1} and exponent 2 the heavy link should win
        // essentially every draw.
        assert!(heavy >= 48, "heavy link chosen only {} of 50 times", heavy);
    }

    #[test]
    fn excluded_links_are_never_drawn() {
        let (mut node, mut parts) = harness(3);
        node.fib.reinforce(&Name::new("a"), 0, &node.interfaces.clone(), 10.0);
        let pkt = content("a");
        for _ in 0..50 {
            let mut ctx = parts.ctx();
            let out = node.forward_engine(&mut ctx, &pkt, &[0]).unwrap();
            assert_ne!(out, 0);
        }
    }

    #[test]
    fn no_match_draws_uniformly_over_interfaces() {
        let (node, mut parts) = harness(3);
        let pkt = probe("zzz");
        let mut seen = [false; 3];
        for _ in 0..100 {
            let mut ctx = parts.ctx();
            let out = node.forward_engine(&mut ctx, &pkt, &[]).unwrap();
            seen[out as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn partial_match_reaches_prefix_entries() {
        let (mut node, mut parts) = harness(2);
        // Entry for the bare area; requests for area/video should hit it.
        node.fib.reinforce(&Name::new("Trondheim"), 1, &node.interfaces.clone(), 30.0);
        let pkt = content("Trondheim/video");
        let mut toward = 0;
        for _ in 0..50 {
            let mut ctx = parts.ctx();
            if node.forward_engine(&mut ctx, &pkt, &[]) == Some(1) {
                toward += 1;
            }
        }
        assert!(toward >= 40, "prefix gradient followed only {} of 50 times", toward);
    }

    #[test]
    fn fully_excluded_node_yields_none() {
        let (node, mut parts) = harness(1);
        let pkt = content("a");
        let mut ctx = parts.ctx();
        assert_eq!(node.forward_engine(&mut ctx, &pkt, &[0]), None);
    }
}
