//! # antnet-engine::consumer
//!
//! Consumers issue requests and record what comes back. A request is a
//! plan, a queue of delay/send steps the scheduler resumes one wake at a
//! time, so the burst-then-interest shape of ant-mode requests and the
//! chunk follow-up pipeline both run without a coroutine in sight. One
//! plan per concurrent request; a manifest arrival spawns the chunk plan
//! as a fresh task.

use crate::events::{Event, EventDiscriminant};
use crate::sim::EngineCtx;
use antnet_types::config::{ForwardingMode, SimConfig};
use antnet_types::id::{ConsumerId, LinkId};
use antnet_types::metrics::{LBL_NODE, MET_CONTENT_RETRIEVED};
use antnet_types::name::Name;
use antnet_types::packet::{Packet, PacketMode, Payload, TrailHop};
use antnet_types::time::{sim_from_secs, SimTime};
use indexmap::IndexMap;
use rand::Rng;
use std::collections::VecDeque;

/// One step of a request plan.
#[derive(Debug, Clone)]
pub enum PlanStep {
    Delay(SimTime),
    SendProbe(Name),
    SendInterest(Name),
}

/// A delivered content object, as the consumer saw it.
#[derive(Debug, Clone)]
pub struct ReceivedContent {
    pub rtt: SimTime,
    pub at: SimTime,
    /// Hop budget left on arrival; feeds the stretch metric.
    pub remaining_ttl: u32,
    pub creator: String,
    pub trail: Vec<TrailHop>,
    pub payload: Payload,
}

pub struct Consumer {
    pub id: ConsumerId,
    pub name: String,
    /// The consumer's single interface into the fabric.
    pub iface: LinkId,
    pub start_delay: SimTime,
    tasks: Vec<VecDeque<PlanStep>>,
    /// First delivery per name, in arrival order.
    pub received: IndexMap<Name, ReceivedContent>,
    /// Duplicate deliveries.
    pub wasted: u64,
    pub sent_interests: u64,
    pub probes_sent: u64,
}

impl Consumer {
    pub fn new(id: ConsumerId, name: impl Into<String>, start_delay: SimTime) -> Self {
        Self {
            id,
            name: name.into(),
            iface: LinkId::MAX, // set during wiring
            start_delay,
            tasks: Vec::new(),
            received: IndexMap::new(),
            wasted: 0,
            sent_interests: 0,
            probes_sent: 0,
        }
    }

    /// Registers a plan and returns its task index for the wake events.
    pub fn spawn_task(&mut self, steps: VecDeque<PlanStep>) -> usize {
        self.tasks.push(steps);
        self.tasks.len() - 1
    }

    /// Resumes one plan: sends until the next delay step (which schedules
    /// the following wake) or until the plan is exhausted.
    pub fn wake(&mut self, ctx: &mut EngineCtx<'_>, task: usize) {
        loop {
            let step = match self.tasks[task].pop_front() {
                Some(step) => step,
                None => return,
            };
            match step {
                PlanStep::Delay(d) => {
                    ctx.sched.schedule_in(
                        d,
                        Event::ConsumerWake {
                            consumer: self.id,
                            task,
                        },
                        EventDiscriminant::wake(self.id),
                    );
                    return;
                }
                PlanStep::SendProbe(name) => {
                    let size = ctx.rng("consumer.probe_size").gen_range(50..=100);
                    self.send(ctx, name, size, true);
                }
                PlanStep::SendInterest(name) => {
                    let size = ctx.rng("consumer.interest_size").gen_range(1500..=2000);
                    self.send(ctx, name, size, false);
                }
            }
        }
    }

    fn send(&mut self, ctx: &mut EngineCtx<'_>, name: Name, size: u32, ant: bool) {
        let id = ctx.sched.id_gen.next_packet_id();
        let pkt = Packet::interest(
            self.name.clone(),
            ctx.sched.now(),
            size,
            name,
            ctx.config.default_ttl,
            id,
            ant,
        );
        if ant {
            self.probes_sent += 1;
        } else {
            self.sent_interests += 1;
        }
        ctx.links[self.iface as usize].enqueue(pkt, ctx.sched);
    }

    /// Handles a delivery from the fabric.
    pub fn on_packet(&mut self, ctx: &mut EngineCtx<'_>, incoming: LinkId, mut pkt: Packet) {
        if pkt.mode == PacketMode::Interest {
            // A boomerang: the stochastic engine sent an Interest our way.
            // Re-send it on the same interface and let the fabric retry.
            ctx.links[incoming as usize].enqueue(pkt, ctx.sched);
            return;
        }
        let payload = match pkt.payload.take() {
            Some(p) => p,
            // A returning probe; its work (reinforcement) is already done.
            None => return,
        };
        let now = ctx.sched.now();
        pkt.trail.push(TrailHop {
            node: self.name.clone(),
            at: now,
        });
        if self.received.contains_key(&pkt.name) {
            self.wasted += 1;
            return;
        }
        ::metrics::counter!(MET_CONTENT_RETRIEVED, LBL_NODE => self.name.clone()).increment(1);
        if let Payload::Manifest(chunks) = &payload {
            // First Data of a multi-chunk object: fetch the pieces.
            let steps = chunk_plan(ctx.config, chunks);
            let task = self.spawn_task(steps);
            ctx.sched.schedule_in(
                0,
                Event::ConsumerWake {
                    consumer: self.id,
                    task,
                },
                EventDiscriminant::wake(self.id),
            );
        }
        self.received.insert(
            pkt.name.clone(),
            ReceivedContent {
                rtt: now - pkt.birth,
                at: now,
                remaining_ttl: pkt.ttl,
                creator: pkt.creator.clone(),
                trail: pkt.trail,
                payload,
            },
        );
    }
}

/// The plan for one `request(name, extra)` call: wait out the start
/// delay, probe K times at the burst interval (ant mode), then send the
/// content Interest.
pub fn request_plan(config: &SimConfig, name: &Name, initial_delay: SimTime) -> VecDeque<PlanStep> {
    let mut steps = VecDeque::new();
    steps.push_back(PlanStep::Delay(initial_delay));
    if config.mode == ForwardingMode::Ant {
        for _ in 0..config.ant_burst_size {
            steps.push_back(PlanStep::Delay(sim_from_secs(config.ant_burst_interval)));
            steps.push_back(PlanStep::SendProbe(name.clone()));
        }
    }
    steps.push_back(PlanStep::SendInterest(name.clone()));
    steps
}

/// The follow-up plan a manifest triggers: per chunk, a smaller probe
/// burst, pacing after the first few chunks, then the chunk Interest.
pub fn chunk_plan(config: &SimConfig, chunks: &[Name]) -> VecDeque<PlanStep> {
    let mut steps = VecDeque::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if config.mode == ForwardingMode::Ant {
            for _ in 0..config.chunk_burst_size {
                steps.push_back(PlanStep::Delay(sim_from_secs(config.ant_burst_interval)));
                steps.push_back(PlanStep::SendProbe(chunk.clone()));
            }
        }
        if i > 2 {
            steps.push_back(PlanStep::Delay(sim_from_secs(config.chunk_pacing)));
        }
        steps.push_back(PlanStep::SendInterest(chunk.clone()));
    }
    steps
}
