//! # antnet-engine::net::link
//!
//! One half of a bidirectional link. A link belongs to an owner endpoint;
//! packets the owner sends are queued here, transmitted one at a time with
//! a delay of `size · 8 / rate` virtual seconds, and delivered into the
//! inbox of the peer half's owner, tagged with the peer half as the
//! incoming interface. Packets whose hop budget cannot survive the
//! transmission are dropped here and tallied as ant or content waste.

use crate::events::{Event, EventDiscriminant};
use crate::net::queue::Inbox;
use crate::sim::Scheduler;
use antnet_types::config::QueueDiscipline;
use antnet_types::id::LinkId;
use antnet_types::metrics::{LBL_LINK, LBL_REASON, MET_PKT_DROPPED, MET_PKT_SENT};
use antnet_types::packet::Packet;
use antnet_types::time::{sim_from_secs, SimTime};

use crate::world::Endpoint;

/// Transmission delay of `size` bytes over a `rate_bps` link, in virtual
/// time.
pub fn transmission_delay(size: u32, rate_bps: f64) -> SimTime {
    sim_from_secs(size as f64 * 8.0 / rate_bps)
}

/// A one-directional interface with its own sender queue.
pub struct Link {
    pub id: LinkId,
    pub name: String,
    /// The endpoint whose outbound traffic this link carries.
    pub owner: Endpoint,
    /// The opposite half of the bidirectional pair. Transmissions are
    /// delivered to `peer`'s owner, with `peer` as the incoming interface.
    pub peer: LinkId,
    pub rate_bps: f64,
    inbox: Inbox,
    in_flight: Option<Packet>,
    /// Probe packets dropped here on an exhausted hop budget.
    pub ant_waste: u64,
    /// Content packets dropped here on an exhausted hop budget.
    pub content_waste: u64,
}

impl Link {
    pub fn new(
        id: LinkId,
        name: String,
        owner: Endpoint,
        rate_bps: f64,
        discipline: QueueDiscipline,
    ) -> Self {
        Self {
            id,
            name,
            owner,
            peer: LinkId::MAX, // paired during wiring
            rate_bps,
            inbox: Inbox::new(discipline),
            in_flight: None,
            ant_waste: 0,
            content_waste: 0,
        }
    }

    /// Queues a packet for transmission, starting it immediately when the
    /// sender is idle.
    pub fn enqueue(&mut self, pkt: Packet, sched: &mut Scheduler) {
        ::metrics::counter!(MET_PKT_SENT, LBL_LINK => self.name.clone()).increment(1);
        self.inbox.push(pkt);
        if self.in_flight.is_none() {
            self.start_next(sched);
        }
    }

    /// Pops packets until one survives the TTL gate and begins its
    /// transmission. Packets with `ttl <= 1` cannot cross the link and are
    /// tallied into the waste buckets without consuming virtual time.
    pub(crate) fn start_next(&mut self, sched: &mut Scheduler) {
        while let Some(pkt) = self.inbox.pop() {
            if pkt.ttl <= 1 {
                tracing::debug!(link = %self.name, id = pkt.id, name = %pkt.name, "hop budget exhausted");
                if pkt.ant {
                    self.ant_waste += 1;
                } else {
                    self.content_waste += 1;
                }
                ::metrics::counter!(
                    MET_PKT_DROPPED,
                    LBL_REASON => "ttl",
                    LBL_LINK => self.name.clone()
                )
                .increment(1);
                continue;
            }
            let delay = transmission_delay(pkt.size, self.rate_bps);
            sched.schedule_in(
                delay,
                Event::LinkDone { link: self.id },
                EventDiscriminant::delivery(self.id),
            );
            self.in_flight = Some(pkt);
            break;
        }
    }

    /// Completes the in-flight transmission: the packet crosses the link,
    /// spending one hop. The caller delivers it to the peer owner and then
    /// restarts the sender.
    pub(crate) fn complete(&mut self) -> Packet {
        let mut pkt = self
            .in_flight
            .take()
            .expect("LinkDone fired with no in-flight packet");
        pkt.ttl -= 1;
        pkt
    }

    pub fn queue_len(&self) -> usize {
        self.inbox.len() + usize::from(self.in_flight.is_some())
    }
}
