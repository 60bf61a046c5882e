//! # antnet-engine::producer
//!
//! Producers hold named content and convert Interests into Data. Content
//! registered as chunked answers the whole-object Interest with a
//! manifest of chunk names and serves each chunk on request; Interests
//! for names a producer does not hold pass through unchanged so the
//! fabric can fall back to other producers.

use crate::rng::RngDiscipline;
use crate::sim::EngineCtx;
use antnet_types::id::{LinkId, ProducerId};
use antnet_types::name::Name;
use antnet_types::packet::{Packet, PacketMode, Payload, TrailHop};
use bytes::Bytes;
use fxhash::{FxHashMap, FxHashSet};
use indexmap::IndexMap;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Chunks generated per chunked content object.
pub(crate) const CHUNKS_PER_CONTENT: usize = 10;
/// Size in bytes of each generated chunk payload.
const CHUNK_PAYLOAD_BYTES: usize = 10;

enum Content {
    /// A whole object served directly.
    Object(Bytes),
    /// Chunked content: the object Interest gets the manifest, chunk
    /// Interests get the bytes. Insertion order fixes the manifest order.
    Chunked(IndexMap<Name, Bytes>),
}

pub struct Producer {
    pub id: ProducerId,
    pub name: String,
    pub area: String,
    /// The producer's single interface into the fabric.
    pub iface: LinkId,
    contents: FxHashMap<Name, Content>,
    /// Distinct names served to non-probe Interests.
    pub served: FxHashSet<Name>,
    /// Data packets that wrongly arrived here.
    pub errors: u64,
}

impl Producer {
    pub fn new(id: ProducerId, name: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            area: area.into(),
            iface: LinkId::MAX, // set during wiring
            contents: FxHashMap::default(),
            served: FxHashSet::default(),
            errors: 0,
        }
    }

    /// Registers one content object under `area/name`, generating random
    /// alphanumeric payload bytes from the run's seeded stream.
    pub fn register(&mut self, mut rng: RngDiscipline<'_>, content_name: &str, chunked: bool) {
        let key = Name::new(format!("{}/{}", self.area, content_name));
        let content = if chunked {
            let mut chunks = IndexMap::new();
            for i in 1..=CHUNKS_PER_CONTENT {
                let chunk_name = key.child(&format!("{:02}", i));
                chunks.insert(chunk_name, random_payload(&mut rng));
            }
            Content::Chunked(chunks)
        } else {
            Content::Object(random_payload(&mut rng))
        };
        self.contents.insert(key, content);
    }

    /// Handles one delivery: answer, or pass the Interest through.
    pub fn on_packet(&mut self, ctx: &mut EngineCtx<'_>, incoming: LinkId, mut pkt: Packet) {
        if pkt.mode == PacketMode::Data {
            tracing::warn!(producer = %self.name, id = pkt.id, "producer received a Data packet");
            self.errors += 1;
            return;
        }

        let answer = self.lookup(&pkt.name);
        if let Some(payload) = answer {
            if !pkt.ant {
                self.served.insert(pkt.name.clone());
                pkt.payload = Some(payload);
                pkt.trail.push(TrailHop {
                    node: self.name.clone(),
                    at: ctx.sched.now(),
                });
                pkt.creator = self.name.clone();
            }
            // Probes flip to Data with no payload; they still reinforce
            // the FIB along the return path.
            pkt.convert_to_data();
        }
        // Unknown names go back unchanged, still an Interest.
        ctx.links[incoming as usize].enqueue(pkt, ctx.sched);
    }

    fn lookup(&self, name: &Name) -> Option<Payload> {
        if let Some(content) = self.contents.get(name) {
            return Some(match content {
                Content::Object(bytes) => Payload::Chunk(bytes.clone()),
                Content::Chunked(chunks) => Payload::Manifest(chunks.keys().cloned().collect()),
            });
        }
        let parent = name.parent()?;
        match self.contents.get(&parent) {
            Some(Content::Chunked(chunks)) => chunks.get(name).map(|b| Payload::Chunk(b.clone())),
            _ => None,
        }
    }

    /// The names this producer can serve (for reports).
    pub fn holds(&self, name: &Name) -> bool {
        self.lookup(name).is_some()
    }
}

fn random_payload(rng: &mut RngDiscipline<'_>) -> Bytes {
    let bytes: Vec<u8> = (0..CHUNK_PAYLOAD_BYTES)
        .map(|_| rng.sample(Alphanumeric))
        .collect();
    Bytes::from(bytes)
}
