//! # antnet-types::pajek
//!
//! Reader for the Pajek-like topology files the experiment scenarios use.
//! The file carries a `*Vertices` section, one vertex per line with the
//! display name in quoted field 2 and the area tag in quoted field 6,
//! followed by an `*Arcs` section with `src dst .. linkName .. rateBps`
//! per line. Arcs are directional; when both (a,b) and (b,a) appear they
//! become the two halves of one bidirectional link.

use crate::{
    errors::TopologyError,
    topology::{TopoArc, Topology, Vertex},
};
use std::collections::HashMap;
use std::path::Path;

/// Parses Pajek text into a [`Topology`].
pub fn parse(text: &str) -> Result<Topology, TopologyError> {
    let mut topo = Topology::default();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    let mut lines = text.lines().enumerate();

    // Skip any preamble before the vertex section.
    for (_, line) in lines.by_ref() {
        if line.contains("*Vertices") {
            break;
        }
    }

    let mut in_arcs = false;
    for (lineno, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains("*Arcs") {
            in_arcs = true;
            continue;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if !in_arcs {
            if words.len() < 6 {
                return Err(TopologyError::Parse {
                    line: lineno + 1,
                    message: format!("vertex line has {} fields, expected at least 6", words.len()),
                });
            }
            let id = words[0].to_string();
            let name = unquote(words[1]);
            let area = unquote(words[5]);
            index_of.insert(id, topo.vertices.len());
            topo.vertices.push(Vertex { name, area });
        } else {
            if words.len() < 7 {
                return Err(TopologyError::Parse {
                    line: lineno + 1,
                    message: format!("arc line has {} fields, expected at least 7", words.len()),
                });
            }
            let src = *index_of
                .get(words[0])
                .ok_or_else(|| TopologyError::UnknownVertex(words[0].to_string()))?;
            let dst = *index_of
                .get(words[1])
                .ok_or_else(|| TopologyError::UnknownVertex(words[1].to_string()))?;
            let rate_bps: f64 = words[6].parse().map_err(|_| TopologyError::Parse {
                line: lineno + 1,
                message: format!("bad link rate '{}'", words[6]),
            })?;
            topo.arcs.push(TopoArc {
                src,
                dst,
                name: unquote(words[4]),
                rate_bps,
            });
        }
    }

    Ok(topo)
}

/// Reads and parses a Pajek file from disk.
pub fn load(path: &Path) -> Result<Topology, TopologyError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

fn unquote(field: &str) -> String {
    field.trim_matches('"').to_string()
}
