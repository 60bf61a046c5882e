//! # antnet-types::topology
//!
//! The topology model the engine wires a world from: named vertices with
//! locality areas, and directional arcs carrying a link name and a rate in
//! bits per second. Scenario files can either load a Pajek file or use one
//! of the declarative builders below.

use crate::errors::TopologyError;
use serde::{Deserialize, Serialize};

/// A forwarding node in the topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub name: String,
    /// Locality tag used by ant-mode area seeding and CS self-entries.
    pub area: String,
}

/// A directional arc between two vertices, by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoArc {
    pub src: usize,
    pub dst: usize,
    pub name: String,
    pub rate_bps: f64,
}

/// The full topology: vertices plus directional arcs. Arcs that exist in
/// both directions are wired as the two halves of one bidirectional link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    pub vertices: Vec<Vertex>,
    pub arcs: Vec<TopoArc>,
}

impl Topology {
    pub fn vertex_index(&self, name: &str) -> Option<usize> {
        self.vertices.iter().position(|v| v.name == name)
    }

    /// Distinct areas in first-appearance order.
    pub fn areas(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for v in &self.vertices {
            if !seen.contains(&v.area) {
                seen.push(v.area.clone());
            }
        }
        seen
    }

    /// Adds the two directional halves of a bidirectional link.
    pub fn connect(&mut self, a: usize, b: usize, rate_bps: f64) {
        let fwd = format!("{}-{}", self.vertices[a].name, self.vertices[b].name);
        let rev = format!("{}-{}", self.vertices[b].name, self.vertices[a].name);
        self.arcs.push(TopoArc { src: a, dst: b, name: fwd, rate_bps });
        self.arcs.push(TopoArc { src: b, dst: a, name: rev, rate_bps });
    }
}

fn default_rate() -> f64 {
    100_000_000.0
}

fn default_area() -> String {
    "core".to_string()
}

/// A declarative vertex for `TopologySpec::FromArcs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexSpec {
    pub name: String,
    #[serde(default = "default_area")]
    pub area: String,
}

/// A declarative bidirectional link for `TopologySpec::FromArcs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcSpec {
    pub src: String,
    pub dst: String,
    #[serde(default = "default_rate")]
    pub rate_bps: f64,
}

/// Ways a scenario can specify the network graph without an external file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TopologySpec {
    /// `nodes` vertices connected in a chain: N1-N2, N2-N3, ...
    Line {
        nodes: usize,
        #[serde(default = "default_area")]
        area: String,
        #[serde(default = "default_rate")]
        rate_bps: f64,
    },
    /// A chain closed into a cycle.
    Ring {
        nodes: usize,
        #[serde(default = "default_area")]
        area: String,
        #[serde(default = "default_rate")]
        rate_bps: f64,
    },
    /// An explicit vertex and bidirectional-link list.
    FromArcs {
        vertices: Vec<VertexSpec>,
        arcs: Vec<ArcSpec>,
    },
}

impl TopologySpec {
    pub fn build(&self) -> Result<Topology, TopologyError> {
        match self {
            TopologySpec::Line { nodes, area, rate_bps } => Ok(chain(*nodes, area, *rate_bps)),
            TopologySpec::Ring { nodes, area, rate_bps } => {
                let mut topo = chain(*nodes, area, *rate_bps);
                if *nodes > 2 {
                    topo.connect(*nodes - 1, 0, *rate_bps);
                }
                Ok(topo)
            }
            TopologySpec::FromArcs { vertices, arcs } => {
                let mut topo = Topology::default();
                for v in vertices {
                    topo.vertices.push(Vertex {
                        name: v.name.clone(),
                        area: v.area.clone(),
                    });
                }
                for a in arcs {
                    let src = topo
                        .vertex_index(&a.src)
                        .ok_or_else(|| TopologyError::UnknownVertex(a.src.clone()))?;
                    let dst = topo
                        .vertex_index(&a.dst)
                        .ok_or_else(|| TopologyError::UnknownVertex(a.dst.clone()))?;
                    topo.connect(src, dst, a.rate_bps);
                }
                Ok(topo)
            }
        }
    }
}

fn chain(nodes: usize, area: &str, rate_bps: f64) -> Topology {
    let mut topo = Topology::default();
    for i in 0..nodes {
        topo.vertices.push(Vertex {
            name: format!("N{}", i + 1),
            area: area.to_string(),
        });
    }
    for i in 1..nodes {
        topo.connect(i - 1, i, rate_bps);
    }
    topo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_builds_paired_arcs() {
        let topo = TopologySpec::Line { nodes: 3, area: "core".into(), rate_bps: 1e8 }
            .build()
            .unwrap();
        assert_eq!(topo.vertices.len(), 3);
        // Two bidirectional links, four directional arcs.
        assert_eq!(topo.arcs.len(), 4);
        assert!(topo.arcs.iter().any(|a| a.name == "N1-N2"));
        assert!(topo.arcs.iter().any(|a| a.name == "N2-N1"));
    }

    #[test]
    fn from_arcs_rejects_unknown_vertices() {
        let spec = TopologySpec::FromArcs {
            vertices: vec![VertexSpec { name: "A".into(), area: "x".into() }],
            arcs: vec![ArcSpec { src: "A".into(), dst: "B".into(), rate_bps: 1e8 }],
        };
        assert!(matches!(spec.build(), Err(TopologyError::UnknownVertex(_))));
    }

    #[test]
    fn areas_deduplicate_in_order() {
        let topo = TopologySpec::FromArcs {
            vertices: vec![
                VertexSpec { name: "A".into(), area: "west".into() },
                VertexSpec { name: "B".into(), area: "east".into() },
                VertexSpec { name: "C".into(), area: "west".into() },
            ],
            arcs: vec![],
        }
        .build()
        .unwrap();
        assert_eq!(topo.areas(), vec!["west".to_string(), "east".to_string()]);
    }
}
