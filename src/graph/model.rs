//! Dense-index model of one conflict graph

use std::collections::HashMap;

use crate::graph::{GraphEdge, GraphInput};

/// An edge with its endpoints resolved to dense node indices.
///
/// `endpoints` is `None` when either id did not resolve against the node
/// list; such edges are inert for clustering and layout but still count
/// toward global conflict totals.
#[derive(Debug, Clone)]
pub struct IndexedEdge {
    pub endpoints: Option<(u32, u32)>,
    pub weight: u32,
    pub resource_conflicts: u32,
    pub real_resource_count: u32,
    pub identical_resource_count: u32,
}

/// Indexed, validated form of a [`GraphInput`].
///
/// Node ids are assigned dense `u32` indices in input order so the analyzer
/// and layout engine can use flat arrays instead of hashing on every
/// lookup. The model owns all of its data; nothing is borrowed from the
/// input and no state survives past one analysis.
#[derive(Debug, Clone)]
pub struct GraphModel {
    ids: Vec<String>,
    labels: Vec<String>,
    edges: Vec<IndexedEdge>,
}

impl GraphModel {
    /// Build a model from a wire-format graph.
    ///
    /// Duplicate node ids keep their first occurrence; edges referencing an
    /// unknown id are kept but left unresolved. Neither is an error: the
    /// conflict-detection service is an independent process and a transient
    /// inconsistency must not take the visualization down with it.
    pub fn from_input(input: &GraphInput) -> Self {
        let mut id_to_index: HashMap<&str, u32> = HashMap::with_capacity(input.nodes.len());
        let mut ids = Vec::with_capacity(input.nodes.len());
        let mut labels = Vec::with_capacity(input.nodes.len());

        for node in &input.nodes {
            if id_to_index.contains_key(node.id.as_str()) {
                log::warn!("Duplicate node id {:?} ignored", node.id);
                continue;
            }
            id_to_index.insert(node.id.as_str(), ids.len() as u32);
            ids.push(node.id.clone());
            labels.push(node.label.clone());
        }

        let edges = input.edges.iter().map(|edge| Self::index_edge(edge, &id_to_index)).collect();

        Self { ids, labels, edges }
    }

    fn index_edge(edge: &GraphEdge, id_to_index: &HashMap<&str, u32>) -> IndexedEdge {
        let source = id_to_index.get(edge.source.as_str()).copied();
        let target = id_to_index.get(edge.target.as_str()).copied();
        let endpoints = match (source, target) {
            (Some(s), Some(t)) => Some((s, t)),
            _ => {
                log::debug!(
                    "Edge {:?} -> {:?} references an unknown node, left unresolved",
                    edge.source,
                    edge.target
                );
                None
            }
        };

        IndexedEdge {
            endpoints,
            weight: edge.weight,
            resource_conflicts: edge.resource_conflicts,
            real_resource_count: edge.real_resource_count,
            identical_resource_count: edge.identical_resource_count,
        }
    }

    /// Number of distinct nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Original string id of a node.
    pub fn id(&self, index: u32) -> &str {
        &self.ids[index as usize]
    }

    /// Display label of a node, falling back to the raw id when the label
    /// is empty.
    pub fn label(&self, index: u32) -> &str {
        let label = &self.labels[index as usize];
        if label.is_empty() {
            &self.ids[index as usize]
        } else {
            label
        }
    }

    /// All edges, resolved and unresolved alike.
    pub fn edges(&self) -> &[IndexedEdge] {
        &self.edges
    }

    /// Edges whose endpoints both resolved.
    pub fn resolved_edges(&self) -> impl Iterator<Item = (u32, u32, &IndexedEdge)> {
        self.edges.iter().filter_map(|e| e.endpoints.map(|(s, t)| (s, t, e)))
    }
}
