//! Conflict graph wire contracts and the indexed model built from them

pub mod model;

pub use model::GraphModel;

use serde::{Deserialize, Serialize};

/// One installed mod (or uninstalled archive) as reported by the
/// conflict-detection service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier within one graph (e.g. "installed:42")
    pub id: String,

    /// Display name of the mod
    pub label: String,
}

/// A pairwise conflict relationship between two mods.
///
/// Undirected for clustering purposes; `source`/`target` are labels for
/// display only. Who wins over whom is decided by external evidence, not
/// by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,

    /// Number of overlapping files
    #[serde(default)]
    pub weight: u32,

    /// Number of overlapping embedded resources
    #[serde(default)]
    pub resource_conflicts: u32,

    /// Overlapping resources that differ in content ("real" conflicts)
    #[serde(default)]
    pub real_resource_count: u32,

    /// Overlapping resources that are byte-identical ("cosmetic" conflicts)
    #[serde(default)]
    pub identical_resource_count: u32,
}

/// Full graph payload consumed from the conflict-detection service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphInput {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphInput {
    /// Parse a graph from the JSON export format of the conflict-detection
    /// service. Unknown fields are ignored; the service evolves on its own
    /// schedule.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
