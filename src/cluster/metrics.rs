//! Global conflict accounting, independent of the cluster list

use serde::{Deserialize, Serialize};

use crate::graph::GraphModel;

/// Graph-wide conflict totals for the "N file conflicts across M mods"
/// summary line.
///
/// Computed by summing every edge and counting every node, never derived
/// from the cluster list: an isolated mod still contributes to the totals
/// even though it forms no cluster, and an edge whose endpoint failed to
/// resolve still represents conflict evidence reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictTotals {
    pub file_conflicts: u64,
    pub resource_conflicts: u64,
    pub real_resource_count: u64,
    pub identical_resource_count: u64,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Sum conflict evidence over the whole graph.
pub fn conflict_totals(model: &GraphModel) -> ConflictTotals {
    let mut totals = ConflictTotals {
        node_count: model.node_count(),
        edge_count: model.edges().len(),
        ..Default::default()
    };

    for edge in model.edges() {
        totals.file_conflicts += u64::from(edge.weight);
        totals.resource_conflicts += u64::from(edge.resource_conflicts);
        totals.real_resource_count += u64::from(edge.real_resource_count);
        totals.identical_resource_count += u64::from(edge.identical_resource_count);
    }

    totals
}
