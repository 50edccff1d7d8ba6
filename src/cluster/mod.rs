//! Conflict cluster analysis module

pub mod detection;
pub mod metrics;

pub use detection::analyze;
pub use metrics::{conflict_totals, ConflictTotals};

use serde::{Deserialize, Serialize};

/// How serious a cluster's conflicts are.
///
/// The variant order is the display order: clusters with content-level
/// resource conflicts surface first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// At least one overlapping resource differs in content
    Critical,
    /// Overlapping resources exist but all are byte-identical
    Warning,
    /// File-level overlap only
    Info,
}

/// One connected component of the conflict graph, aggregated for display.
///
/// Derived output, fully recomputed on every analysis pass; never holds
/// fewer than two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Display names of the member mods
    pub member_labels: Vec<String>,

    /// Total overlapping files across the cluster's internal edges
    pub file_conflicts: u64,

    /// Total overlapping embedded resources
    pub resource_conflicts: u64,

    /// Resources that differ in content
    pub real_resource_count: u64,

    /// Resources that are byte-identical
    pub identical_resource_count: u64,

    pub severity: Severity,
}

impl Cluster {
    /// Classify severity from the aggregated resource counts.
    pub fn classify(real_resource_count: u64, resource_conflicts: u64) -> Severity {
        if real_resource_count > 0 {
            Severity::Critical
        } else if resource_conflicts > 0 {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}
