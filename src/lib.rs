//! Conflict Graph Engine
//!
//! Core analysis subsystem of a mod-management client: partitions a mod
//! conflict graph into severity-ranked clusters and computes a stable
//! force-directed layout for visualization. Both passes are pure and
//! deterministic; the session layer adds memoization and background
//! execution on top.

pub mod cluster;
pub mod config;
pub mod graph;
pub mod layout;
pub mod session;
pub mod storage;

pub use cluster::{analyze, conflict_totals, Cluster, ConflictTotals, Severity};
pub use config::LayoutConfig;
pub use graph::{GraphEdge, GraphInput, GraphModel, GraphNode};
pub use layout::{compute_layout, compute_layout_with, LayoutError, PositionedNode};
pub use session::{AnalysisCache, AnalysisReport, LayoutWorker};
