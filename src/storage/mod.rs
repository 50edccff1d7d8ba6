//! Results persistence for the CLI harness

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty};

use crate::cluster::{Cluster, ConflictTotals, Severity};
use crate::layout::PositionedNode;

/// Save analysis results to the specified directory.
pub fn save_results(
    clusters: &[Cluster],
    totals: &ConflictTotals,
    positions: Option<&[PositionedNode]>,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving {} clusters to {}", clusters.len(), output_dir.display());

    fs::create_dir_all(output_dir)?;

    save_clusters(clusters, output_dir)?;
    save_summary(clusters, totals, output_dir)?;
    if let Some(positions) = positions {
        save_layout(positions, output_dir)?;
    }

    log::info!("Results saved successfully");

    Ok(())
}

fn save_clusters(clusters: &[Cluster], output_dir: &Path) -> Result<()> {
    let mut file = File::create(output_dir.join("clusters.json"))?;
    file.write_all(to_string_pretty(&json!({ "clusters": clusters }))?.as_bytes())?;
    Ok(())
}

fn save_layout(positions: &[PositionedNode], output_dir: &Path) -> Result<()> {
    let mut file = File::create(output_dir.join("layout.json"))?;
    file.write_all(to_string_pretty(&json!({ "positions": positions }))?.as_bytes())?;
    Ok(())
}

fn save_summary(clusters: &[Cluster], totals: &ConflictTotals, output_dir: &Path) -> Result<()> {
    let count_severity =
        |s: Severity| clusters.iter().filter(|c| c.severity == s).count();

    let summary = json!({
        "totals": totals,
        "cluster_stats": {
            "cluster_count": clusters.len(),
            "clustered_mods": clusters.iter().map(|c| c.member_labels.len()).sum::<usize>(),
            "largest_cluster": clusters.iter().map(|c| c.member_labels.len()).max().unwrap_or(0),
            "critical": count_severity(Severity::Critical),
            "warning": count_severity(Severity::Warning),
            "info": count_severity(Severity::Info),
        }
    });

    let mut file = File::create(output_dir.join("summary.json"))?;
    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}
