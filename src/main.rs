use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

mod cluster;
mod config;
mod graph;
mod layout;
mod storage;

use graph::{GraphInput, GraphModel};

#[derive(Parser, Debug)]
#[clap(
    name = "conflict-graph-engine",
    about = "Cluster and layout analysis of a mod conflict graph"
)]
struct Cli {
    /// Path to a conflict graph JSON export
    #[clap(long)]
    input: PathBuf,

    /// Output directory for results
    #[clap(long, default_value = "conflict_results")]
    output_dir: PathBuf,

    /// Viewport width in pixels for the layout pass
    #[clap(long, default_value = "1280")]
    width: f64,

    /// Viewport height in pixels for the layout pass
    #[clap(long, default_value = "800")]
    height: f64,

    /// Skip the force-directed layout pass
    #[clap(long)]
    skip_layout: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 { args.threads } else { num_cpus::get() };
    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new().num_threads(num_threads).build_global()?;

    log::info!("Starting conflict graph analysis");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    // 1. Load the graph export
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let input = GraphInput::from_json(&raw)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let model = GraphModel::from_input(&input);
    log::info!(
        "Loaded graph with {} nodes and {} edges",
        model.node_count(),
        model.edges().len()
    );

    // 2. Cluster the conflict graph
    let clusters = cluster::analyze(&model);
    let totals = cluster::conflict_totals(&model);
    log::info!(
        "Found {} clusters; {} file conflicts across {} mods",
        clusters.len(),
        totals.file_conflicts,
        totals.node_count
    );

    // 3. Lay it out for visualization
    let positions = if args.skip_layout {
        None
    } else {
        let positions = layout::compute_layout(&model, args.width, args.height)?;
        log::info!("Computed layout for {} nodes", positions.len());
        Some(positions)
    };

    // 4. Save results
    storage::save_results(&clusters, &totals, positions.as_deref(), &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}
