//! Memoization and background execution around the analysis passes
//!
//! The analyzer and layout engine are pure, so the session layer only has
//! two jobs: skip recomputation when the graph and viewport are unchanged,
//! and keep big layouts off the caller's thread while making sure a stale
//! result can never overwrite a newer one.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};

use crate::cluster::{self, Cluster, ConflictTotals};
use crate::graph::{GraphInput, GraphModel};
use crate::layout::{self, LayoutError, PositionedNode};

/// One full analysis pass: clusters, global totals, and layout.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub clusters: Vec<Cluster>,
    pub totals: ConflictTotals,
    pub positions: Vec<PositionedNode>,
}

/// Content fingerprint of one invocation: every node and edge field plus
/// the viewport bit patterns.
fn fingerprint(input: &GraphInput, width: f64, height: f64) -> u64 {
    let mut hasher = DefaultHasher::new();
    for node in &input.nodes {
        node.id.hash(&mut hasher);
        node.label.hash(&mut hasher);
    }
    for edge in &input.edges {
        edge.source.hash(&mut hasher);
        edge.target.hash(&mut hasher);
        edge.weight.hash(&mut hasher);
        edge.resource_conflicts.hash(&mut hasher);
        edge.real_resource_count.hash(&mut hasher);
        edge.identical_resource_count.hash(&mut hasher);
    }
    width.to_bits().hash(&mut hasher);
    height.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Explicit memo over `(nodes, edges, width, height)`.
///
/// Both passes are deterministic, so a fingerprint hit can hand back the
/// cached [`AnalysisReport`] untouched; recomputation only happens when the
/// graph or viewport actually changed.
#[derive(Default)]
pub struct AnalysisCache {
    entries: HashMap<u64, Arc<AnalysisReport>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run (or replay) a full analysis for the given graph and viewport.
    pub fn analyze(
        &mut self,
        input: &GraphInput,
        width: f64,
        height: f64,
    ) -> Result<Arc<AnalysisReport>, LayoutError> {
        let key = fingerprint(input, width, height);
        if let Some(report) = self.entries.get(&key) {
            log::debug!("Analysis cache hit for fingerprint {key:#018x}");
            return Ok(Arc::clone(report));
        }

        let model = GraphModel::from_input(input);
        let report = Arc::new(AnalysisReport {
            clusters: cluster::analyze(&model),
            totals: cluster::conflict_totals(&model),
            positions: layout::compute_layout(&model, width, height)?,
        });
        self.entries.insert(key, Arc::clone(&report));
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached reports (e.g. after the mod list changed on disk).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

struct LayoutJob {
    generation: u64,
    input: GraphInput,
    width: f64,
    height: f64,
}

/// A completed background layout, stamped with the generation of the
/// request that produced it.
pub struct LayoutOutcome {
    pub generation: u64,
    pub result: Result<Vec<PositionedNode>, LayoutError>,
}

/// Background layout runner with supersession.
///
/// Every submission gets a monotonically increasing generation id. The
/// worker skips queued jobs that are already superseded, and [`poll`]
/// surfaces only results matching the latest issued generation, so a slow
/// layout for an old graph can never clobber a newer one.
///
/// [`poll`]: LayoutWorker::poll
pub struct LayoutWorker {
    jobs: Option<Sender<LayoutJob>>,
    outcomes: Receiver<LayoutOutcome>,
    latest: Arc<AtomicU64>,
    handle: Option<thread::JoinHandle<()>>,
}

impl LayoutWorker {
    pub fn spawn() -> Self {
        let (jobs, job_rx) = channel::unbounded::<LayoutJob>();
        let (outcome_tx, outcomes) = channel::unbounded();
        let latest = Arc::new(AtomicU64::new(0));
        let latest_seen = Arc::clone(&latest);

        let handle = thread::spawn(move || {
            for job in job_rx.iter() {
                if job.generation < latest_seen.load(Ordering::SeqCst) {
                    log::debug!("Skipping superseded layout generation {}", job.generation);
                    continue;
                }
                let model = GraphModel::from_input(&job.input);
                let result = layout::compute_layout(&model, job.width, job.height);
                if outcome_tx.send(LayoutOutcome { generation: job.generation, result }).is_err() {
                    break;
                }
            }
        });

        Self { jobs: Some(jobs), outcomes, latest, handle: Some(handle) }
    }

    /// Queue a layout run, superseding any in-flight computation. Returns
    /// the generation id assigned to this request.
    pub fn submit(&self, input: GraphInput, width: f64, height: f64) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        // Send can only fail after the worker thread exited; the
        // submission is then moot anyway.
        if let Some(jobs) = &self.jobs {
            let _ = jobs.send(LayoutJob { generation, input, width, height });
        }
        generation
    }

    /// Fetch the freshest completed layout, if any. Results for superseded
    /// generations are drained and discarded.
    pub fn poll(&self) -> Option<LayoutOutcome> {
        let latest = self.latest.load(Ordering::SeqCst);
        let mut fresh = None;
        while let Ok(outcome) = self.outcomes.try_recv() {
            if outcome.generation == latest {
                fresh = Some(outcome);
            } else {
                log::debug!("Discarding stale layout generation {}", outcome.generation);
            }
        }
        fresh
    }

    /// Block until the layout for the latest issued generation arrives.
    /// Returns `None` if the worker went away or nothing was submitted.
    pub fn wait_latest(&self, timeout: Duration) -> Option<LayoutOutcome> {
        let latest = self.latest.load(Ordering::SeqCst);
        if latest == 0 {
            return None;
        }
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(std::time::Instant::now())?;
            match self.outcomes.recv_timeout(remaining) {
                Ok(outcome) if outcome.generation == latest => return Some(outcome),
                Ok(outcome) => {
                    log::debug!("Discarding stale layout generation {}", outcome.generation)
                }
                Err(_) => return None,
            }
        }
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        // Disconnect the job channel so the worker's iterator ends.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
