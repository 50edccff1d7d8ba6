//! Tuning constants for the force-directed layout simulation

/// Parameters of the layout simulation.
///
/// The defaults are the tuned values the rest of the engine is calibrated
/// against; the knobs exist mainly so tests can shorten runs.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Inverse-square repulsion strength between every node pair
    pub repulsion: f64,

    /// Spring constant of the edge attraction force
    pub spring_k: f64,

    /// Rest length of an edge spring, in viewport units
    pub spring_rest: f64,

    /// Pull toward the viewport center, per unit of displacement
    pub gravity: f64,

    /// Velocity retained per iteration after damping
    pub damping: f64,

    /// Iteration budget for one layout run
    pub max_iterations: usize,

    /// Squared-velocity threshold below which the simulation stops early
    pub convergence_threshold: f64,

    /// Node count at and above which the repulsion pass runs on the rayon
    /// pool instead of the sequential pair loop
    pub parallel_threshold: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion: 5000.0,
            spring_k: 0.005,
            spring_rest: 120.0,
            gravity: 0.01,
            damping: 0.85,
            max_iterations: 120,
            convergence_threshold: 0.01,
            parallel_threshold: 512,
        }
    }
}
