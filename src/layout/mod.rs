//! Force-directed 2-D layout of the conflict graph

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LayoutConfig;
use crate::graph::GraphModel;

/// Final coordinates for one node, in viewport units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("viewport dimensions must be finite and positive, got {width} x {height}")]
    InvalidViewport { width: f64, height: f64 },
}

/// Working state of the simulation: one position and one velocity per node.
struct Simulation {
    xs: Vec<f64>,
    ys: Vec<f64>,
    vxs: Vec<f64>,
    vys: Vec<f64>,
}

/// Compute a stable 2-D layout with the default tuning.
///
/// Pure function of its inputs, no randomness: identical inputs yield
/// bit-identical coordinates, so memoized callers never see re-layout
/// jitter.
pub fn compute_layout(
    model: &GraphModel,
    width: f64,
    height: f64,
) -> Result<Vec<PositionedNode>, LayoutError> {
    compute_layout_with(model, width, height, &LayoutConfig::default())
}

/// Compute a layout with explicit tuning parameters.
pub fn compute_layout_with(
    model: &GraphModel,
    width: f64,
    height: f64,
    config: &LayoutConfig,
) -> Result<Vec<PositionedNode>, LayoutError> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(LayoutError::InvalidViewport { width, height });
    }

    let n = model.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let center_x = width / 2.0;
    let center_y = height / 2.0;
    let mut sim = Simulation::on_circle(n, center_x, center_y, 0.35 * width.min(height));

    for iteration in 0..config.max_iterations {
        let cooling = 1.0 - iteration as f64 / config.max_iterations as f64;

        apply_repulsion(&mut sim, cooling, config);
        apply_springs(&mut sim, model, config);
        apply_gravity(&mut sim, center_x, center_y, config);

        let max_velocity_sq = integrate(&mut sim, cooling, config);
        if max_velocity_sq < config.convergence_threshold {
            log::debug!("Layout converged after {} iterations", iteration + 1);
            break;
        }
    }

    Ok((0..n)
        .map(|i| PositionedNode {
            id: model.id(i as u32).to_string(),
            x: sim.xs[i],
            y: sim.ys[i],
        })
        .collect())
}

impl Simulation {
    /// Place node i of n on a circle around the viewport center, at angle
    /// 2·pi·i/n, with zero initial velocity.
    fn on_circle(n: usize, center_x: f64, center_y: f64, radius: f64) -> Self {
        let mut xs = Vec::with_capacity(n);
        let mut ys = Vec::with_capacity(n);
        for i in 0..n {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            xs.push(center_x + radius * angle.cos());
            ys.push(center_y + radius * angle.sin());
        }
        Self { xs, ys, vxs: vec![0.0; n], vys: vec![0.0; n] }
    }
}

/// Inverse-square repulsion between every unordered pair.
///
/// The distance floor of 1 keeps coincident nodes from blowing the force
/// up; two exactly coincident nodes exert no directed force at all. O(n²)
/// per iteration, so past the configured threshold the pass runs as a
/// per-node fold on the rayon pool (each node sums its neighbours in index
/// order, keeping the result deterministic for a fixed input).
fn apply_repulsion(sim: &mut Simulation, cooling: f64, config: &LayoutConfig) {
    let n = sim.xs.len();

    if n < config.parallel_threshold {
        for (i, j) in (0..n).tuple_combinations() {
            let dx = sim.xs[i] - sim.xs[j];
            let dy = sim.ys[i] - sim.ys[j];
            let dist = (dx * dx + dy * dy).sqrt();
            if dist <= 0.0 {
                continue;
            }
            let d = dist.max(1.0);
            let force = config.repulsion * cooling / (d * d);
            let fx = force * dx / d;
            let fy = force * dy / d;
            sim.vxs[i] += fx;
            sim.vys[i] += fy;
            sim.vxs[j] -= fx;
            sim.vys[j] -= fy;
        }
        return;
    }

    let xs = &sim.xs;
    let ys = &sim.ys;
    let forces: Vec<(f64, f64)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut fx = 0.0;
            let mut fy = 0.0;
            for j in 0..n {
                if j == i {
                    continue;
                }
                let dx = xs[i] - xs[j];
                let dy = ys[i] - ys[j];
                let dist = (dx * dx + dy * dy).sqrt();
                if dist <= 0.0 {
                    continue;
                }
                let d = dist.max(1.0);
                let force = config.repulsion * cooling / (d * d);
                fx += force * dx / d;
                fy += force * dy / d;
            }
            (fx, fy)
        })
        .collect();

    for (i, (fx, fy)) in forces.into_iter().enumerate() {
        sim.vxs[i] += fx;
        sim.vys[i] += fy;
    }
}

/// Spring attraction along every resolved edge, pulling the pair toward
/// the rest length. Heavier edges pull harder with logarithmically
/// diminishing sensitivity to weight. Edges with an unknown endpoint were
/// already dropped by the model's resolution pass.
fn apply_springs(sim: &mut Simulation, model: &GraphModel, config: &LayoutConfig) {
    for (source, target, edge) in model.resolved_edges() {
        let (s, t) = (source as usize, target as usize);
        let dx = sim.xs[t] - sim.xs[s];
        let dy = sim.ys[t] - sim.ys[s];
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= f64::EPSILON {
            continue;
        }
        let force =
            config.spring_k * (dist - config.spring_rest) * (1.0 + f64::from(edge.weight)).log2();
        let fx = force * dx / dist;
        let fy = force * dy / dist;
        sim.vxs[s] += fx;
        sim.vys[s] += fy;
        sim.vxs[t] -= fx;
        sim.vys[t] -= fy;
    }
}

/// Centering gravity, keeping the layout from drifting off-canvas when
/// repulsion dominates.
fn apply_gravity(sim: &mut Simulation, center_x: f64, center_y: f64, config: &LayoutConfig) {
    for i in 0..sim.xs.len() {
        sim.vxs[i] += config.gravity * (center_x - sim.xs[i]);
        sim.vys[i] += config.gravity * (center_y - sim.ys[i]);
    }
}

/// Damp velocities, advance positions by an Euler step whose effective
/// size shrinks as the simulation cools, and report the maximum squared
/// velocity for the convergence check.
fn integrate(sim: &mut Simulation, cooling: f64, config: &LayoutConfig) -> f64 {
    let mut max_velocity_sq: f64 = 0.0;
    for i in 0..sim.xs.len() {
        sim.vxs[i] *= config.damping;
        sim.vys[i] *= config.damping;
        sim.xs[i] += sim.vxs[i] * cooling;
        sim.ys[i] += sim.vys[i] * cooling;
        max_velocity_sq = max_velocity_sq.max(sim.vxs[i] * sim.vxs[i] + sim.vys[i] * sim.vys[i]);
    }
    max_velocity_sq
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::graph::{GraphEdge, GraphInput, GraphNode};

    fn node(id: &str) -> GraphNode {
        GraphNode { id: id.to_string(), label: id.to_string() }
    }

    fn edge(source: &str, target: &str, weight: u32) -> GraphEdge {
        GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            weight,
            resource_conflicts: 0,
            real_resource_count: 0,
            identical_resource_count: 0,
        }
    }

    /// 50 mods wired into a deterministic tangle of varying weights.
    fn tangle_50() -> GraphInput {
        let nodes: Vec<GraphNode> = (0..50).map(|i| node(&format!("mod{i}"))).collect();
        let mut edges = Vec::new();
        for i in 0u32..50 {
            edges.push(edge(&format!("mod{i}"), &format!("mod{}", (i * 7 + 3) % 50), i % 9 + 1));
            edges.push(edge(&format!("mod{i}"), &format!("mod{}", (i * 13 + 5) % 50), i % 5 + 1));
        }
        GraphInput { nodes, edges }
    }

    #[test]
    fn empty_graph_returns_empty_layout() {
        let model = GraphModel::from_input(&GraphInput::default());
        assert!(compute_layout(&model, 800.0, 600.0).unwrap().is_empty());
    }

    #[test]
    fn invalid_viewports_are_rejected() {
        let model = GraphModel::from_input(&GraphInput {
            nodes: vec![node("a")],
            edges: vec![],
        });

        for (w, h) in [
            (0.0, 600.0),
            (800.0, 0.0),
            (-800.0, 600.0),
            (f64::NAN, 600.0),
            (800.0, f64::INFINITY),
        ] {
            let err = compute_layout(&model, w, h).unwrap_err();
            assert!(matches!(err, LayoutError::InvalidViewport { .. }));
        }
    }

    #[test]
    fn one_position_per_node_no_duplicates() {
        let model = GraphModel::from_input(&tangle_50());
        let positions = compute_layout(&model, 800.0, 600.0).unwrap();

        assert_eq!(positions.len(), 50);
        let ids: HashSet<&str> = positions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn layout_is_bit_for_bit_deterministic() {
        let model = GraphModel::from_input(&tangle_50());
        let first = compute_layout(&model, 800.0, 600.0).unwrap();
        let second = compute_layout(&model, 800.0, 600.0).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn two_connected_nodes_settle_near_the_rest_length() {
        let model = GraphModel::from_input(&GraphInput {
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("a", "b", 1)],
        });
        let positions = compute_layout(&model, 800.0, 800.0).unwrap();

        let dx = positions[0].x - positions[1].x;
        let dy = positions[0].y - positions[1].y;
        let dist = (dx * dx + dy * dy).sqrt();

        // The centering force biases the settled distance below the
        // 120-unit rest length; it lands around 103 for a square viewport.
        assert!(
            (dist - 120.0).abs() < 40.0,
            "settled distance {dist} too far from the rest length"
        );
    }

    #[test]
    fn fifty_node_tangle_stays_finite_and_on_canvas() {
        let model = GraphModel::from_input(&tangle_50());
        let positions = compute_layout(&model, 800.0, 600.0).unwrap();

        for p in &positions {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.x > -100.0 && p.x < 900.0, "x = {} off canvas", p.x);
            assert!(p.y > -100.0 && p.y < 700.0, "y = {} off canvas", p.y);
        }

        // Nodes spread out rather than collapsing onto each other.
        let mut nearest = f64::INFINITY;
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                nearest = nearest.min((dx * dx + dy * dy).sqrt());
            }
        }
        assert!(nearest > 1.0, "nearest pair only {nearest} units apart");
    }

    #[test]
    fn dangling_edge_contributes_no_force() {
        let base = GraphInput {
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("a", "b", 1)],
        };
        let mut with_dangling = base.clone();
        with_dangling.edges.push(edge("a", "ghost", 50));

        let plain = compute_layout(&GraphModel::from_input(&base), 640.0, 480.0).unwrap();
        let tolerant =
            compute_layout(&GraphModel::from_input(&with_dangling), 640.0, 480.0).unwrap();

        assert_eq!(plain, tolerant);
    }

    #[test]
    fn single_node_gets_a_finite_position() {
        let model = GraphModel::from_input(&GraphInput {
            nodes: vec![node("only")],
            edges: vec![],
        });
        let positions = compute_layout(&model, 640.0, 480.0).unwrap();

        assert_eq!(positions.len(), 1);
        assert!(positions[0].x.is_finite() && positions[0].y.is_finite());
    }

    #[test]
    fn parallel_and_sequential_repulsion_agree_in_shape() {
        // Force the parallel path on a small graph and check it produces a
        // full, finite layout just like the sequential one.
        let model = GraphModel::from_input(&tangle_50());
        let config = LayoutConfig { parallel_threshold: 1, ..LayoutConfig::default() };
        let positions = compute_layout_with(&model, 800.0, 600.0, &config).unwrap();

        assert_eq!(positions.len(), 50);
        assert!(positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
