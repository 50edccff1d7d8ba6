//! Connected-component detection over conflict edges

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::cluster::Cluster;
use crate::graph::GraphModel;

/// Union-Find over dense node indices.
///
/// Parent and rank live in flat arrays; the string-id to index mapping is
/// built once per analysis by [`GraphModel`], so `find`/`union` never hash.
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Rank of each root, used only to decide merge direction
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Create `size` singleton sets.
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![0; size],
        }
    }

    /// Find the root of the set containing `x`, with full path compression:
    /// locate the root first, then rewrite every visited parent directly to
    /// it. Keeps later lookups amortized near O(1).
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        let mut node = x;
        while node != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }

        root
    }

    /// Union the sets containing `x` and `y` by rank: the lower-rank root
    /// is attached under the higher; ties increment the surviving root's
    /// rank.
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        let rank_x = self.rank[root_x as usize];
        let rank_y = self.rank[root_y as usize];

        if rank_x < rank_y {
            self.parent[root_x as usize] = root_y;
        } else if rank_x > rank_y {
            self.parent[root_y as usize] = root_x;
        } else {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += 1;
        }
    }
}

/// Per-component aggregate built while walking the edge list.
#[derive(Default)]
struct ComponentSums {
    file_conflicts: u64,
    resource_conflicts: u64,
    real_resource_count: u64,
    identical_resource_count: u64,
}

/// Partition the conflict graph into clusters and rank them for display.
///
/// Grouping considers structural connectivity only; edge attribute values
/// never affect which component a node lands in. Singletons (mods with no
/// conflict partner) are not reported. The result is deterministic for a
/// given input: components are keyed by first-seen node index and the final
/// sort is stable.
pub fn analyze(model: &GraphModel) -> Vec<Cluster> {
    let node_count = model.node_count();
    if node_count == 0 {
        return Vec::new();
    }

    // Every node id was pre-registered as its own set by the model's dense
    // indexing; an edge with an unresolved endpoint has nothing to union
    // with and is skipped.
    let mut sets = DisjointSets::new(node_count);
    for (source, target, _) in model.resolved_edges() {
        sets.union(source, target);
    }

    // Group nodes by root in ascending index order.
    let mut slot_of_root: HashMap<u32, usize> = HashMap::new();
    let mut members: Vec<Vec<u32>> = Vec::new();
    for node in 0..node_count as u32 {
        let root = sets.find(node);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            members.push(Vec::new());
            members.len() - 1
        });
        members[slot].push(node);
    }

    // Internal edges are exactly the resolved edges: both endpoints share
    // the root that the union over this same edge produced.
    let mut sums: Vec<ComponentSums> = (0..members.len()).map(|_| ComponentSums::default()).collect();
    for (source, _, edge) in model.resolved_edges() {
        let slot = slot_of_root[&sets.find(source)];
        let s = &mut sums[slot];
        s.file_conflicts += u64::from(edge.weight);
        s.resource_conflicts += u64::from(edge.resource_conflicts);
        s.real_resource_count += u64::from(edge.real_resource_count);
        s.identical_resource_count += u64::from(edge.identical_resource_count);
    }

    let mut clusters: Vec<Cluster> = members
        .iter()
        .zip(&sums)
        .filter(|(group, _)| group.len() >= 2)
        .map(|(group, s)| Cluster {
            member_labels: group.iter().map(|&n| model.label(n).to_string()).collect(),
            file_conflicts: s.file_conflicts,
            resource_conflicts: s.resource_conflicts,
            real_resource_count: s.real_resource_count,
            identical_resource_count: s.identical_resource_count,
            severity: Cluster::classify(s.real_resource_count, s.resource_conflicts),
        })
        .collect();

    // Critical first; within a tier, larger conflicts surface first.
    clusters.sort_by_key(|c| (c.severity, Reverse(c.file_conflicts + c.resource_conflicts)));

    log::debug!(
        "Analysis produced {} clusters from {} nodes and {} edges",
        clusters.len(),
        node_count,
        model.edges().len()
    );

    clusters
}
