use std::collections::{BTreeSet, VecDeque};

use super::PathCandidate;
use crate::model::topology::Topology;

const UNREACHED: usize = usize::MAX;

fn hop_distances_to(
    topology: &Topology,
    dst: usize,
    blocked_nodes: &BTreeSet<usize>,
    blocked_links: &BTreeSet<(usize, usize)>,
) -> Vec<usize> {
    let mut dist = vec![UNREACHED; topology.node_count()];
    if blocked_nodes.contains(&dst) || !topology.contains_node(dst) {
        return dist;
    }

    let mut queue = VecDeque::new();
    dist[dst] = 0;
    queue.push_back(dst);

    while let Some(v) = queue.pop_front() {
        for u in topology.neighbors(v) {
            // walking backwards: the forward hop is u -> v
            if dist[u] != UNREACHED
                || blocked_nodes.contains(&u)
                || blocked_links.contains(&(u, v))
            {
                continue;
            }
            dist[u] = dist[v] + 1;
            queue.push_back(u);
        }
    }

    dist
}

/// Fewest-hop path from `src` to `dst` avoiding the given nodes and directed
/// links. Among equal-hop paths the lexicographically smallest is returned.
pub fn shortest_path_with_filters(
    topology: &Topology,
    src: usize,
    dst: usize,
    blocked_nodes: &BTreeSet<usize>,
    blocked_links: &BTreeSet<(usize, usize)>,
) -> Option<PathCandidate> {
    if blocked_nodes.contains(&src) || !topology.contains_node(src) {
        return None;
    }

    let dist = hop_distances_to(topology, dst, blocked_nodes, blocked_links);
    let hops = dist.get(src).copied().filter(|d| *d != UNREACHED)?;

    let mut nodes = Vec::with_capacity(hops + 1);
    nodes.push(src);
    let mut current = src;
    while current != dst {
        let next = topology.neighbors(current).find(|v| {
            dist[*v] != UNREACHED
                && dist[*v] + 1 == dist[current]
                && !blocked_links.contains(&(current, *v))
        })?;
        nodes.push(next);
        current = next;
    }

    Some(PathCandidate { nodes, hops })
}

pub fn shortest_path(topology: &Topology, src: usize, dst: usize) -> Option<PathCandidate> {
    shortest_path_with_filters(topology, src, dst, &BTreeSet::new(), &BTreeSet::new())
}
