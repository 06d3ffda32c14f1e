use std::collections::BTreeSet;

use super::spf::{shortest_path, shortest_path_with_filters};
use super::{compare_path_candidate, PathCandidate};
use crate::model::topology::Topology;

/// Yen's algorithm over hop counts: up to `k_paths` loopless paths, ordered
/// by hop count and then by node sequence among the candidates found.
pub fn yen_k_shortest_paths(
    topology: &Topology,
    src: usize,
    dst: usize,
    k_paths: usize,
) -> Vec<PathCandidate> {
    if k_paths == 0 {
        return Vec::new();
    }

    let Some(first_path) = shortest_path(topology, src, dst) else {
        return Vec::new();
    };

    let mut shortest_paths = vec![first_path];
    let mut candidate_pool: Vec<PathCandidate> = Vec::new();
    let mut seen_paths: BTreeSet<Vec<usize>> = BTreeSet::new();
    seen_paths.insert(shortest_paths[0].nodes.clone());

    for k in 1..k_paths {
        let previous_path = &shortest_paths[k - 1];
        if previous_path.nodes.len() < 2 {
            break;
        }

        for spur_idx in 0..previous_path.nodes.len() - 1 {
            let spur_node = previous_path.nodes[spur_idx];
            let root_path = &previous_path.nodes[..=spur_idx];

            let mut blocked_links: BTreeSet<(usize, usize)> = BTreeSet::new();
            for path in &shortest_paths {
                if path.nodes.len() > spur_idx + 1 && path.nodes[..=spur_idx] == *root_path {
                    blocked_links.insert((path.nodes[spur_idx], path.nodes[spur_idx + 1]));
                }
            }

            let blocked_nodes: BTreeSet<usize> =
                root_path[..root_path.len() - 1].iter().copied().collect();

            let Some(spur_path) =
                shortest_path_with_filters(topology, spur_node, dst, &blocked_nodes, &blocked_links)
            else {
                continue;
            };

            let mut total_nodes = root_path[..root_path.len() - 1].to_vec();
            total_nodes.extend(spur_path.nodes);

            if !seen_paths.insert(total_nodes.clone()) {
                continue;
            }

            candidate_pool.push(PathCandidate {
                hops: total_nodes.len() - 1,
                nodes: total_nodes,
            });
        }

        let Some(best_idx) = candidate_pool
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| compare_path_candidate(a, b))
            .map(|(idx, _)| idx)
        else {
            break;
        };

        shortest_paths.push(candidate_pool.swap_remove(best_idx));
    }

    shortest_paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_loopless(nodes: &[usize]) -> bool {
        let unique: BTreeSet<usize> = nodes.iter().copied().collect();
        unique.len() == nodes.len()
    }

    #[test]
    fn ring_yields_both_directions() {
        let topology = Topology::from_links(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        let out = yen_k_shortest_paths(&topology, 0, 2, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].nodes, vec![0, 1, 2]);
        assert_eq!(out[1].nodes, vec![0, 3, 2]);
    }

    #[test]
    fn paths_are_sorted_by_hops() {
        // direct 0-3, two-hop 0-1-3, three-hop 0-1-2-3 and 0-4-5-3
        let topology = Topology::from_links(
            6,
            &[(0, 3), (0, 1), (1, 3), (1, 2), (2, 3), (0, 4), (4, 5), (5, 3)],
        )
        .unwrap();
        let out = yen_k_shortest_paths(&topology, 0, 3, 10);
        let hops: Vec<usize> = out.iter().map(|path| path.hops).collect();
        assert_eq!(out[0].nodes, vec![0, 3]);
        assert_eq!(out[1].nodes, vec![0, 1, 3]);
        assert!(hops.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(out.iter().all(|path| is_loopless(&path.nodes)));
        assert!(out.iter().any(|path| path.nodes == vec![0, 4, 5, 3]));
        assert!(out.iter().any(|path| path.nodes == vec![0, 1, 2, 3]));

        let unique: BTreeSet<Vec<usize>> = out.iter().map(|path| path.nodes.clone()).collect();
        assert_eq!(unique.len(), out.len());
    }

    #[test]
    fn fewer_paths_than_requested_when_graph_runs_out() {
        let topology = Topology::from_links(3, &[(0, 1), (1, 2)]).unwrap();
        let out = yen_k_shortest_paths(&topology, 0, 2, 5);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].nodes, vec![0, 1, 2]);
    }

    #[test]
    fn zero_paths_requested_or_unreachable_yields_empty() {
        let topology = Topology::from_links(4, &[(0, 1), (2, 3)]).unwrap();
        assert!(yen_k_shortest_paths(&topology, 0, 1, 0).is_empty());
        assert!(yen_k_shortest_paths(&topology, 0, 3, 3).is_empty());
    }

    #[test]
    fn result_is_deterministic() {
        let topology = Topology::from_links(
            5,
            &[(0, 1), (0, 2), (1, 2), (1, 3), (2, 3), (2, 4), (3, 4)],
        )
        .unwrap();
        let first = yen_k_shortest_paths(&topology, 0, 4, 4);
        let second = yen_k_shortest_paths(&topology, 0, 4, 4);
        let nodes = |paths: &[PathCandidate]| -> Vec<Vec<usize>> {
            paths.iter().map(|path| path.nodes.clone()).collect()
        };
        assert_eq!(nodes(&first), nodes(&second));
        assert_eq!(first[0].nodes, vec![0, 2, 4]);
    }
}
