use std::collections::BTreeSet;

use crate::error::{Result, RwaError};

/// Undirected, unweighted physical topology over nodes `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    adjacency: Vec<BTreeSet<usize>>,
}

impl Topology {
    pub fn from_links(node_count: usize, links: &[(usize, usize)]) -> Result<Self> {
        let mut adjacency = vec![BTreeSet::new(); node_count];
        for &(u, v) in links {
            for node in [u, v] {
                if node >= node_count {
                    return Err(RwaError::NodeOutOfRange { node, node_count });
                }
            }
            if u == v {
                return Err(RwaError::InvalidTopology(format!("self loop on node {u}")));
            }
            adjacency[u].insert(v);
            adjacency[v].insert(u);
        }
        Ok(Self { adjacency })
    }

    /// Builds from a square adjacency matrix; any non-zero entry is a link.
    pub fn from_adjacency_matrix<R: AsRef<[u8]>>(matrix: &[R]) -> Result<Self> {
        let node_count = matrix.len();
        let mut adjacency = vec![BTreeSet::new(); node_count];
        for (u, row) in matrix.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != node_count {
                return Err(RwaError::InvalidTopology(format!(
                    "row {u} has {} entries, expected {node_count}",
                    row.len()
                )));
            }
            for (v, entry) in row.iter().enumerate() {
                if *entry == 0 {
                    continue;
                }
                if u == v {
                    return Err(RwaError::InvalidTopology(format!("self loop on node {u}")));
                }
                if matrix[v].as_ref().get(u).copied().unwrap_or(0) == 0 {
                    return Err(RwaError::InvalidTopology(format!(
                        "link ({u}, {v}) has no reverse entry"
                    )));
                }
                adjacency[u].insert(v);
            }
        }
        Ok(Self { adjacency })
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn link_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn contains_node(&self, node: usize) -> bool {
        node < self.adjacency.len()
    }

    pub fn is_link(&self, u: usize, v: usize) -> bool {
        self.adjacency
            .get(u)
            .is_some_and(|neighbors| neighbors.contains(&v))
    }

    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|neighbors| neighbors.iter().copied())
    }

    /// Each undirected link once, as `(low, high)`.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, neighbors)| {
            neighbors
                .iter()
                .copied()
                .filter(move |v| u < *v)
                .map(move |v| (u, v))
        })
    }

    pub fn check_node(&self, node: usize) -> Result<()> {
        if self.contains_node(node) {
            Ok(())
        } else {
            Err(RwaError::NodeOutOfRange {
                node,
                node_count: self.node_count(),
            })
        }
    }
}
