mod ksp;
mod spf;

use std::cmp::Ordering;

use serde::Serialize;
use tracing::warn;

use crate::error::{Result, RwaError};
use crate::model::topology::Topology;

pub use ksp::yen_k_shortest_paths;
pub use spf::{shortest_path, shortest_path_with_filters};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathCandidate {
    pub nodes: Vec<usize>,
    pub hops: usize,
}

impl PathCandidate {
    pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes.windows(2).map(|hop| (hop[0], hop[1]))
    }
}

pub fn compare_path_candidate(a: &PathCandidate, b: &PathCandidate) -> Ordering {
    a.hops.cmp(&b.hops).then_with(|| a.nodes.cmp(&b.nodes))
}

/// Candidate path selection for a source/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PathEnumerator {
    FixedPath,
    FixedAlternate { k_paths: usize },
}

impl PathEnumerator {
    pub fn name(&self) -> &'static str {
        match self {
            PathEnumerator::FixedPath => "fixed",
            PathEnumerator::FixedAlternate { .. } => "alternate",
        }
    }

    /// Candidates in the order they must be tried. Fails on out-of-range or
    /// identical endpoints and when no path exists at all.
    pub fn candidates(
        &self,
        topology: &Topology,
        src: usize,
        dst: usize,
    ) -> Result<Vec<PathCandidate>> {
        topology.check_node(src)?;
        topology.check_node(dst)?;
        if src == dst {
            return Err(RwaError::SameEndpoints(src));
        }

        let unreachable = RwaError::Unreachable { src, dst };
        match self {
            PathEnumerator::FixedPath => shortest_path(topology, src, dst)
                .map(|path| vec![path])
                .ok_or(unreachable),
            PathEnumerator::FixedAlternate { k_paths: 0 } => {
                warn!("alternate routing with k_paths = 0 never offers a candidate");
                Ok(Vec::new())
            }
            PathEnumerator::FixedAlternate { k_paths } => {
                let paths = yen_k_shortest_paths(topology, src, dst, *k_paths);
                if paths.is_empty() {
                    return Err(unreachable);
                }
                Ok(paths)
            }
        }
    }
}
