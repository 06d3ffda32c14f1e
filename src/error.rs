use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RwaError {
    #[error("node {node} is outside the topology of {node_count} nodes")]
    NodeOutOfRange { node: usize, node_count: usize },
    #[error("negative node index {0}")]
    NegativeNode(i64),
    #[error("source and destination are both node {0}")]
    SameEndpoints(usize),
    #[error("negative candidate path count {0}")]
    NegativePathCount(i64),
    #[error("no path between node {src} and node {dst}")]
    Unreachable { src: usize, dst: usize },
    #[error("channel count {0} is outside 1..=64")]
    InvalidChannelCount(usize),
    #[error("nodes {0} and {1} are not linked")]
    NotALink(usize, usize),
    #[error("wavelength {wavelength} is outside the {channels} configured channels")]
    WavelengthOutOfRange { wavelength: usize, channels: usize },
    #[error("wavelength {wavelength} is already reserved on link {link:?}")]
    WavelengthInUse { wavelength: usize, link: (usize, usize) },
    #[error("path {0:?} has fewer than two nodes")]
    PathTooShort(Vec<usize>),
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    #[error("topology has {topology} nodes but resource state was built for {state}")]
    TopologyMismatch { topology: usize, state: usize },
}

impl RwaError {
    /// Errors the admission entry points report as invalid input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            RwaError::NodeOutOfRange { .. }
                | RwaError::NegativeNode(_)
                | RwaError::SameEndpoints(_)
                | RwaError::NegativePathCount(_)
                | RwaError::Unreachable { .. }
                | RwaError::TopologyMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RwaError>;

pub fn node_index(raw: i64) -> Result<usize> {
    usize::try_from(raw).map_err(|_| RwaError::NegativeNode(raw))
}

pub fn path_count(raw: i64) -> Result<usize> {
    usize::try_from(raw).map_err(|_| RwaError::NegativePathCount(raw))
}
