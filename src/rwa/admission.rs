use serde::Serialize;
use tracing::debug;

use super::assign::{Assignment, WavelengthPolicy};
use super::route::{PathCandidate, PathEnumerator};
use crate::error::{Result, RwaError};
use crate::model::state::ResourceState;
use crate::model::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallRequest {
    pub source: usize,
    pub destination: usize,
    pub holding_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub path: PathCandidate,
    pub wavelength: usize,
    pub holding_time: f64,
    /// Zero-based rank of the committed path among the candidates.
    pub path_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Allocated(Allocation),
    Blocked,
}

impl Admission {
    pub fn is_allocated(&self) -> bool {
        matches!(self, Admission::Allocated(_))
    }

    /// 0 when allocated, 1 when blocked.
    pub fn code(&self) -> u8 {
        match self {
            Admission::Allocated(_) => 0,
            Admission::Blocked => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionState {
    Trying { path_index: usize },
    Allocated,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmissionController {
    pub routing: PathEnumerator,
    pub policy: WavelengthPolicy,
}

impl AdmissionController {
    pub fn new(routing: PathEnumerator, policy: WavelengthPolicy) -> Self {
        Self { routing, policy }
    }

    pub fn fixed() -> Self {
        Self::new(PathEnumerator::FixedPath, WavelengthPolicy::FirstFit)
    }

    pub fn alternate(k_paths: usize) -> Self {
        Self::new(
            PathEnumerator::FixedAlternate { k_paths },
            WavelengthPolicy::FirstFit,
        )
    }

    /// Routes the call and reserves a wavelength for it. `state` is only
    /// written when the call is allocated.
    pub fn admit(
        &self,
        topology: &Topology,
        state: &mut ResourceState,
        request: &CallRequest,
    ) -> Result<Admission> {
        if topology.node_count() != state.node_count() {
            return Err(RwaError::TopologyMismatch {
                topology: topology.node_count(),
                state: state.node_count(),
            });
        }

        let candidates = self
            .routing
            .candidates(topology, request.source, request.destination)?;

        let mut machine = AdmissionState::Trying { path_index: 0 };
        for (path_index, path) in candidates.into_iter().enumerate() {
            machine = AdmissionState::Trying { path_index };
            debug!(?machine, path = ?path.nodes, "attempting wavelength assignment");

            let wavelength = match self.policy.assign(state, &path.nodes)? {
                Assignment::Assigned { wavelength } => wavelength,
                Assignment::NoFreeWavelength => {
                    debug!(path_index, "no free wavelength on first link");
                    continue;
                }
                Assignment::ContinuityBroken { wavelength, link } => {
                    debug!(path_index, wavelength, ?link, "wavelength continuity broken");
                    continue;
                }
            };

            state.commit(&path.nodes, wavelength, request.holding_time)?;
            machine = AdmissionState::Allocated;
            debug!(?machine, path_index, wavelength, "call allocated");
            return Ok(Admission::Allocated(Allocation {
                path,
                wavelength,
                holding_time: request.holding_time,
                path_index,
            }));
        }

        debug!(last = ?machine, "call blocked");
        Ok(Admission::Blocked)
    }
}

/// Fixed routing with local first-fit assignment.
pub fn allocate_fixed(
    topology: &Topology,
    state: &mut ResourceState,
    request: &CallRequest,
) -> Result<Admission> {
    AdmissionController::fixed().admit(topology, state, request)
}

/// Fixed-alternate routing over `k_paths` candidates with local first-fit.
pub fn allocate_alternate(
    topology: &Topology,
    state: &mut ResourceState,
    request: &CallRequest,
    k_paths: usize,
) -> Result<Admission> {
    AdmissionController::alternate(k_paths).admit(topology, state, request)
}
