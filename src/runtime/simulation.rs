use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use super::config::ExperimentConfig;
use crate::model::state::ResourceState;
use crate::model::topology::Topology;
use crate::rwa::{Admission, AdmissionController, CallRequest, PathEnumerator, WavelengthPolicy};

#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        let raw = self.next_u64() >> 11;
        (raw as f64) / ((1_u64 << 53) as f64)
    }

    /// Exponential sample with the given mean.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        -mean * (1.0 - self.next_f64()).ln()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadPoint {
    pub load: f64,
    pub calls: usize,
    pub blocked: usize,
    pub blocking_probability: f64,
    pub alternate_hits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub network: String,
    pub routing: PathEnumerator,
    pub policy: WavelengthPolicy,
    pub channels: usize,
    pub source: usize,
    pub destination: usize,
    pub points: Vec<LoadPoint>,
}

/// Decays every reservation by `elapsed` and frees the ones that ran out.
pub fn advance_network(
    topology: &Topology,
    state: &mut ResourceState,
    elapsed: f64,
) -> Result<usize> {
    let mut released = 0;
    for (u, v) in topology.links() {
        for wavelength in state.decay(u, v, elapsed)? {
            if state.release(u, v, wavelength)? {
                released += 1;
            }
        }
    }
    Ok(released)
}

pub fn run_load(
    cfg: &ExperimentConfig,
    controller: &AdmissionController,
    load: f64,
    rng: &mut LcgRng,
) -> Result<LoadPoint> {
    let mut state = ResourceState::new(&cfg.topology, cfg.channels)?;
    let mean_holding = cfg.simulation.mean_holding_time;
    let mean_interarrival = mean_holding / load;

    let mut blocked = 0;
    let mut alternate_hits = 0;
    for call in 0..cfg.simulation.calls {
        let until_next = rng.exponential(mean_interarrival);
        let released = advance_network(&cfg.topology, &mut state, until_next)?;
        if released > 0 {
            debug!(call, released, "released expired wavelengths");
        }

        let request = CallRequest {
            source: cfg.source,
            destination: cfg.destination,
            holding_time: rng.exponential(mean_holding),
        };
        let admission = controller
            .admit(&cfg.topology, &mut state, &request)
            .with_context(|| format!("call {call} at load {load} rejected as invalid"))?;
        match admission {
            Admission::Allocated(allocation) => {
                if allocation.path_index > 0 {
                    alternate_hits += 1;
                }
            }
            Admission::Blocked => blocked += 1,
        }
    }

    let calls = cfg.simulation.calls;
    Ok(LoadPoint {
        load,
        calls,
        blocked,
        blocking_probability: blocked as f64 / calls as f64,
        alternate_hits,
    })
}

pub fn run_experiment(cfg: &ExperimentConfig) -> Result<SimulationReport> {
    let controller = AdmissionController::new(cfg.routing, cfg.policy);
    let mut points = Vec::new();

    for (idx, load) in cfg.simulation.loads().into_iter().enumerate() {
        let mut rng = LcgRng::new(cfg.simulation.seed.wrapping_add(idx as u64));
        let point = run_load(cfg, &controller, load, &mut rng)?;
        info!(
            network = %cfg.name,
            strategy = cfg.routing.name(),
            load = point.load,
            blocked = point.blocked,
            calls = point.calls,
            "blocking probability {:.4}",
            point.blocking_probability
        );
        points.push(point);
    }

    Ok(SimulationReport {
        network: cfg.name.clone(),
        routing: cfg.routing,
        policy: cfg.policy,
        channels: cfg.channels,
        source: cfg.source,
        destination: cfg.destination,
        points,
    })
}
