use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{node_index, path_count, RwaError};
use crate::model::channels::MAX_CHANNELS;
use crate::model::topology::Topology;
use crate::rwa::{PathEnumerator, WavelengthPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub calls: usize,
    pub load_min: f64,
    pub load_max: f64,
    pub load_step: f64,
    pub mean_holding_time: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            calls: 1000,
            load_min: 1.0,
            load_max: 30.0,
            load_step: 1.0,
            mean_holding_time: 10.0,
            seed: 1,
        }
    }
}

impl SimulationConfig {
    pub fn loads(&self) -> Vec<f64> {
        let mut out = Vec::new();
        let mut load = self.load_min;
        while load <= self.load_max + 1e-9 {
            out.push(load);
            load += self.load_step;
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub name: String,
    pub channels: usize,
    pub routing: PathEnumerator,
    pub policy: WavelengthPolicy,
    pub source: usize,
    pub destination: usize,
    pub topology: Topology,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Deserialize, Default)]
struct RawTopology {
    nodes: Option<usize>,
    links: Option<Vec<(usize, usize)>>,
    adjacency: Option<Vec<Vec<u8>>>,
}

#[derive(Debug, Deserialize, Default)]
struct RawSimulation {
    calls: Option<usize>,
    load_min: Option<f64>,
    load_max: Option<f64>,
    load_step: Option<f64>,
    mean_holding_time: Option<f64>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawExperimentConfig {
    name: Option<String>,
    channels: Option<usize>,
    strategy: Option<String>,
    k_paths: Option<i64>,
    wavelength_policy: Option<String>,
    source: i64,
    destination: i64,
    topology: RawTopology,
    simulation: Option<RawSimulation>,
}

pub fn load_experiment_config(path: &Path) -> Result<ExperimentConfig> {
    let raw_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_experiment_config(&raw_text)
}

pub fn parse_experiment_config(raw_text: &str) -> Result<ExperimentConfig> {
    let raw_cfg: RawExperimentConfig =
        serde_yaml::from_str(raw_text).context("failed to parse experiment config yaml")?;

    let channels = raw_cfg.channels.unwrap_or(8);
    if channels == 0 || channels > MAX_CHANNELS {
        return Err(RwaError::InvalidChannelCount(channels)).context("invalid `channels`");
    }

    let topology = build_topology(raw_cfg.topology).context("invalid `topology`")?;

    let source = node_index(raw_cfg.source).context("invalid `source`")?;
    let destination = node_index(raw_cfg.destination).context("invalid `destination`")?;
    topology.check_node(source).context("invalid `source`")?;
    topology.check_node(destination).context("invalid `destination`")?;
    if source == destination {
        return Err(RwaError::SameEndpoints(source)).context("invalid endpoints");
    }

    let strategy = raw_cfg
        .strategy
        .unwrap_or_else(|| "fixed".to_string())
        .to_lowercase();
    let k_paths = path_count(raw_cfg.k_paths.unwrap_or(2)).context("invalid `k_paths`")?;
    let routing = parse_routing(&strategy, k_paths)?;

    let policy = match raw_cfg.wavelength_policy.as_deref() {
        None => WavelengthPolicy::FirstFit,
        Some(name) => parse_policy(name)?,
    };

    let simulation = build_simulation(raw_cfg.simulation.unwrap_or_default())?;

    Ok(ExperimentConfig {
        name: raw_cfg.name.unwrap_or_else(|| "network".to_string()),
        channels,
        routing,
        policy,
        source,
        destination,
        topology,
        simulation,
    })
}

pub fn parse_routing(strategy: &str, k_paths: usize) -> Result<PathEnumerator> {
    match strategy.trim().to_lowercase().as_str() {
        "fixed" | "fixed_path" => Ok(PathEnumerator::FixedPath),
        "alternate" | "fixed_alternate" => Ok(PathEnumerator::FixedAlternate { k_paths }),
        other => anyhow::bail!("unsupported routing strategy: {other}"),
    }
}

pub fn parse_policy(name: &str) -> Result<WavelengthPolicy> {
    match name.trim().to_lowercase().as_str() {
        "first_fit" | "ff" => Ok(WavelengthPolicy::FirstFit),
        "global_first_fit" => Ok(WavelengthPolicy::GlobalFirstFit),
        other => anyhow::bail!("unsupported wavelength policy: {other}"),
    }
}

fn build_topology(raw: RawTopology) -> Result<Topology> {
    match (raw.adjacency, raw.links) {
        (Some(matrix), None) => {
            if let Some(nodes) = raw.nodes {
                anyhow::ensure!(
                    nodes == matrix.len(),
                    "`nodes` is {nodes} but the adjacency matrix has {} rows",
                    matrix.len()
                );
            }
            Ok(Topology::from_adjacency_matrix(&matrix)?)
        }
        (None, Some(links)) => {
            let nodes = raw
                .nodes
                .context("`nodes` is required when the topology is given as `links`")?;
            Ok(Topology::from_links(nodes, &links)?)
        }
        (Some(_), Some(_)) => anyhow::bail!("give either `adjacency` or `links`, not both"),
        (None, None) => anyhow::bail!("topology needs `adjacency` or `links`"),
    }
}

fn build_simulation(raw: RawSimulation) -> Result<SimulationConfig> {
    let defaults = SimulationConfig::default();
    let simulation = SimulationConfig {
        calls: raw.calls.unwrap_or(defaults.calls),
        load_min: raw.load_min.unwrap_or(defaults.load_min),
        load_max: raw.load_max.unwrap_or(defaults.load_max),
        load_step: raw.load_step.unwrap_or(defaults.load_step),
        mean_holding_time: raw.mean_holding_time.unwrap_or(defaults.mean_holding_time),
        seed: raw.seed.unwrap_or(defaults.seed),
    };
    anyhow::ensure!(simulation.calls > 0, "`simulation.calls` must be positive");
    anyhow::ensure!(
        simulation.load_min > 0.0 && simulation.load_max >= simulation.load_min,
        "`simulation.load_min` must be positive and not above `load_max`"
    );
    anyhow::ensure!(
        simulation.load_step > 0.0,
        "`simulation.load_step` must be positive"
    );
    anyhow::ensure!(
        simulation.mean_holding_time > 0.0,
        "`simulation.mean_holding_time` must be positive"
    );
    Ok(simulation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RING: &str = r#"
name: ring4
channels: 4
strategy: alternate
k_paths: 3
source: 0
destination: 2
topology:
  nodes: 4
  links: [[0, 1], [1, 2], [2, 3], [3, 0]]
simulation:
  calls: 50
  load_min: 2
  load_max: 6
  load_step: 2
"#;

    fn root_cause(err: &anyhow::Error) -> Option<&RwaError> {
        err.chain().find_map(|cause| cause.downcast_ref::<RwaError>())
    }

    #[test]
    fn parses_full_config() {
        let cfg = parse_experiment_config(RING).unwrap();
        assert_eq!(cfg.name, "ring4");
        assert_eq!(cfg.channels, 4);
        assert_eq!(cfg.routing, PathEnumerator::FixedAlternate { k_paths: 3 });
        assert_eq!(cfg.policy, WavelengthPolicy::FirstFit);
        assert_eq!((cfg.source, cfg.destination), (0, 2));
        assert_eq!(cfg.topology.link_count(), 4);
        assert_eq!(cfg.simulation.calls, 50);
        assert_eq!(cfg.simulation.mean_holding_time, 10.0);
        assert_eq!(cfg.simulation.loads(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn defaults_apply_to_minimal_config() {
        let cfg = parse_experiment_config(
            "source: 0\ndestination: 1\ntopology:\n  adjacency: [[0, 1], [1, 0]]\n",
        )
        .unwrap();
        assert_eq!(cfg.channels, 8);
        assert_eq!(cfg.routing, PathEnumerator::FixedPath);
        assert_eq!(cfg.simulation, SimulationConfig::default());
        assert_eq!(cfg.simulation.loads().len(), 30);
    }

    #[test]
    fn global_policy_is_parsed() {
        let text = RING.replace("strategy: alternate", "wavelength_policy: global_first_fit");
        let cfg = parse_experiment_config(&text).unwrap();
        assert_eq!(cfg.policy, WavelengthPolicy::GlobalFirstFit);
        assert_eq!(cfg.routing, PathEnumerator::FixedPath);
    }

    #[test]
    fn negative_values_are_rejected() {
        let err = parse_experiment_config(&RING.replace("k_paths: 3", "k_paths: -1")).unwrap_err();
        assert_eq!(root_cause(&err), Some(&RwaError::NegativePathCount(-1)));

        let err = parse_experiment_config(&RING.replace("source: 0", "source: -2")).unwrap_err();
        assert_eq!(root_cause(&err), Some(&RwaError::NegativeNode(-2)));
    }

    #[test]
    fn out_of_range_endpoints_are_rejected() {
        let err =
            parse_experiment_config(&RING.replace("destination: 2", "destination: 4")).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&RwaError::NodeOutOfRange {
                node: 4,
                node_count: 4
            })
        );
        let err =
            parse_experiment_config(&RING.replace("destination: 2", "destination: 0")).unwrap_err();
        assert_eq!(root_cause(&err), Some(&RwaError::SameEndpoints(0)));
    }

    #[test]
    fn bad_channels_and_strategy_are_rejected() {
        assert!(parse_experiment_config(&RING.replace("channels: 4", "channels: 65")).is_err());
        assert!(parse_experiment_config(&RING.replace("channels: 4", "channels: 0")).is_err());
        assert!(
            parse_experiment_config(&RING.replace("strategy: alternate", "strategy: random"))
                .is_err()
        );
    }

    #[test]
    fn topology_needs_exactly_one_form() {
        let text = RING.replace("  nodes: 4\n", "");
        assert!(parse_experiment_config(&text).is_err());
        let text = RING.replace(
            "  nodes: 4\n",
            "  nodes: 4\n  adjacency: [[0, 1], [1, 0]]\n",
        );
        assert!(parse_experiment_config(&text).is_err());
    }

    #[test]
    fn shipped_configs_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs");
        let ring = load_experiment_config(&dir.join("ring8.yaml")).unwrap();
        assert_eq!(ring.routing, PathEnumerator::FixedAlternate { k_paths: 2 });
        assert_eq!(ring.topology.node_count(), 8);
        let mesh = load_experiment_config(&dir.join("mesh6_fixed.yaml")).unwrap();
        assert_eq!(mesh.routing, PathEnumerator::FixedPath);
        assert_eq!(mesh.topology.link_count(), 8);
        assert!(load_experiment_config(&dir.join("missing.yaml")).is_err());
    }

    #[test]
    fn parse_helpers_accept_aliases() {
        assert_eq!(
            parse_routing("Fixed_Alternate", 4).unwrap(),
            PathEnumerator::FixedAlternate { k_paths: 4 }
        );
        assert_eq!(parse_routing("fixed", 4).unwrap(), PathEnumerator::FixedPath);
        assert_eq!(parse_policy("FF").unwrap(), WavelengthPolicy::FirstFit);
        assert!(parse_policy("best_fit").is_err());
    }
}
