use serde::Serialize;

use crate::error::{Result, RwaError};
use crate::model::channels::WavelengthMask;
use crate::model::state::ResourceState;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WavelengthPolicy {
    /// Lowest wavelength free on the first link, then verified along the path.
    #[default]
    FirstFit,
    /// Lowest wavelength free on every link of the path.
    GlobalFirstFit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Assigned { wavelength: usize },
    NoFreeWavelength,
    ContinuityBroken { wavelength: usize, link: (usize, usize) },
}

impl Assignment {
    pub fn wavelength(&self) -> Option<usize> {
        match self {
            Assignment::Assigned { wavelength } => Some(*wavelength),
            _ => None,
        }
    }
}

impl WavelengthPolicy {
    pub fn assign(&self, state: &ResourceState, path: &[usize]) -> Result<Assignment> {
        match self {
            WavelengthPolicy::FirstFit => first_fit(state, path),
            WavelengthPolicy::GlobalFirstFit => global_first_fit(state, path),
        }
    }
}

fn link_mask(state: &ResourceState, u: usize, v: usize) -> Result<WavelengthMask> {
    state.mask(u, v).ok_or(RwaError::NotALink(u, v))
}

/// Picks a color from the first link alone and never retries another one
/// when a later link has it reserved.
pub fn first_fit(state: &ResourceState, path: &[usize]) -> Result<Assignment> {
    if path.len() < 2 {
        return Err(RwaError::PathTooShort(path.to_vec()));
    }

    let Some(wavelength) = link_mask(state, path[0], path[1])?.lowest_free() else {
        return Ok(Assignment::NoFreeWavelength);
    };

    for hop in path.windows(2).skip(1) {
        if !link_mask(state, hop[0], hop[1])?.is_free(wavelength) {
            return Ok(Assignment::ContinuityBroken {
                wavelength,
                link: (hop[0], hop[1]),
            });
        }
    }

    Ok(Assignment::Assigned { wavelength })
}

pub fn global_first_fit(state: &ResourceState, path: &[usize]) -> Result<Assignment> {
    let avail = state.path_mask(path)?;
    Ok(match avail.lowest_free() {
        Some(wavelength) => Assignment::Assigned { wavelength },
        None => Assignment::NoFreeWavelength,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::topology::Topology;

    fn line_state(channels: usize) -> ResourceState {
        let topology = Topology::from_links(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        ResourceState::new(&topology, channels).unwrap()
    }

    #[test]
    fn picks_lowest_free_on_first_link() {
        let mut state = line_state(4);
        state.set_link_mask(0, 1, 0b1100).unwrap();
        assert_eq!(
            first_fit(&state, &[0, 1, 2, 3]).unwrap(),
            Assignment::Assigned { wavelength: 2 }
        );
    }

    #[test]
    fn exhausted_first_link_fails_immediately() {
        let mut state = line_state(2);
        state.set_link_mask(0, 1, 0).unwrap();
        assert_eq!(
            first_fit(&state, &[0, 1, 2]).unwrap(),
            Assignment::NoFreeWavelength
        );
    }

    #[test]
    fn continuity_failure_does_not_retry_other_colors() {
        let mut state = line_state(2);
        state.set_link_mask(0, 1, 0b11).unwrap();
        state.set_link_mask(1, 2, 0b10).unwrap();
        let out = first_fit(&state, &[0, 1, 2, 3]).unwrap();
        assert_eq!(
            out,
            Assignment::ContinuityBroken {
                wavelength: 0,
                link: (1, 2)
            }
        );
        assert_eq!(out.wavelength(), None);
    }

    #[test]
    fn global_variant_finds_common_color_first_fit_misses() {
        let mut state = line_state(2);
        state.set_link_mask(1, 2, 0b10).unwrap();
        let path = [0, 1, 2, 3];
        assert!(matches!(
            WavelengthPolicy::FirstFit.assign(&state, &path).unwrap(),
            Assignment::ContinuityBroken { .. }
        ));
        assert_eq!(
            WavelengthPolicy::GlobalFirstFit.assign(&state, &path).unwrap(),
            Assignment::Assigned { wavelength: 1 }
        );
    }

    #[test]
    fn chosen_color_is_minimal_among_first_link_candidates() {
        let mut state = line_state(4);
        state.set_link_mask(0, 1, 0b1110).unwrap();
        state.set_link_mask(2, 3, 0b1010).unwrap();
        let path = [0, 1, 2, 3];
        let Assignment::Assigned { wavelength } = first_fit(&state, &path).unwrap() else {
            panic!("expected an assignment");
        };
        let first_link = state.mask(0, 1).unwrap();
        for lower in (0..wavelength).filter(|w| first_link.is_free(*w)) {
            assert!(!state.path_mask(&path).unwrap().is_free(lower));
        }
        assert_eq!(wavelength, 1);
    }

    #[test]
    fn links_missing_from_state_are_errors() {
        let state = line_state(2);
        assert_eq!(first_fit(&state, &[0, 2]), Err(RwaError::NotALink(0, 2)));
        assert!(matches!(
            first_fit(&state, &[0]),
            Err(RwaError::PathTooShort(_))
        ));
    }
}
