use std::collections::BTreeMap;

use crate::error::{Result, RwaError};
use crate::model::channels::{WavelengthMask, MAX_CHANNELS};
use crate::model::topology::Topology;

pub type Link = (usize, usize);

#[derive(Debug, Clone, PartialEq)]
struct LinkResources {
    mask: WavelengthMask,
    holding: Vec<f64>,
}

impl LinkResources {
    fn idle(channels: usize) -> Self {
        Self {
            mask: WavelengthMask::full(channels),
            holding: vec![0.0; channels],
        }
    }
}

/// Wavelength occupancy and holding-time ledger for every directed link.
///
/// Both directions of a link are stored and always written together, so
/// `mask(u, v) == mask(v, u)` and the ledgers agree after every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState {
    node_count: usize,
    channels: usize,
    links: BTreeMap<Link, LinkResources>,
}

impl ResourceState {
    pub fn new(topology: &Topology, channels: usize) -> Result<Self> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(RwaError::InvalidChannelCount(channels));
        }
        let mut links = BTreeMap::new();
        for (u, v) in topology.links() {
            links.insert((u, v), LinkResources::idle(channels));
            links.insert((v, u), LinkResources::idle(channels));
        }
        Ok(Self {
            node_count: topology.node_count(),
            channels,
            links,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.links.keys().copied()
    }

    pub fn mask(&self, u: usize, v: usize) -> Option<WavelengthMask> {
        self.links.get(&(u, v)).map(|link| link.mask)
    }

    pub fn holding_time(&self, u: usize, v: usize, wavelength: usize) -> Option<f64> {
        self.links
            .get(&(u, v))
            .and_then(|link| link.holding.get(wavelength).copied())
    }

    fn link_mask(&self, u: usize, v: usize) -> Result<WavelengthMask> {
        self.mask(u, v).ok_or(RwaError::NotALink(u, v))
    }

    fn check_wavelength(&self, wavelength: usize) -> Result<()> {
        if wavelength < self.channels {
            Ok(())
        } else {
            Err(RwaError::WavelengthOutOfRange {
                wavelength,
                channels: self.channels,
            })
        }
    }

    /// Overwrites the occupancy of link `(u, v)` in both directions.
    pub fn set_link_mask(&mut self, u: usize, v: usize, bits: u64) -> Result<()> {
        let mask = WavelengthMask::from_bits(bits, self.channels);
        for key in [(u, v), (v, u)] {
            let link = self.links.get_mut(&key).ok_or(RwaError::NotALink(u, v))?;
            link.mask = mask;
        }
        Ok(())
    }

    /// Wavelengths free on every link of `path`.
    pub fn path_mask(&self, path: &[usize]) -> Result<WavelengthMask> {
        if path.len() < 2 {
            return Err(RwaError::PathTooShort(path.to_vec()));
        }
        let mut avail = WavelengthMask::full(self.channels);
        for hop in path.windows(2) {
            avail = avail.intersect(&self.link_mask(hop[0], hop[1])?);
        }
        Ok(avail)
    }

    /// Reserves `wavelength` on every link of `path` and records the holding
    /// time. Nothing is written unless the wavelength is free on all links.
    pub fn commit(&mut self, path: &[usize], wavelength: usize, holding_time: f64) -> Result<()> {
        self.check_wavelength(wavelength)?;
        if path.len() < 2 {
            return Err(RwaError::PathTooShort(path.to_vec()));
        }
        for hop in path.windows(2) {
            if !self.link_mask(hop[0], hop[1])?.is_free(wavelength) {
                return Err(RwaError::WavelengthInUse {
                    wavelength,
                    link: (hop[0], hop[1]),
                });
            }
        }

        for hop in path.windows(2) {
            let (u, v) = (hop[0], hop[1]);
            for key in [(u, v), (v, u)] {
                if let Some(link) = self.links.get_mut(&key) {
                    link.mask.reserve(wavelength);
                    link.holding[wavelength] = holding_time;
                }
            }
        }
        Ok(())
    }

    /// Frees `wavelength` on link `(u, v)` in both directions and clears its
    /// ledger entry. Returns whether the wavelength was reserved.
    pub fn release(&mut self, u: usize, v: usize, wavelength: usize) -> Result<bool> {
        self.check_wavelength(wavelength)?;
        self.link_mask(u, v)?;
        let mut released = false;
        for key in [(u, v), (v, u)] {
            if let Some(link) = self.links.get_mut(&key) {
                released |= link.mask.release(wavelength);
                link.holding[wavelength] = 0.0;
            }
        }
        Ok(released)
    }

    /// Subtracts `elapsed` from every reserved ledger entry on `(u, v)` and
    /// returns the wavelengths whose holding time ran out.
    pub fn decay(&mut self, u: usize, v: usize, elapsed: f64) -> Result<Vec<usize>> {
        let mut expired = Vec::new();
        for key in [(u, v), (v, u)] {
            let link = self.links.get_mut(&key).ok_or(RwaError::NotALink(u, v))?;
            for wavelength in 0..self.channels {
                if link.mask.is_free(wavelength) {
                    continue;
                }
                link.holding[wavelength] -= elapsed;
                if key == (u, v) && link.holding[wavelength] <= 0.0 {
                    expired.push(wavelength);
                }
            }
        }
        Ok(expired)
    }

    pub fn is_symmetric(&self) -> bool {
        self.links
            .iter()
            .all(|((u, v), link)| self.links.get(&(*v, *u)) == Some(link))
    }

    pub fn reserved_count(&self) -> usize {
        self.links
            .values()
            .map(|link| self.channels - link.mask.free_count())
            .sum::<usize>()
            / 2
    }
}
