use std::fmt;

pub const MAX_CHANNELS: usize = 64;

/// Per-link wavelength availability. Bit `w` set means wavelength `w` is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WavelengthMask {
    bits: u64,
    width: usize,
}

impl WavelengthMask {
    pub fn full(width: usize) -> Self {
        debug_assert!((1..=MAX_CHANNELS).contains(&width));
        Self {
            bits: Self::width_mask(width),
            width,
        }
    }

    pub fn empty(width: usize) -> Self {
        debug_assert!((1..=MAX_CHANNELS).contains(&width));
        Self { bits: 0, width }
    }

    pub fn from_bits(bits: u64, width: usize) -> Self {
        debug_assert!((1..=MAX_CHANNELS).contains(&width));
        Self {
            bits: bits & Self::width_mask(width),
            width,
        }
    }

    fn width_mask(width: usize) -> u64 {
        if width >= MAX_CHANNELS {
            u64::MAX
        } else {
            (1_u64 << width) - 1
        }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_free(&self, wavelength: usize) -> bool {
        wavelength < self.width && self.bits & (1_u64 << wavelength) != 0
    }

    /// Clears the bit for `wavelength`. Returns false if it was not free.
    pub fn reserve(&mut self, wavelength: usize) -> bool {
        if !self.is_free(wavelength) {
            return false;
        }
        self.bits &= !(1_u64 << wavelength);
        true
    }

    /// Sets the bit for `wavelength`. Returns false if it was already free.
    pub fn release(&mut self, wavelength: usize) -> bool {
        if wavelength >= self.width || self.is_free(wavelength) {
            return false;
        }
        self.bits |= 1_u64 << wavelength;
        true
    }

    pub fn lowest_free(&self) -> Option<usize> {
        if self.bits == 0 {
            return None;
        }
        Some(self.bits.trailing_zeros() as usize)
    }

    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & other.bits,
            width: self.width.min(other.width),
        }
    }

    pub fn free_count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_exhausted(&self) -> bool {
        self.bits == 0
    }

    pub fn free_wavelengths(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width).filter(|w| self.is_free(*w))
    }
}

impl fmt::Display for WavelengthMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = self.width)
    }
}
