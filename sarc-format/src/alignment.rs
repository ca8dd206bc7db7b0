use std::fmt;

use crate::error::{Error, Result};

/// Power-of-two boundary an entry body must start on, measured from the
/// start of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Alignment(u32);

impl Alignment {
    pub const DEFAULT: Alignment = Alignment(8);
    pub const MIN: Alignment = Alignment(1);

    pub fn new(value: u32) -> Result<Alignment> {
        if value.is_power_of_two() {
            Ok(Alignment(value))
        } else {
            Err(Error::InvalidAlignment(value))
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Rounds `address` up to the next multiple of this alignment.
    #[inline]
    pub fn align_up(self, address: u64) -> u64 {
        let mask = u64::from(self.0) - 1;
        (address + mask) & !mask
    }

    #[inline]
    pub fn is_aligned(self, address: u64) -> bool {
        address & (u64::from(self.0) - 1) == 0
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::DEFAULT
    }
}

impl TryFrom<u32> for Alignment {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Alignment::new(value)
    }
}

impl From<Alignment> for u32 {
    fn from(value: Alignment) -> Self {
        value.0
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
