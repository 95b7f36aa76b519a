//! The five beacon bands
//!
//! Beacons step upward through the bands in a fixed order, so the band's
//! position in [`Band::ALL`] is also how many slots it lags the 20 m band.
//!
//! # Example
//!
//! ```
//! use ibp_beacon::Band;
//!
//! let band: Band = "14.100 MHz".parse().unwrap();
//! assert_eq!(band, Band::Band20m);
//! assert_eq!("10m".parse::<Band>().unwrap().mhz(), 28);
//! assert_eq!(band.to_string(), "20m");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::BeaconError;

/// HF band carrying NCDXF/IARU beacon transmissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Band {
    /// 20 meters, beacons on 14.100 MHz
    Band20m,
    /// 17 meters, beacons on 18.110 MHz
    Band17m,
    /// 15 meters, beacons on 21.150 MHz
    Band15m,
    /// 12 meters, beacons on 24.930 MHz
    Band12m,
    /// 10 meters, beacons on 28.200 MHz
    Band10m,
}

impl Band {
    /// All beacon bands in transmission order
    pub const ALL: [Band; 5] = [
        Band::Band20m,
        Band::Band17m,
        Band::Band15m,
        Band::Band12m,
        Band::Band10m,
    ];

    /// Wavelength designation in meters
    pub fn meters(&self) -> u32 {
        match self {
            Band::Band20m => 20,
            Band::Band17m => 17,
            Band::Band15m => 15,
            Band::Band12m => 12,
            Band::Band10m => 10,
        }
    }

    /// Whole-MHz designation
    pub fn mhz(&self) -> u32 {
        match self {
            Band::Band20m => 14,
            Band::Band17m => 18,
            Band::Band15m => 21,
            Band::Band12m => 24,
            Band::Band10m => 28,
        }
    }

    /// Number of slots this band lags behind 20 m
    pub fn slot_offset(&self) -> usize {
        match self {
            Band::Band20m => 0,
            Band::Band17m => 1,
            Band::Band15m => 2,
            Band::Band12m => 3,
            Band::Band10m => 4,
        }
    }

    /// Beacon frequency in Hz
    pub fn beacon_frequency_hz(&self) -> u64 {
        match self {
            Band::Band20m => 14_100_000,
            Band::Band17m => 18_110_000,
            Band::Band15m => 21_150_000,
            Band::Band12m => 24_930_000,
            Band::Band10m => 28_200_000,
        }
    }

    /// Look up a band from either its MHz or its meter designation
    pub fn from_number(n: u32) -> Option<Band> {
        Band::ALL
            .iter()
            .copied()
            .find(|b| b.mhz() == n)
            .or_else(|| Band::ALL.iter().copied().find(|b| b.meters() == n))
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.meters())
    }
}

/// Accepts meters or MHz with an optional unit and decimals: `"20"`, `"20m"`,
/// `"14"`, `"14.100 MHz"`, `"18.1"`. The first numeric run is truncated to a
/// whole number and matched against MHz values first, then meters.
impl FromStr for Band {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BeaconError::InvalidBand(s.to_string());

        let start = s
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .ok_or_else(invalid)?;
        let run: String = s[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .filter(|c| *c != ',')
            .collect();

        let value: f64 = run.parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 || value >= u32::MAX as f64 {
            return Err(invalid());
        }
        Band::from_number(value.trunc() as u32).ok_or_else(invalid)
    }
}
