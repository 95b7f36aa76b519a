//! Canonical frequency type and the boundary parser that produces it

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Number of digits in a CAT frequency field (1 Hz resolution up to 999 MHz)
pub const FREQ_DIGITS: usize = 9;

/// Largest frequency that fits the 9-digit field
pub const MAX_FREQUENCY_HZ: u64 = 999_999_999;

/// Upper bound (exclusive) for whole-number input treated as MHz
const MHZ_INPUT_LIMIT: u64 = 1_000;

/// A tuned frequency in Hz, always representable in the 9-digit CAT field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frequency(u64);

impl Frequency {
    /// Create from a Hz value; zero and values above 999 999 999 are rejected
    pub fn from_hz(hz: u64) -> Result<Self, ParseError> {
        if hz == 0 || hz > MAX_FREQUENCY_HZ {
            return Err(ParseError::InvalidFrequency(hz.to_string()));
        }
        Ok(Self(hz))
    }

    /// Create from a MHz value in the open range (0, 999.99999)
    pub fn from_mhz(mhz: f64) -> Result<Self, ParseError> {
        if !(mhz > 0.0 && mhz < 999.99999) {
            return Err(ParseError::InvalidFrequency(mhz.to_string()));
        }
        Self::from_hz((mhz * 1_000_000.0).round() as u64)
    }

    /// Frequency in Hz
    pub fn hz(&self) -> u64 {
        self.0
    }

    /// Frequency in MHz
    pub fn mhz(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Zero-padded 9-digit wire representation
    pub fn to_field(&self) -> String {
        format!("{:09}", self.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} MHz", self.mhz())
    }
}

/// Parses the representations users type on the command line:
///
/// - `"014100000"`: exactly 9 digits, Hz
/// - `"14.070"`, `"14.070 MHz"`: decimal MHz
/// - `"14"`: whole MHz when below 1000
/// - `"7074000"`: integer Hz otherwise
impl FromStr for Frequency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidFrequency(s.to_string());

        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let (number, explicit_mhz) = match lower.strip_suffix("mhz") {
            Some(rest) => (rest.trim_end(), true),
            None => (lower.as_str(), false),
        };

        if number.is_empty() {
            return Err(invalid());
        }

        if number.bytes().all(|b| b.is_ascii_digit()) {
            let value: u64 = number.parse().map_err(|_| invalid())?;
            if explicit_mhz || (number.len() != FREQ_DIGITS && value < MHZ_INPUT_LIMIT) {
                return Self::from_mhz(value as f64).map_err(|_| invalid());
            }
            return Self::from_hz(value).map_err(|_| invalid());
        }

        let mhz: f64 = number.parse().map_err(|_| invalid())?;
        if !mhz.is_finite() {
            return Err(invalid());
        }
        Self::from_mhz(mhz).map_err(|_| invalid())
    }
}
