//! Clarifier offsets
//!
//! The `CF` frame carries the offset as a direction character followed by a
//! 4-digit zero-padded magnitude, so the usable range is -9999..=9999 Hz.
//! Out-of-range input never reaches the radio: it is logged and replaced by a
//! zero offset so the frame stays well-formed.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Largest clarifier magnitude the `CF` frame can carry
pub const MAX_CLARIFIER_HZ: i32 = 9999;

/// Clarifier offset in Hz, always within +/-9999
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClarifierOffset(i32);

impl ClarifierOffset {
    /// Zero offset (clarifier off)
    pub const ZERO: ClarifierOffset = ClarifierOffset(0);

    /// Create an offset, rejecting magnitudes above 9999 Hz
    pub fn new(hz: i32) -> Option<Self> {
        (hz.unsigned_abs() <= MAX_CLARIFIER_HZ as u32).then_some(Self(hz))
    }

    /// Create an offset, falling back to zero when out of range
    pub fn saturating_default(hz: i64) -> Self {
        if hz.unsigned_abs() > MAX_CLARIFIER_HZ as u64 {
            tracing::error!(
                "Invalid offset {}. Must be between -{max} Hz and +{max} Hz",
                hz,
                max = MAX_CLARIFIER_HZ
            );
            return Self::ZERO;
        }
        Self(hz as i32)
    }

    /// Rebuild an offset from its wire fields (`+`/`-` and 4 digits)
    pub fn from_fields(direction: char, magnitude: &str) -> Option<Self> {
        if magnitude.len() != 4 || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: i32 = magnitude.parse().ok()?;
        match direction {
            '+' => Some(Self(value)),
            '-' => Some(Self(-value)),
            _ => None,
        }
    }

    /// Offset in Hz
    pub fn hz(&self) -> i32 {
        self.0
    }

    /// Whether the clarifier should be switched on for this offset
    pub fn is_active(&self) -> bool {
        self.0 != 0
    }

    /// Direction character for the wire
    pub fn direction(&self) -> char {
        if self.0 < 0 {
            '-'
        } else {
            '+'
        }
    }

    /// Zero-padded 4-digit magnitude for the wire
    pub fn magnitude_field(&self) -> String {
        format!("{:04}", self.0.unsigned_abs())
    }
}

impl fmt::Display for ClarifierOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} Hz", self.direction(), self.0.unsigned_abs())
    }
}

/// Accepts an optional leading sign followed by digits; no sign means `+`.
///
/// Malformed text is an error. Well-formed but out-of-range values take the
/// same zero fallback as numeric input.
impl FromStr for ClarifierOffset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'+') => (false, &trimmed[1..]),
            Some(b'-') => (true, &trimmed[1..]),
            _ => (false, trimmed),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidOffset(s.to_string()));
        }
        // Anything longer than this is out of range regardless of value
        if digits.trim_start_matches('0').len() > 9 {
            return Ok(Self::saturating_default(i64::MAX));
        }
        let magnitude: i64 = digits
            .parse()
            .map_err(|_| ParseError::InvalidOffset(s.to_string()))?;
        Ok(Self::saturating_default(if negative {
            -magnitude
        } else {
            magnitude
        }))
    }
}

/// Convert a signed offset to its `(direction, magnitude)` wire fields.
///
/// Offsets beyond +/-9999 Hz are logged and yield `('+', "0000")`.
pub fn offset_to_str(offset: i64) -> (char, String) {
    let offset = ClarifierOffset::saturating_default(offset);
    (offset.direction(), offset.magnitude_field())
}
