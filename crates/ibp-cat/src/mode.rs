//! Operating modes and their single-character CAT codes
//!
//! The FTdx10 encodes the main-band mode as one hex-like character in the
//! `MD` and `IF` frames: `1`..`9` then `A`..`F`.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Operating modes supported by the `MD` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Lower Sideband
    Lsb,
    /// Upper Sideband
    Usb,
    /// CW on the upper side
    CwU,
    /// Frequency Modulation
    Fm,
    /// Amplitude Modulation
    Am,
    /// RTTY on the lower side
    RttyL,
    /// CW on the lower side
    CwL,
    /// Data on the lower side
    DataL,
    /// RTTY on the upper side
    RttyU,
    /// Data over FM
    DataFm,
    /// FM Narrow
    FmN,
    /// Data on the upper side
    DataU,
    /// AM Narrow
    AmN,
    /// PSK
    Psk,
    /// Data over narrow FM
    DataFmN,
}

impl Mode {
    /// All modes in CAT code order (`1`..`F`)
    pub const ALL: [Mode; 15] = [
        Mode::Lsb,
        Mode::Usb,
        Mode::CwU,
        Mode::Fm,
        Mode::Am,
        Mode::RttyL,
        Mode::CwL,
        Mode::DataL,
        Mode::RttyU,
        Mode::DataFm,
        Mode::FmN,
        Mode::DataU,
        Mode::AmN,
        Mode::Psk,
        Mode::DataFmN,
    ];

    /// CAT character for this mode
    pub fn code(&self) -> char {
        match self {
            Mode::Lsb => '1',
            Mode::Usb => '2',
            Mode::CwU => '3',
            Mode::Fm => '4',
            Mode::Am => '5',
            Mode::RttyL => '6',
            Mode::CwL => '7',
            Mode::DataL => '8',
            Mode::RttyU => '9',
            Mode::DataFm => 'A',
            Mode::FmN => 'B',
            Mode::DataU => 'C',
            Mode::AmN => 'D',
            Mode::Psk => 'E',
            Mode::DataFmN => 'F',
        }
    }

    /// Look up a mode from its CAT character
    pub fn from_code(c: char) -> Option<Mode> {
        let mode = match c.to_ascii_uppercase() {
            '1' => Mode::Lsb,
            '2' => Mode::Usb,
            '3' => Mode::CwU,
            '4' => Mode::Fm,
            '5' => Mode::Am,
            '6' => Mode::RttyL,
            '7' => Mode::CwL,
            '8' => Mode::DataL,
            '9' => Mode::RttyU,
            'A' => Mode::DataFm,
            'B' => Mode::FmN,
            'C' => Mode::DataU,
            'D' => Mode::AmN,
            'E' => Mode::Psk,
            'F' => Mode::DataFmN,
            _ => return None,
        };
        Some(mode)
    }

    /// Name as printed on the radio's front panel
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Lsb => "LSB",
            Mode::Usb => "USB",
            Mode::CwU => "CW-U",
            Mode::Fm => "FM",
            Mode::Am => "AM",
            Mode::RttyL => "RTTY-L",
            Mode::CwL => "CW-L",
            Mode::DataL => "DATA-L",
            Mode::RttyU => "RTTY-U",
            Mode::DataFm => "DATA-FM",
            Mode::FmN => "FM-N",
            Mode::DataU => "DATA-U",
            Mode::AmN => "AM-N",
            Mode::Psk => "PSK",
            Mode::DataFmN => "DATA-FM-N",
        }
    }

    /// Comma-separated list of every mode name, for error messages
    pub fn valid_names() -> String {
        Mode::ALL
            .iter()
            .map(Mode::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Mode::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseError::InvalidMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_one_through_f() {
        let codes: String = Mode::ALL.iter().map(Mode::code).collect();
        assert_eq!(codes, "123456789ABCDEF");
    }

    #[test]
    fn test_code_lookup_roundtrip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(Mode::from_code('c'), Some(Mode::DataU));
        assert_eq!(Mode::from_code('0'), None);
        assert_eq!(Mode::from_code('G'), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("CW-U".parse::<Mode>().unwrap(), Mode::CwU);
        assert_eq!("data-fm-n".parse::<Mode>().unwrap(), Mode::DataFmN);
        assert_eq!(" USB ".parse::<Mode>().unwrap(), Mode::Usb);
    }

    #[test]
    fn test_parse_unknown_mode_lists_valid_names() {
        let err = "CW".parse::<Mode>().unwrap_err();
        assert_eq!(err, ParseError::InvalidMode("CW".into()));
        let msg = err.to_string();
        assert!(msg.contains("LSB"));
        assert!(msg.contains("DATA-FM-N"));
    }
}
