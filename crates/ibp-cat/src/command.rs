//! Typed CAT commands and their frame layouts
//!
//! | Command | Frames |
//! |---|---|
//! | `SetFrequency` | `FA014100000;` |
//! | `ReadFrequency` | `FA;` |
//! | `SetMode` | `MD03;` |
//! | `SetClarifierOffset` | `CF001+1500;` then `CF00010000;` |
//! | `ResetClarifiers` | `CF00000000;` then `CF001+0000;` |
//! | `ReadMeter` | `RM0;` |
//! | `ReadSMeter` | `SM0;` |
//! | `QueryInformation` | `IF;` |
//!
//! In the `CF` frames the third parameter selects what is being written:
//! `1` writes the offset, `0` writes the RX/TX on-off switches. Only the main
//! band (`0`) is ever addressed.

use std::fmt;
use std::str::FromStr;

use crate::clarifier::ClarifierOffset;
use crate::codec::{split_frames, Frame};
use crate::error::{DecodeError, ParseError};
use crate::frequency::{Frequency, FREQ_DIGITS};
use crate::mode::Mode;
use crate::EncodeCommand;

/// Main band selector used by `MD` and `CF`
const MAIN_BAND: char = '0';
/// `CF` P3 value selecting the on/off switches
const CLAR_SETTING: char = '0';
/// `CF` P3 value selecting the offset
const CLAR_FREQUENCY: char = '1';

/// VFO register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Vfo {
    /// VFO A
    A,
    /// VFO B
    B,
}

impl Vfo {
    /// Letter used in the `FA`/`FB` opcode
    pub fn letter(&self) -> char {
        match self {
            Vfo::A => 'A',
            Vfo::B => 'B',
        }
    }

    fn from_letter(c: char) -> Option<Vfo> {
        match c {
            'A' => Some(Vfo::A),
            'B' => Some(Vfo::B),
            _ => None,
        }
    }
}

impl fmt::Display for Vfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Vfo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Vfo::A),
            "B" => Ok(Vfo::B),
            _ => Err(ParseError::InvalidVfo(s.to_string())),
        }
    }
}

/// Meter selector for the `RM` command (0 or 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeterChannel(u8);

impl MeterChannel {
    /// Meter 0
    pub const PRIMARY: MeterChannel = MeterChannel(0);
    /// Meter 1
    pub const SECONDARY: MeterChannel = MeterChannel(1);

    /// Validate a channel number
    pub fn new(channel: u8) -> Result<Self, ParseError> {
        match channel {
            0 | 1 => Ok(Self(channel)),
            other => Err(ParseError::InvalidMeterChannel(other)),
        }
    }

    /// Channel number
    pub fn index(&self) -> u8 {
        self.0
    }
}

/// Command sent to the transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Tune a VFO (fire-and-forget)
    SetFrequency { vfo: Vfo, frequency: Frequency },
    /// Ask for a VFO frequency
    ReadFrequency { vfo: Vfo },
    /// Set the main-band mode (fire-and-forget)
    SetMode { mode: Mode },
    /// Write the RX clarifier offset and switch it on when non-zero
    SetClarifierOffset { offset: ClarifierOffset },
    /// Switch both clarifiers off and zero the offset
    ResetClarifiers,
    /// Read one of the two configurable meters
    ReadMeter { channel: MeterChannel },
    /// Read the main-band S-meter
    ReadSMeter,
    /// Read the `IF` status block
    QueryInformation,
}

impl Command {
    /// Returns true if the radio answers this command with a frame
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::ReadFrequency { .. }
                | Self::ReadMeter { .. }
                | Self::ReadSMeter
                | Self::QueryInformation
        )
    }

    /// Opcode of the (first) frame, for logging
    pub fn opcode(&self) -> &'static str {
        match self {
            Self::SetFrequency { vfo: Vfo::A, .. } | Self::ReadFrequency { vfo: Vfo::A } => "FA",
            Self::SetFrequency { vfo: Vfo::B, .. } | Self::ReadFrequency { vfo: Vfo::B } => "FB",
            Self::SetMode { .. } => "MD",
            Self::SetClarifierOffset { .. } | Self::ResetClarifiers => "CF",
            Self::ReadMeter { .. } => "RM",
            Self::ReadSMeter => "SM",
            Self::QueryInformation => "IF",
        }
    }

    /// Frames making up this command, in transmission order
    pub fn frames(&self) -> Vec<Frame> {
        let bodies = match self {
            Self::SetFrequency { vfo, frequency } => {
                vec![format!("F{}{}", vfo.letter(), frequency.to_field())]
            }
            Self::ReadFrequency { vfo } => vec![format!("F{}", vfo.letter())],
            Self::SetMode { mode } => vec![format!("MD{}{}", MAIN_BAND, mode.code())],
            Self::SetClarifierOffset { offset } => vec![
                clarifier_offset_body(*offset),
                clarifier_setting_body(offset.is_active()),
            ],
            Self::ResetClarifiers => vec![
                clarifier_setting_body(false),
                clarifier_offset_body(ClarifierOffset::ZERO),
            ],
            Self::ReadMeter { channel } => vec![format!("RM{}", channel.index())],
            Self::ReadSMeter => vec![format!("SM{}", MAIN_BAND)],
            Self::QueryInformation => vec!["IF".to_string()],
        };
        bodies.into_iter().map(Frame::from_body).collect()
    }
}

impl EncodeCommand for Command {
    fn encode(&self) -> Vec<u8> {
        self.frames()
            .iter()
            .flat_map(|f| f.as_bytes().iter().copied())
            .collect()
    }
}

// CF0 0 1 <dir> <mmmm>
fn clarifier_offset_body(offset: ClarifierOffset) -> String {
    format!(
        "CF{}0{}{}{}",
        MAIN_BAND,
        CLAR_FREQUENCY,
        offset.direction(),
        offset.magnitude_field()
    )
}

// CF0 0 0 <rx on/off> <tx off> 000
fn clarifier_setting_body(rx_on: bool) -> String {
    format!(
        "CF{}0{}{}0000",
        MAIN_BAND,
        CLAR_SETTING,
        if rx_on { '1' } else { '0' }
    )
}

/// One decoded `CF` frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClarifierFrame {
    Offset(ClarifierOffset),
    Setting { rx_on: bool, tx_on: bool },
}

fn parse_clarifier_frame(frame: &Frame) -> Result<ClarifierFrame, DecodeError> {
    let body = frame.body();
    let invalid = || DecodeError::InvalidField {
        field: "clarifier",
        value: body.to_string(),
    };
    if !body.starts_with("CF") {
        return Err(DecodeError::UnexpectedOpcode {
            expected: "CF",
            actual: frame.opcode().to_string(),
        });
    }
    let params: Vec<char> = body[2..].chars().collect();
    if params.len() < 8 {
        return Err(DecodeError::TooShort {
            opcode: "CF",
            expected: 10,
            actual: body.len(),
        });
    }
    if params.len() > 8 {
        return Err(invalid());
    }
    if params[0] != MAIN_BAND || params[1] != '0' {
        return Err(invalid());
    }
    match params[2] {
        CLAR_FREQUENCY => {
            let magnitude: String = params[4..8].iter().collect();
            ClarifierOffset::from_fields(params[3], &magnitude)
                .map(ClarifierFrame::Offset)
                .ok_or_else(invalid)
        }
        CLAR_SETTING => {
            let flag = |c: char| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(invalid()),
            };
            if params[5..8].iter().any(|c| *c != '0') {
                return Err(invalid());
            }
            Ok(ClarifierFrame::Setting {
                rx_on: flag(params[3])?,
                tx_on: flag(params[4])?,
            })
        }
        _ => Err(invalid()),
    }
}

/// Parse an encoded command (one or two frames) back into a [`Command`]
pub fn decode_command(bytes: &[u8]) -> Result<Command, DecodeError> {
    let frames = split_frames(bytes)?;
    match frames.as_slice() {
        [frame] => decode_single(frame),
        [first, second] => {
            let pair = (parse_clarifier_frame(first)?, parse_clarifier_frame(second)?);
            match pair {
                (
                    ClarifierFrame::Offset(offset),
                    ClarifierFrame::Setting {
                        rx_on,
                        tx_on: false,
                    },
                ) if rx_on == offset.is_active() => Ok(Command::SetClarifierOffset { offset }),
                (
                    ClarifierFrame::Setting {
                        rx_on: false,
                        tx_on: false,
                    },
                    ClarifierFrame::Offset(ClarifierOffset::ZERO),
                ) => Ok(Command::ResetClarifiers),
                _ => Err(DecodeError::InvalidFrame(format!(
                    "unrecognized clarifier sequence {first}{second}"
                ))),
            }
        }
        _ => Err(DecodeError::InvalidFrame(format!(
            "expected one or two frames, got {}",
            frames.len()
        ))),
    }
}

fn decode_single(frame: &Frame) -> Result<Command, DecodeError> {
    let body = frame.body();
    let chars: Vec<char> = body.chars().collect();
    let invalid = |field: &'static str| DecodeError::InvalidField {
        field,
        value: body.to_string(),
    };

    match frame.opcode() {
        "FA" | "FB" => {
            let vfo = Vfo::from_letter(chars[1]).ok_or_else(|| invalid("vfo"))?;
            if chars.len() == 2 {
                return Ok(Command::ReadFrequency { vfo });
            }
            let field = &body[2..];
            if field.len() != FREQ_DIGITS || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("frequency"));
            }
            let hz: u64 = field.parse().map_err(|_| invalid("frequency"))?;
            let frequency = Frequency::from_hz(hz).map_err(|_| invalid("frequency"))?;
            Ok(Command::SetFrequency { vfo, frequency })
        }
        "MD" => {
            if chars.len() != 4 || chars[2] != MAIN_BAND {
                return Err(invalid("mode"));
            }
            let mode = Mode::from_code(chars[3]).ok_or_else(|| invalid("mode"))?;
            Ok(Command::SetMode { mode })
        }
        "RM" => {
            if chars.len() != 3 {
                return Err(invalid("meter channel"));
            }
            let index = chars[2].to_digit(10).ok_or_else(|| invalid("meter channel"))?;
            let channel = MeterChannel::new(index as u8).map_err(|_| invalid("meter channel"))?;
            Ok(Command::ReadMeter { channel })
        }
        "SM" if body == "SM0" => Ok(Command::ReadSMeter),
        "IF" if body == "IF" => Ok(Command::QueryInformation),
        other => Err(DecodeError::InvalidFrame(format!(
            "not a command frame: {other:?} in {frame}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(hz: u64) -> Frequency {
        Frequency::from_hz(hz).unwrap()
    }

    #[test]
    fn test_encode_set_frequency() {
        let cmd = Command::SetFrequency {
            vfo: Vfo::A,
            frequency: freq(14_100_000),
        };
        assert_eq!(cmd.encode(), b"FA014100000;");

        let cmd = Command::SetFrequency {
            vfo: Vfo::B,
            frequency: freq(7_074_000),
        };
        assert_eq!(cmd.encode(), b"FB007074000;");
    }

    #[test]
    fn test_encode_queries() {
        assert_eq!(Command::ReadFrequency { vfo: Vfo::A }.encode(), b"FA;");
        assert_eq!(Command::ReadSMeter.encode(), b"SM0;");
        assert_eq!(Command::QueryInformation.encode(), b"IF;");
        assert_eq!(
            Command::ReadMeter {
                channel: MeterChannel::SECONDARY
            }
            .encode(),
            b"RM1;"
        );
    }

    #[test]
    fn test_encode_mode() {
        assert_eq!(Command::SetMode { mode: Mode::CwU }.encode(), b"MD03;");
        assert_eq!(Command::SetMode { mode: Mode::DataU }.encode(), b"MD0C;");
        assert_eq!(Command::SetMode { mode: Mode::DataFmN }.encode(), b"MD0F;");
    }

    #[test]
    fn test_encode_clarifier() {
        let cmd = Command::SetClarifierOffset {
            offset: ClarifierOffset::new(1502).unwrap(),
        };
        assert_eq!(cmd.encode(), b"CF001+1502;CF00010000;");

        let cmd = Command::SetClarifierOffset {
            offset: ClarifierOffset::new(-5000).unwrap(),
        };
        assert_eq!(cmd.encode(), b"CF001-5000;CF00010000;");

        // A zero offset switches the RX clarifier off
        let cmd = Command::SetClarifierOffset {
            offset: ClarifierOffset::ZERO,
        };
        assert_eq!(cmd.encode(), b"CF001+0000;CF00000000;");
    }

    #[test]
    fn test_encode_reset_clarifiers() {
        assert_eq!(
            Command::ResetClarifiers.encode(),
            b"CF00000000;CF001+0000;"
        );
    }

    #[test]
    fn test_decode_commands() {
        assert_eq!(
            decode_command(b"FA014100000;").unwrap(),
            Command::SetFrequency {
                vfo: Vfo::A,
                frequency: freq(14_100_000)
            }
        );
        assert_eq!(
            decode_command(b"CF00000000;CF001+0000;").unwrap(),
            Command::ResetClarifiers
        );
        assert_eq!(
            decode_command(b"RM0;").unwrap(),
            Command::ReadMeter {
                channel: MeterChannel::PRIMARY
            }
        );
    }

    #[test]
    fn test_decode_rejects_inconsistent_clarifier_pair() {
        // Non-zero offset with the clarifier switched off is not something we send
        assert!(decode_command(b"CF001+0100;CF00000000;").is_err());
        assert!(decode_command(b"CF001+0100;CF001+0100;").is_err());
        assert!(decode_command(b"CF001+0100;").is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_command(b"FA01410000;").is_err());
        assert!(decode_command(b"FC;").is_err());
        assert!(decode_command(b"MD0G;").is_err());
        assert!(decode_command(b"RM2;").is_err());
        assert!(decode_command(b"ZZ;").is_err());
        assert!(decode_command(b"F;").is_err());
        assert!(decode_command(b"").is_err());
        assert!(decode_command(b"IF;IF;IF;").is_err());
    }

    #[test]
    fn test_vfo_and_meter_channel_parsing() {
        assert_eq!("a".parse::<Vfo>().unwrap(), Vfo::A);
        assert_eq!("B".parse::<Vfo>().unwrap(), Vfo::B);
        assert!("C".parse::<Vfo>().is_err());
        assert!(MeterChannel::new(1).is_ok());
        assert_eq!(
            MeterChannel::new(2),
            Err(ParseError::InvalidMeterChannel(2))
        );
    }
}
