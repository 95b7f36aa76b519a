//! Decoding of responses read back from the radio
//!
//! All responses use fixed-width fields, so decoding is positional. Positions
//! below count from the first opcode letter (index 0), terminator excluded.
//!
//! ```text
//! IF 001 007075290 +0000 0 0 1 0 0 00 0 ;
//!    |   |         |     | | | | | |  |
//!    2   5         14    19| 21| 23|  25+
//!                          20  22  24
//! ```

use std::fmt;

use crate::clarifier::ClarifierOffset;
use crate::command::Vfo;
use crate::error::DecodeError;
use crate::frequency::{Frequency, FREQ_DIGITS};
use crate::mode::Mode;

/// `RM`/`SM` responses: opcode, selector digit, 3-digit value
const METER_MIN_LEN: usize = 6;
/// Position of the 3-digit meter value
const METER_VALUE: std::ops::Range<usize> = 3..6;

/// `IF` responses must reach the repeater-shift field at position 25
const INFO_MIN_LEN: usize = 26;

/// `FA`/`FB` responses: opcode plus 9-digit frequency
const FREQUENCY_LEN: usize = 2 + FREQ_DIGITS;

/// Meter type reported in position 2 of an `RM` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeterKind {
    /// S-meter
    S,
    /// Compression
    Comp,
    /// ALC
    Alc,
    /// Power output
    Po,
    /// Standing wave ratio
    Swr,
    /// Final stage drain current
    Idd,
    /// Supply voltage
    Vdd,
    /// Code reserved by the radio (`2` and `9`)
    Unassigned,
}

impl MeterKind {
    /// Look up a meter kind from its digit
    pub fn from_code(c: char) -> Option<MeterKind> {
        let kind = match c {
            '1' => MeterKind::S,
            '2' | '9' => MeterKind::Unassigned,
            '3' => MeterKind::Comp,
            '4' => MeterKind::Alc,
            '5' => MeterKind::Po,
            '6' => MeterKind::Swr,
            '7' => MeterKind::Idd,
            '8' => MeterKind::Vdd,
            _ => return None,
        };
        Some(kind)
    }

    /// Label as shown on the radio
    pub fn label(&self) -> &'static str {
        match self {
            MeterKind::S => "S",
            MeterKind::Comp => "COMP",
            MeterKind::Alc => "ALC",
            MeterKind::Po => "PO",
            MeterKind::Swr => "SWR",
            MeterKind::Idd => "IDD",
            MeterKind::Vdd => "VDD",
            MeterKind::Unassigned => "-",
        }
    }
}

impl fmt::Display for MeterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decoded `RM` response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeterReading {
    /// Meter type, `None` when the radio reports a code outside the table
    pub kind: Option<MeterKind>,
    /// Raw meter value (0-255)
    pub value: u16,
}

/// VFO / memory state reported in `IF` position 22
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TuningMode {
    Vfo,
    Memory,
    MemoryTune,
    /// Quick Memory Bank
    Qmb,
    /// Programmable Memory Scan
    Pms,
}

impl TuningMode {
    fn from_code(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Vfo),
            '1' => Some(Self::Memory),
            '2' => Some(Self::MemoryTune),
            '3' => Some(Self::Qmb),
            // Firmware revisions disagree on the PMS code
            '4' | '5' => Some(Self::Pms),
            _ => None,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vfo => "VFO",
            Self::Memory => "Memory",
            Self::MemoryTune => "Memory Tune",
            Self::Qmb => "Quick Memory Bank (QMB)",
            Self::Pms => "PMS",
        }
    }
}

/// CTCSS state reported in `IF` position 23
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CtcssMode {
    Off,
    EncodeDecode,
    Encode,
}

impl CtcssMode {
    fn from_code(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Off),
            '1' => Some(Self::EncodeDecode),
            '2' => Some(Self::Encode),
            _ => None,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "CTCSS Off",
            Self::EncodeDecode => "CTCSS ENC/DEC",
            Self::Encode => "CTCSS ENC",
        }
    }
}

/// Repeater shift reported in `IF` position 25
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RepeaterShift {
    Simplex,
    Plus,
    Minus,
}

impl RepeaterShift {
    fn from_code(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Simplex),
            '1' => Some(Self::Plus),
            '2' => Some(Self::Minus),
            _ => None,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Simplex => "Repeater Simplex",
            Self::Plus => "Repeater Plus Shift",
            Self::Minus => "Repeater Minus Shift",
        }
    }
}

/// Decoded `IF` status block
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Information {
    /// Memory / emergency channel field, kept verbatim (`001`, `P1L`, `EMG`, ...)
    pub memory_channel: String,
    /// VFO-A frequency
    pub frequency_hz: u64,
    /// Clarifier offset
    pub clarifier: ClarifierOffset,
    /// RX clarifier switched on
    pub rx_clarifier: bool,
    /// TX clarifier switched on
    pub tx_clarifier: bool,
    /// Operating mode
    pub mode: Mode,
    /// VFO / memory state
    pub tuning_mode: TuningMode,
    /// CTCSS state
    pub ctcss: CtcssMode,
    /// Repeater shift
    pub repeater: RepeaterShift,
}

fn body_of(frame: &str) -> &str {
    frame.strip_suffix(';').unwrap_or(frame)
}

fn expect_opcode(
    body: &str,
    opcode: &'static str,
    min_len: usize,
) -> Result<Vec<char>, DecodeError> {
    if !body.starts_with(opcode) {
        return Err(DecodeError::UnexpectedOpcode {
            expected: opcode,
            actual: body.chars().take(2).collect(),
        });
    }
    if !body.is_ascii() {
        return Err(DecodeError::InvalidFrame(format!("non-ASCII {opcode} frame")));
    }
    if body.len() < min_len {
        return Err(DecodeError::TooShort {
            opcode,
            expected: min_len,
            actual: body.len(),
        });
    }
    Ok(body.chars().collect())
}

fn digits<T: std::str::FromStr>(
    body: &str,
    range: std::ops::Range<usize>,
    field: &'static str,
) -> Result<T, DecodeError> {
    let text = &body[range];
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidField {
            field,
            value: text.to_string(),
        });
    }
    text.parse().map_err(|_| DecodeError::InvalidField {
        field,
        value: text.to_string(),
    })
}

fn flag(c: char, field: &'static str) -> Result<bool, DecodeError> {
    match c {
        '0' => Ok(false),
        '1' => Ok(true),
        other => Err(DecodeError::InvalidField {
            field,
            value: other.to_string(),
        }),
    }
}

fn coded<T>(c: char, field: &'static str, lookup: fn(char) -> Option<T>) -> Result<T, DecodeError> {
    lookup(c).ok_or_else(|| DecodeError::InvalidField {
        field,
        value: c.to_string(),
    })
}

/// Decode an `RM` response
pub fn decode_meter(frame: &str) -> Result<MeterReading, DecodeError> {
    let body = body_of(frame);
    let chars = expect_opcode(body, "RM", METER_MIN_LEN)?;
    let value = digits(body, METER_VALUE, "meter value")?;
    Ok(MeterReading {
        kind: MeterKind::from_code(chars[2]),
        value,
    })
}

/// Decode an `SM` response into the raw S-meter value
pub fn decode_s_meter(frame: &str) -> Result<u16, DecodeError> {
    let body = body_of(frame);
    expect_opcode(body, "SM", METER_MIN_LEN)?;
    digits(body, METER_VALUE, "S-meter value")
}

/// Decode an `FA`/`FB` response
pub fn decode_frequency(frame: &str, vfo: Vfo) -> Result<Frequency, DecodeError> {
    let body = body_of(frame);
    let opcode = match vfo {
        Vfo::A => "FA",
        Vfo::B => "FB",
    };
    expect_opcode(body, opcode, FREQUENCY_LEN)?;
    let hz: u64 = digits(body, 2..FREQUENCY_LEN, "frequency")?;
    Frequency::from_hz(hz).map_err(|_| DecodeError::InvalidField {
        field: "frequency",
        value: hz.to_string(),
    })
}

/// Decode an `IF` response
pub fn decode_information(frame: &str) -> Result<Information, DecodeError> {
    let body = body_of(frame);
    let c = expect_opcode(body, "IF", INFO_MIN_LEN)?;

    let clarifier = ClarifierOffset::from_fields(c[14], &body[15..19]).ok_or_else(|| {
        DecodeError::InvalidField {
            field: "clarifier",
            value: body[14..19].to_string(),
        }
    })?;

    Ok(Information {
        memory_channel: body[2..5].to_string(),
        frequency_hz: digits(body, 5..14, "frequency")?,
        clarifier,
        rx_clarifier: flag(c[19], "rx clarifier")?,
        tx_clarifier: flag(c[20], "tx clarifier")?,
        mode: coded(c[21], "mode", Mode::from_code)?,
        tuning_mode: coded(c[22], "tuning mode", TuningMode::from_code)?,
        ctcss: coded(c[23], "ctcss", CtcssMode::from_code)?,
        repeater: coded(c[25], "repeater shift", RepeaterShift::from_code)?,
    })
}

/// Meter type label of an `RM` response, or `""` when unknown or malformed
pub fn metervalue_type(frame: &str) -> &'static str {
    decode_meter(frame)
        .ok()
        .and_then(|r| r.kind)
        .map(|k| k.label())
        .unwrap_or("")
}

/// Meter value of an `RM` response
pub fn metervalue_to_int(frame: &str) -> Result<u16, DecodeError> {
    decode_meter(frame).map(|r| r.value)
}
