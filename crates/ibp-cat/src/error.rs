//! Error types for CAT input normalization and response decoding

use thiserror::Error;

/// Errors raised while normalizing caller input into canonical command values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Frequency is malformed or outside the 9-digit Hz range
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Clarifier offset is not a signed integer
    #[error("invalid clarifier offset: {0}")]
    InvalidOffset(String),

    /// Mode name is not one of the 15 supported modes
    #[error("invalid mode {0:?}; valid modes are {valid}", valid = crate::Mode::valid_names())]
    InvalidMode(String),

    /// VFO identifier is not `A` or `B`
    #[error("invalid VFO {0:?}; expected A or B")]
    InvalidVfo(String),

    /// Meter channel is not 0 or 1
    #[error("invalid meter channel {0}; expected 0 or 1")]
    InvalidMeterChannel(u8),
}

/// Errors raised while decoding a frame received from (or destined for) the radio
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame is shorter than the fixed width of its layout
    #[error("{opcode} frame too short: need {expected} chars, got {actual}")]
    TooShort {
        opcode: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Frame does not start with the opcode the layout requires
    #[error("unexpected opcode: expected {expected}, got {actual:?}")]
    UnexpectedOpcode {
        expected: &'static str,
        actual: String,
    },

    /// A fixed-width field holds a value outside its code table
    #[error("invalid {field} field: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// Structurally invalid frame (missing terminator, non-ASCII, wrong frame count)
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
