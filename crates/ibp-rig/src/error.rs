//! Error types for the transceiver controller

use ibp_cat::{DecodeError, ParseError};
use thiserror::Error;

/// Errors that can occur while talking to the radio
#[derive(Debug, Error)]
pub enum RigError {
    /// The channel could not be opened
    #[error("CAT channel {port} unavailable: {source}")]
    ChannelUnavailable {
        /// Port or stream name
        port: String,
        #[source]
        source: std::io::Error,
    },

    /// Read or write failed on an open channel
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A query got no reply in time
    #[error("no reply to {opcode} within {timeout_ms} ms")]
    Timeout {
        /// Opcode of the unanswered query
        opcode: String,
        timeout_ms: u64,
    },

    /// The radio answered `?;`
    #[error("radio rejected {0}")]
    Rejected(String),

    /// The other end hung up
    #[error("CAT channel closed")]
    ChannelClosed,

    /// Invalid input value
    #[error("invalid input: {0}")]
    Parse(#[from] ParseError),

    /// Malformed reply
    #[error("malformed reply: {0}")]
    Decode(#[from] DecodeError),
}

impl RigError {
    /// Whether the channel must be dropped and reopened after this error
    pub fn is_fatal_to_channel(&self) -> bool {
        matches!(self, RigError::Io(_) | RigError::ChannelClosed)
    }
}
