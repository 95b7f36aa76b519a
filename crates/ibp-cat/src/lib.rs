//! CAT protocol codec for Yaesu FTdx-series transceivers
//!
//! The FTdx10 speaks an ASCII protocol: every frame starts with a two-letter
//! opcode, carries fixed-width parameter fields and ends with `;`. This crate
//! covers the subset needed to tune to and monitor beacon transmissions:
//!
//! - [`Command`]: typed outbound commands and their frame encoding
//! - [`CatCodec`]: streaming frame extraction for bytes read from the radio
//! - [`response`]: positional decoding of `FA`/`FB`, `RM`, `SM` and `IF` replies
//! - [`Frequency`], [`ClarifierOffset`], [`Mode`], [`Vfo`]: boundary types
//!   parsed once from user input and trusted from then on
//!
//! The same bytes mean different things depending on direction:
//! - `FA014100000;` TO the radio = set VFO-A
//! - `FA014100000;` FROM the radio = frequency report
//! - `FA;` TO the radio = query VFO-A
//!
//! # Example
//!
//! ```rust
//! use ibp_cat::{CatCodec, Command, EncodeCommand, Frequency, ProtocolCodec, Vfo};
//!
//! let cmd = Command::SetFrequency {
//!     vfo: Vfo::A,
//!     frequency: "14.100".parse::<Frequency>().unwrap(),
//! };
//! assert_eq!(cmd.encode(), b"FA014100000;");
//!
//! let mut codec = CatCodec::new();
//! codec.push_bytes(b"SM0007;");
//! let frame = codec.next_item().unwrap().unwrap();
//! assert_eq!(ibp_cat::response::decode_s_meter(frame.as_str()), Ok(7));
//! ```

pub mod clarifier;
pub mod codec;
pub mod command;
pub mod error;
pub mod frequency;
pub mod mode;
pub mod response;

pub use clarifier::{offset_to_str, ClarifierOffset, MAX_CLARIFIER_HZ};
pub use codec::{split_frames, CatCodec, Frame, TERMINATOR};
pub use command::{decode_command, Command, MeterChannel, Vfo};
pub use error::{DecodeError, ParseError};
pub use frequency::{Frequency, FREQ_DIGITS, MAX_FREQUENCY_HZ};
pub use mode::Mode;
pub use response::{
    decode_frequency, decode_information, decode_meter, decode_s_meter, metervalue_to_int,
    metervalue_type, CtcssMode, Information, MeterKind, MeterReading, RepeaterShift, TuningMode,
};

/// Trait for codecs that parse incoming data streams
pub trait ProtocolCodec {
    /// The item type produced by this codec
    type Item;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete item from the buffer
    fn next_item(&mut self) -> Option<Self::Item>;

    /// Clear the internal buffer
    fn clear(&mut self);
}

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}
