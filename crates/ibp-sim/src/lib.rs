//! Virtual transceiver for testing without a radio
//!
//! - **VirtualTransceiver**: answers the FTdx10 CAT subset from in-memory state
//! - **run_virtual_transceiver**: serves it over any async byte stream
//!
//! # Example
//!
//! ```rust
//! use ibp_cat::Frame;
//! use ibp_sim::VirtualTransceiver;
//!
//! let mut radio = VirtualTransceiver::new();
//! radio.process_frame(&Frame::parse(b"FA014100000;").unwrap());
//!
//! let reply = radio.process_frame(&Frame::parse(b"FA;").unwrap());
//! assert_eq!(reply.as_deref(), Some("FA014100000;"));
//! ```

pub mod radio;
pub mod transceiver_task;

pub use radio::{VirtualTransceiver, VirtualTransceiverConfig};
pub use transceiver_task::{run_virtual_transceiver, TrafficEvent, VirtualTransceiverCommand};
