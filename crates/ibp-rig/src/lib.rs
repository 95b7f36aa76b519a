//! Transceiver control over CAT
//!
//! This crate drives a Yaesu FTdx10 through the frame codec in `ibp-cat`.
//!
//! # Architecture
//!
//! - [`Connector`] opens the transport (serial port or in-memory stream)
//! - [`Channel`] writes frames and reads until `;` with a timeout
//! - [`Transceiver`] serializes whole command cycles on one channel and
//!   publishes its [`Phase`] on a watch channel
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ibp_cat::{Frequency, Vfo};
//! use ibp_rig::Transceiver;
//!
//! # async fn run() -> Result<(), ibp_rig::RigError> {
//! let rig = Transceiver::serial("/dev/ttyUSB0", 38_400, Duration::from_millis(100));
//! rig.set_frequency(Vfo::A, "14.100".parse::<Frequency>()?).await?;
//! println!("S-meter: {}", rig.read_s_meter().await?);
//! rig.close().await;
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod controller;
pub mod error;

pub use channel::{
    Channel, Connector, SerialConnector, StreamConnector, DEFAULT_BAUD_RATE, MAX_READ_TIMEOUT,
};
pub use controller::{Phase, Transceiver, DEFAULT_READ_TIMEOUT};
pub use error::RigError;
