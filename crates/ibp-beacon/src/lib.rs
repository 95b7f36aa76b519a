//! NCDXF/IARU International Beacon Project
//!
//! Eighteen beacon stations take turns transmitting on five HF bands. Each
//! transmission lasts 10 seconds and a full rotation takes 3 minutes, so the
//! station on air on any band follows directly from UTC time.
//!
//! - [`BeaconRegistry`]: the 18 stations in transmission order
//! - [`scheduler`]: time to cycle and slot arithmetic
//! - [`run_slot_monitor`]: cancellable task reporting slot changes
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ibp_beacon::{get_current_slot, BeaconRegistry};
//!
//! let registry = BeaconRegistry::ncdxf();
//! let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//!
//! let slot = get_current_slot("17m", midnight).unwrap();
//! assert_eq!(registry.get_beacon(slot).unwrap().callsign, "YV5B");
//! ```

pub mod band;
pub mod clock;
pub mod error;
pub mod monitor;
pub mod registry;
pub mod scheduler;

pub use band::Band;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::BeaconError;
pub use monitor::{run_slot_monitor, MonitorCommand, SlotUpdate, DEFAULT_POLL_INTERVAL};
pub use registry::{Beacon, BeaconRegistry, SLOT_COUNT};
pub use scheduler::{
    current_cycle, get_current_slot, slot_for_band, transmitting_now, Cycle, CYCLE_SECS,
    SLOT_SECS,
};
