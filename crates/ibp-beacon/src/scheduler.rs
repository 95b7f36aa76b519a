//! Maps UTC time to the beacon on air
//!
//! The beacon day is divided into 3-minute cycles counted from UTC midnight.
//! Each cycle holds 18 slots of 10 seconds. On 20 m the slot number is the
//! beacon number; every higher band carries the beacon that was on the band
//! below it one slot earlier.

use chrono::{DateTime, Timelike, Utc};

use crate::band::Band;
use crate::error::BeaconError;
use crate::registry::{Beacon, BeaconRegistry, SLOT_COUNT};

/// Length of one beacon cycle
pub const CYCLE_SECS: u32 = 180;
/// Length of one slot
pub const SLOT_SECS: u32 = 10;

/// Position inside the beacon day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    /// Cycles completed since UTC midnight
    pub number: u32,
    /// Seconds into the current cycle, `0..180`
    pub seconds: u32,
}

impl Cycle {
    /// 20 m slot for this position
    pub fn base_slot(&self) -> usize {
        (self.seconds / SLOT_SECS) as usize
    }
}

/// Current cycle number and seconds into the cycle
pub fn current_cycle(now: DateTime<Utc>) -> Cycle {
    let since_midnight = now.hour() * 3600 + now.minute() * 60 + now.second();
    let number = since_midnight / CYCLE_SECS;
    Cycle {
        number,
        seconds: since_midnight - CYCLE_SECS * number,
    }
}

/// Slot transmitting on `band` at `now`
pub fn slot_for_band(now: DateTime<Utc>, band: Band) -> usize {
    let base = current_cycle(now).base_slot();
    (base + SLOT_COUNT - band.slot_offset()) % SLOT_COUNT
}

/// Slot transmitting at `now` on a band given as text (`"20m"`, `"14"`, ...)
pub fn get_current_slot(band: &str, now: DateTime<Utc>) -> Result<usize, BeaconError> {
    let band: Band = band.parse()?;
    let slot = slot_for_band(now, band);
    tracing::trace!(%band, slot, "current slot");
    Ok(slot)
}

/// The beacon on air on every band, in band order
pub fn transmitting_now(
    now: DateTime<Utc>,
    registry: &BeaconRegistry,
) -> Result<Vec<(Band, &Beacon)>, BeaconError> {
    Band::ALL
        .iter()
        .map(|&band| Ok((band, registry.lookup(slot_for_band(now, band))?)))
        .collect()
}
