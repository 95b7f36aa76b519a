//! Error types for beacon lookup and scheduling

use thiserror::Error;

use crate::registry::SLOT_COUNT;

/// Errors raised by the registry and scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeaconError {
    /// Band input that is neither a supported MHz value nor a meter value
    #[error("unsupported band {0:?}, valid bands are 20m (14), 17m (18), 15m (21), 12m (24), 10m (28)")]
    InvalidBand(String),

    /// Slot index outside the cycle
    #[error("slot {0} out of range, valid slots are 0-{max}", max = SLOT_COUNT - 1)]
    SlotOutOfRange(usize),

    /// Lookup against a registry with no beacons loaded
    #[error("beacon registry is not populated")]
    Unpopulated,

    /// Beacon table that breaks the one-beacon-per-slot layout
    #[error("invalid beacon table: {0}")]
    InvalidTable(String),
}
