//! Slot monitor task
//!
//! Polls the clock at a fixed interval and reports whenever the beacon on a
//! band changes. The task owns nothing but its clock and a shared registry,
//! so it can be spawned and stopped independently of the radio.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::band::Band;
use crate::clock::Clock;
use crate::error::BeaconError;
use crate::registry::{Beacon, BeaconRegistry};
use crate::scheduler::{current_cycle, slot_for_band};

/// Default tick interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Commands accepted by a running monitor
#[derive(Debug, Clone)]
pub enum MonitorCommand {
    /// Stop the monitor
    Shutdown,
}

/// Emitted on the first tick and whenever the slot changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotUpdate {
    pub band: Band,
    /// Cycle number since UTC midnight
    pub cycle: u32,
    pub slot: usize,
    pub beacon: Beacon,
}

/// Run the slot monitor until shutdown
///
/// Exits with `Ok` when a [`MonitorCommand::Shutdown`] arrives, when the
/// command channel closes, or when the update receiver is dropped. A failed
/// registry lookup ends the task with the error.
pub async fn run_slot_monitor<C>(
    clock: C,
    band: Band,
    registry: Arc<BeaconRegistry>,
    poll_interval: Duration,
    mut cmd_rx: mpsc::Receiver<MonitorCommand>,
    update_tx: mpsc::Sender<SlotUpdate>,
) -> Result<(), BeaconError>
where
    C: Clock,
{
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_slot: Option<usize> = None;

    info!("Starting slot monitor for {}", band);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = clock.now();
                let slot = slot_for_band(now, band);
                if last_slot == Some(slot) {
                    continue;
                }
                last_slot = Some(slot);

                let update = SlotUpdate {
                    band,
                    cycle: current_cycle(now).number,
                    slot,
                    beacon: registry.lookup(slot)?.clone(),
                };
                debug!("Slot {} on {}: {}", slot, band, update.beacon.callsign);
                if update_tx.send(update).await.is_err() {
                    debug!("Slot update receiver dropped for {}", band);
                    break;
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(MonitorCommand::Shutdown) => {
                        info!("Shutdown requested for slot monitor on {}", band);
                        break;
                    }
                    None => {
                        debug!("Command channel closed for slot monitor on {}", band);
                        break;
                    }
                }
            }
        }
    }

    info!("Slot monitor ended for {}", band);
    Ok(())
}
