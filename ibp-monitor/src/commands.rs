//! Subcommand handlers

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use ibp_beacon::{
    current_cycle, run_slot_monitor, transmitting_now, Band, BeaconRegistry, MonitorCommand,
    SlotUpdate, SystemClock,
};
use ibp_cat::{Information, MeterReading};
use ibp_rig::{Connector, StreamConnector, Transceiver};
use ibp_sim::{run_virtual_transceiver, VirtualTransceiver, VirtualTransceiverCommand};
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::parse_scan_delay;
use crate::{Command, Session};

pub fn print_beacons(registry: &BeaconRegistry) {
    for beacon in registry.iter() {
        println!("{}", beacon);
    }
}

pub fn print_now(registry: &BeaconRegistry) -> Result<()> {
    let now = Utc::now();
    let on_air = transmitting_now(now, registry)?;
    println!(
        "{} UTC, cycle {}",
        now.format("%H:%M:%S"),
        current_cycle(now).number
    );
    for (band, beacon) in on_air {
        println!(
            "{:>4} {:>8.3} MHz  {}",
            band.to_string(),
            band.beacon_frequency_hz() as f64 / 1e6,
            beacon
        );
    }
    Ok(())
}

fn format_update(update: &SlotUpdate, now: DateTime<Utc>) -> String {
    let beacon = &update.beacon;
    format!(
        "{} UTC  {:>4}  slot {:>2}  {:<7} {}, {} ({})",
        now.format("%H:%M:%S"),
        update.band.to_string(),
        update.slot,
        beacon.callsign,
        beacon.city,
        beacon.country,
        beacon.grid
    )
}

/// Print the beacon on air for `band` every time the slot changes, until Ctrl+C
pub async fn show(band: Band, registry: BeaconRegistry, poll_interval: Duration) -> Result<()> {
    let (cmd_tx, cmd_rx) = mpsc::channel(1);
    let (update_tx, mut update_rx) = mpsc::channel(16);
    let monitor = tokio::spawn(run_slot_monitor(
        SystemClock,
        band,
        Arc::new(registry),
        poll_interval,
        cmd_rx,
        update_tx,
    ));

    println!(
        "Following {} ({:.3} MHz), Ctrl+C to stop",
        band,
        band.beacon_frequency_hz() as f64 / 1e6
    );

    loop {
        tokio::select! {
            update = update_rx.recv() => match update {
                Some(update) => println!("{}", format_update(&update, Utc::now())),
                None => break,
            },
            _ = signal::ctrl_c() => {
                println!("Interrupted, stopping");
                let _ = cmd_tx.send(MonitorCommand::Shutdown).await;
                break;
            }
        }
    }
    drop(update_rx);

    monitor.await.context("slot monitor task failed")??;
    Ok(())
}

/// Open the transceiver (real or simulated), run `command`, and close it
pub async fn with_rig(session: &Session, command: &Command, registry: BeaconRegistry) -> Result<()> {
    let read_timeout = session.config.read_timeout();

    if session.simulate {
        info!("Using virtual transceiver");
        let (pc, radio_end) = tokio::io::duplex(1024);
        let (sim_tx, sim_rx) = mpsc::channel(4);
        let (traffic_tx, _) = broadcast::channel(64);
        let sim = tokio::spawn(run_virtual_transceiver(
            radio_end,
            VirtualTransceiver::new(),
            sim_rx,
            traffic_tx,
        ));

        let rig = Transceiver::new(StreamConnector::new("simulator", pc), read_timeout);
        let result = execute(&rig, session, command, registry).await;
        rig.close().await;

        let _ = sim_tx.send(VirtualTransceiverCommand::Shutdown).await;
        match sim.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("Virtual transceiver failed: {}", e),
            Err(e) => warn!("Virtual transceiver task failed: {}", e),
        }
        return result;
    }

    let Some(port) = session.port.as_deref() else {
        bail!("no serial port configured; pass --port, set \"port\" in the config file, or use --simulate");
    };
    let rig = Transceiver::serial(port, session.baud_rate, read_timeout);
    let result = execute(&rig, session, command, registry).await;
    rig.close().await;
    result
}

async fn execute<C: Connector>(
    rig: &Transceiver<C>,
    session: &Session,
    command: &Command,
    registry: BeaconRegistry,
) -> Result<()> {
    let config = &session.config;

    match command {
        Command::Show { band, tune } => {
            if *tune {
                let frequency = rig
                    .tune_to_band(*band)
                    .await
                    .with_context(|| format!("failed to tune to {}", band))?;
                println!("Tuned VFO-A to {} CW-U", frequency);
            }
            show(*band, registry, config.poll_interval()).await
        }
        Command::Freq { frequency, vfo } => {
            rig.set_frequency(*vfo, *frequency)
                .await
                .context("failed to set frequency")?;
            println!("VFO-{}: {}", vfo, frequency);
            Ok(())
        }
        Command::Mode { mode } => {
            rig.set_mode(*mode).await.context("failed to set mode")?;
            println!("Mode: {}", mode);
            Ok(())
        }
        Command::Clarifier { rx, reset } => {
            if rx.is_none() && !reset {
                bail!("nothing to do; pass --rx <offset> and/or --reset");
            }
            if *reset {
                rig.reset_clarifiers()
                    .await
                    .context("failed to reset clarifiers")?;
                println!("Clarifiers reset");
            }
            if let Some(offset) = rx {
                rig.set_clarifier(*offset)
                    .await
                    .context("failed to set clarifier")?;
                println!("RX clarifier: {}", offset);
            }
            Ok(())
        }
        Command::Meter { watch: false } => {
            let (first, second) = rig.read_meter().await.context("failed to read meters")?;
            println!("{}", format_meter(&first));
            println!("{}", format_meter(&second));
            Ok(())
        }
        Command::Meter { watch: true } => watch_s_meter(rig, config.poll_interval()).await,
        Command::Info => {
            let info = rig
                .query_information()
                .await
                .context("failed to query status")?;
            print_information(&info);
            Ok(())
        }
        Command::Scan { delay } => {
            let delay = match delay {
                Some(secs) => parse_scan_delay(*secs)?,
                None => config.scan_delay(),
            };
            println!("Scanning beacon frequencies, {:.1} s each", delay.as_secs_f64());
            rig.scan_beacon_frequencies(delay)
                .await
                .context("scan failed")?;
            println!("Scan complete, VFO-A restored");
            Ok(())
        }
        Command::Now | Command::Beacons => bail!("{:?} does not use the transceiver", command),
    }
}

async fn watch_s_meter<C: Connector>(rig: &Transceiver<C>, poll_interval: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let value = rig.read_s_meter().await.context("failed to read S-meter")?;
                println!("S: {:3}", value);
            }
            _ = signal::ctrl_c() => {
                println!("Interrupted, stopping");
                debug!("S-meter watch cancelled");
                return Ok(());
            }
        }
    }
}

fn format_meter(reading: &MeterReading) -> String {
    let label = reading.kind.map(|kind| kind.label()).unwrap_or("unknown");
    format!("{:<5} {:3}", label, reading.value)
}

fn print_information(info: &Information) {
    println!("Channel:    {}", info.memory_channel);
    println!("Frequency:  {:.6} MHz", info.frequency_hz as f64 / 1e6);
    println!(
        "Clarifier:  {} (RX {}, TX {})",
        info.clarifier,
        on_off(info.rx_clarifier),
        on_off(info.tx_clarifier)
    );
    println!("Mode:       {}", info.mode);
    println!("Tuning:     {}", info.tuning_mode.label());
    println!("CTCSS:      {}", info.ctcss.label());
    println!("Repeater:   {}", info.repeater.label());
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
