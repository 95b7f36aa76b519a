//! ibp-monitor - follow the NCDXF/IARU beacon network from the command line
//!
//! Shows which beacon is on air for a band, lists the beacon table and
//! drives a Yaesu FTdx10 over CAT (or a built-in simulator with
//! `--simulate`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ibp_beacon::Band;
use ibp_cat::{ClarifierOffset, Frequency, Mode, Vfo};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use crate::config::Config;

const DEFAULT_LOG_FILTER: &str =
    "ibp_monitor=info,ibp_cat=info,ibp_beacon=info,ibp_rig=info,ibp_sim=info";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/ibp-monitor/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Serial port of the transceiver
    #[arg(long, global = true, value_name = "PATH")]
    port: Option<String>,
    /// Serial baud rate
    #[arg(long, global = true)]
    baud: Option<u32>,
    /// Talk to a virtual transceiver instead of a serial port
    #[arg(long, global = true)]
    simulate: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Follow the beacon on air for a band until Ctrl+C
    Show {
        /// Band as meters or MHz (20, 17m, 21, 28.2 ...)
        #[arg(long)]
        band: Band,
        /// Tune the radio to the band's beacon frequency in CW-U first
        #[arg(long)]
        tune: bool,
    },
    /// List the beacons transmitting right now
    Now,
    /// List the beacon table
    Beacons,
    /// Set a VFO frequency
    Freq {
        /// Frequency in MHz, Hz or the 9-digit CAT field
        frequency: Frequency,
        #[arg(long, default_value = "A")]
        vfo: Vfo,
    },
    /// Set the operating mode
    Mode {
        /// LSB, USB, CW-U, FM, AM, RTTY-L, CW-L, DATA-L, RTTY-U, DATA-FM,
        /// FM-N, DATA-U, AM-N, PSK or DATA-FM-N
        mode: Mode,
    },
    /// Set or reset the clarifier
    Clarifier {
        /// RX clarifier offset in Hz (-9999..=9999)
        #[arg(long, allow_hyphen_values = true)]
        rx: Option<ClarifierOffset>,
        /// Zero the offset and switch both clarifiers off
        #[arg(long)]
        reset: bool,
    },
    /// Read the meters
    Meter {
        /// Poll the S-meter every poll interval until Ctrl+C
        #[arg(long)]
        watch: bool,
    },
    /// Show the transceiver status block
    Info,
    /// Step through the five beacon frequencies, then restore VFO-A
    Scan {
        /// Seconds to stay on each frequency
        #[arg(long)]
        delay: Option<f64>,
    },
}

impl Command {
    fn needs_rig(&self) -> bool {
        match self {
            Command::Now | Command::Beacons => false,
            Command::Show { tune, .. } => *tune,
            _ => true,
        }
    }
}

/// Connection settings after merging flags over the config file
#[derive(Debug, Clone)]
pub struct Session {
    pub config: Config,
    pub port: Option<String>,
    pub baud_rate: u32,
    pub simulate: bool,
}

fn init_tracing(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let registry = config.registry()?;
    let session = Session {
        port: cli.port.or_else(|| config.port.clone()),
        baud_rate: cli.baud.unwrap_or(config.baud_rate),
        simulate: cli.simulate,
        config,
    };

    match &cli.command {
        Command::Now => commands::print_now(&registry),
        Command::Beacons => {
            commands::print_beacons(&registry);
            Ok(())
        }
        Command::Show { band, tune: false } => {
            commands::show(*band, registry, session.config.poll_interval()).await
        }
        command => {
            debug_assert!(command.needs_rig());
            commands::with_rig(&session, command, registry).await
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_level.as_deref());
    tracing::debug!("Starting ibp-monitor {}", env!("CARGO_PKG_VERSION"));

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ibp-monitor").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_show_arguments() {
        let cli = parse(&["show", "--band", "17m", "--tune"]);
        match cli.command {
            Command::Show { band, tune } => {
                assert_eq!(band, Band::Band17m);
                assert!(tune);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = parse(&["show", "--band", "28.2"]);
        assert!(!cli.command.needs_rig());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["info", "--simulate", "--baud", "9600"]);
        assert!(cli.simulate);
        assert_eq!(cli.baud, Some(9600));
        assert!(cli.command.needs_rig());
    }

    #[test]
    fn test_freq_arguments() {
        let cli = parse(&["freq", "14.1", "--vfo", "b"]);
        match cli.command {
            Command::Freq { frequency, vfo } => {
                assert_eq!(frequency.hz(), 14_100_000);
                assert_eq!(vfo, Vfo::B);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_negative_clarifier_offset() {
        let cli = parse(&["clarifier", "--rx", "-250"]);
        match cli.command {
            Command::Clarifier { rx, reset } => {
                assert_eq!(rx.map(|o| o.hz()), Some(-250));
                assert!(!reset);
            }
            other => panic!("unexpected command {:?}", other),
        }

        // Out of range offsets fall back to zero
        let cli = parse(&["clarifier", "--rx", "12000", "--reset"]);
        match cli.command {
            Command::Clarifier { rx, reset } => {
                assert_eq!(rx, Some(ClarifierOffset::ZERO));
                assert!(reset);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_input_rejected() {
        let args = |a: &[&str]| {
            Cli::try_parse_from(std::iter::once("ibp-monitor").chain(a.iter().copied()))
        };
        assert!(args(&["show", "--band", "40"]).is_err());
        assert!(args(&["mode", "SSB"]).is_err());
        assert!(args(&["freq", "abc"]).is_err());
        assert!(args(&["clarifier", "--rx", "12k"]).is_err());
        assert!(args(&[]).is_err());
    }

    #[test]
    fn test_beacon_commands_do_not_need_rig() {
        assert!(!parse(&["now"]).command.needs_rig());
        assert!(!parse(&["beacons"]).command.needs_rig());
        assert!(parse(&["scan", "--delay", "0.5"]).command.needs_rig());
    }
}
