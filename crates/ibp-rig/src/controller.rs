//! Transceiver controller
//!
//! [`Transceiver`] owns the one CAT channel to the radio. Every operation
//! runs the same cycle under a single lock: encode, write, wait for a reply
//! (bounded by the read timeout), decode. Set commands are fire-and-forget:
//! the radio stays silent on success, so a timeout after a set is expected.
//! It answers `?;` when it refuses a command.
//!
//! The channel is opened on first use and dropped after an I/O failure, so
//! the next command tries a fresh open.

use std::time::Duration;

use ibp_beacon::Band;
use ibp_cat::{
    decode_frequency, decode_information, decode_meter, decode_s_meter, ClarifierOffset, Command,
    Frame, Frequency, Information, MeterChannel, MeterReading, Mode, Vfo,
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, trace, warn};

use crate::channel::{Channel, Connector, SerialConnector};
use crate::error::RigError;

/// FTdx10 CAT read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Where the controller is in its request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
    AwaitingResponse,
    Decoded,
    TimedOut,
}

struct Inner<C: Connector> {
    connector: C,
    channel: Option<Channel<C::Io>>,
    opened: usize,
}

/// Controller for one transceiver
pub struct Transceiver<C: Connector> {
    inner: Mutex<Inner<C>>,
    phase_tx: watch::Sender<Phase>,
    read_timeout: Duration,
}

impl Transceiver<SerialConnector> {
    /// Controller for a radio on a serial port
    pub fn serial(port: &str, baud_rate: u32, read_timeout: Duration) -> Self {
        Self::new(SerialConnector::new(port, baud_rate, read_timeout), read_timeout)
    }
}

impl<C: Connector> Transceiver<C> {
    /// Create a controller; nothing is opened until the first command
    pub fn new(connector: C, read_timeout: Duration) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Idle);
        Self {
            inner: Mutex::new(Inner {
                connector,
                channel: None,
                opened: 0,
            }),
            phase_tx,
            read_timeout,
        }
    }

    /// Watch the request/response phase
    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    /// Whether the channel is currently open
    pub async fn is_open(&self) -> bool {
        self.inner.lock().await.channel.is_some()
    }

    /// How many times the channel has been opened
    pub async fn open_count(&self) -> usize {
        self.inner.lock().await.opened
    }

    /// Release the channel; a later command opens it again
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(mut channel) = inner.channel.take() {
            info!("Closing CAT channel {}", channel.name());
            if let Err(e) = channel.shutdown().await {
                debug!("Shutdown of {} failed: {}", channel.name(), e);
            }
        }
    }

    /// Tune a VFO
    pub async fn set_frequency(&self, vfo: Vfo, frequency: Frequency) -> Result<(), RigError> {
        info!("Setting VFO-{} to {}", vfo, frequency);
        self.execute(Command::SetFrequency { vfo, frequency }).await?;
        Ok(())
    }

    /// Read a VFO frequency
    pub async fn read_frequency(&self, vfo: Vfo) -> Result<Frequency, RigError> {
        let frame = self.query(Command::ReadFrequency { vfo }).await?;
        Ok(decode_frequency(frame.as_str(), vfo)?)
    }

    /// Set the main-band mode
    pub async fn set_mode(&self, mode: Mode) -> Result<(), RigError> {
        info!("Setting mode to {}", mode);
        self.execute(Command::SetMode { mode }).await?;
        Ok(())
    }

    /// Set the RX clarifier offset; a zero offset switches it off
    pub async fn set_clarifier(&self, offset: ClarifierOffset) -> Result<(), RigError> {
        info!("Setting RX clarifier to {}", offset);
        self.execute(Command::SetClarifierOffset { offset }).await?;
        Ok(())
    }

    /// Switch RX and TX clarifiers off and zero the offset
    pub async fn reset_clarifiers(&self) -> Result<(), RigError> {
        info!("Resetting clarifiers");
        self.execute(Command::ResetClarifiers).await?;
        Ok(())
    }

    /// Read both configurable meters
    pub async fn read_meter(&self) -> Result<(MeterReading, MeterReading), RigError> {
        let first = self.read_meter_channel(MeterChannel::PRIMARY).await?;
        let second = self.read_meter_channel(MeterChannel::SECONDARY).await?;
        Ok((first, second))
    }

    /// Read one configurable meter
    pub async fn read_meter_channel(&self, channel: MeterChannel) -> Result<MeterReading, RigError> {
        let frame = self.query(Command::ReadMeter { channel }).await?;
        Ok(decode_meter(frame.as_str())?)
    }

    /// Read the main-band S-meter
    pub async fn read_s_meter(&self) -> Result<u16, RigError> {
        let frame = self.query(Command::ReadSMeter).await?;
        Ok(decode_s_meter(frame.as_str())?)
    }

    /// Read the `IF` status block
    pub async fn query_information(&self) -> Result<Information, RigError> {
        let frame = self.query(Command::QueryInformation).await?;
        Ok(decode_information(frame.as_str())?)
    }

    /// Tune VFO-A to the band's beacon frequency in CW-U
    pub async fn tune_to_band(&self, band: Band) -> Result<Frequency, RigError> {
        let frequency = Frequency::from_hz(band.beacon_frequency_hz())?;
        self.set_frequency(Vfo::A, frequency).await?;
        self.set_mode(Mode::CwU).await?;
        Ok(frequency)
    }

    /// Step VFO-A through the five beacon frequencies, then restore it
    ///
    /// The current frequency reply is captured byte for byte and written back
    /// unchanged at the end, even if a step fails. The channel stays locked
    /// for the whole scan.
    pub async fn scan_beacon_frequencies(&self, delay: Duration) -> Result<(), RigError> {
        let mut inner = self.inner.lock().await;

        let read = Command::ReadFrequency { vfo: Vfo::A };
        let saved = self.run_locked(&mut inner, &read).await?.ok_or_else(|| {
            RigError::Timeout {
                opcode: read.opcode().to_string(),
                timeout_ms: self.read_timeout.as_millis() as u64,
            }
        })?;
        // Only a well-formed FA reply may be written back
        decode_frequency(saved.as_str(), Vfo::A)?;
        info!("Scanning beacon frequencies, will restore {}", saved);

        let mut result = Ok(());
        for band in Band::ALL {
            let step = async {
                let frequency = Frequency::from_hz(band.beacon_frequency_hz())?;
                info!("Scan: {} ({})", frequency, band);
                self.run_locked(&mut inner, &Command::SetFrequency { vfo: Vfo::A, frequency })
                    .await?;
                tokio::time::sleep(delay).await;
                Ok::<(), RigError>(())
            };
            if let Err(e) = step.await {
                warn!("Scan stopped at {}: {}", band, e);
                result = Err(e);
                break;
            }
        }

        let restored = self.exchange(&mut inner, &saved, false).await.map(|_| ());
        match result {
            Ok(()) => restored,
            Err(e) => {
                if let Err(restore_err) = restored {
                    warn!("Could not restore frequency: {}", restore_err);
                }
                Err(e)
            }
        }
    }

    /// Run a query command and return its reply frame
    async fn query(&self, cmd: Command) -> Result<Frame, RigError> {
        self.execute(cmd).await?.ok_or_else(|| RigError::Timeout {
            opcode: cmd.opcode().to_string(),
            timeout_ms: self.read_timeout.as_millis() as u64,
        })
    }

    /// Run one command under the channel lock
    async fn execute(&self, cmd: Command) -> Result<Option<Frame>, RigError> {
        let mut inner = self.inner.lock().await;
        self.run_locked(&mut inner, &cmd).await
    }

    async fn run_locked(
        &self,
        inner: &mut Inner<C>,
        cmd: &Command,
    ) -> Result<Option<Frame>, RigError> {
        let mut reply = None;
        for frame in cmd.frames() {
            reply = self.exchange(inner, &frame, cmd.is_query()).await?;
        }
        Ok(reply)
    }

    /// Write one frame and collect the reply, opening the channel if needed
    async fn exchange(
        &self,
        inner: &mut Inner<C>,
        frame: &Frame,
        expects_reply: bool,
    ) -> Result<Option<Frame>, RigError> {
        if inner.channel.is_none() {
            let io = inner.connector.connect()?;
            info!("Opened CAT channel {}", inner.connector.name());
            inner.channel = Some(Channel::new(inner.connector.name(), io));
            inner.opened += 1;
        }
        let Some(channel) = inner.channel.as_mut() else {
            return Err(RigError::ChannelClosed);
        };

        let result = self
            .cycle(channel, frame, expects_reply)
            .await;
        self.set_phase(Phase::Idle);

        if let Err(e) = &result {
            if e.is_fatal_to_channel() {
                warn!("Dropping CAT channel after error: {}", e);
                inner.channel = None;
            }
        }
        result
    }

    async fn cycle(
        &self,
        channel: &mut Channel<C::Io>,
        frame: &Frame,
        expects_reply: bool,
    ) -> Result<Option<Frame>, RigError> {
        self.set_phase(Phase::Sending);
        channel.discard_pending();
        channel.write_frame(frame).await?;

        self.set_phase(Phase::AwaitingResponse);
        match channel.read_frame(self.read_timeout).await? {
            Some(reply) if reply.is_rejection() => {
                self.set_phase(Phase::Decoded);
                warn!("Radio rejected {}", frame);
                Err(RigError::Rejected(frame.to_string()))
            }
            Some(reply) if expects_reply => {
                self.set_phase(Phase::Decoded);
                Ok(Some(reply))
            }
            Some(reply) => {
                self.set_phase(Phase::Decoded);
                debug!("Ignoring unsolicited {} after {}", reply, frame);
                Ok(None)
            }
            None => {
                self.set_phase(Phase::TimedOut);
                if expects_reply {
                    warn!("No reply to {}", frame);
                    Err(RigError::Timeout {
                        opcode: frame.opcode().to_string(),
                        timeout_ms: self.read_timeout.as_millis() as u64,
                    })
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn set_phase(&self, phase: Phase) {
        trace!("CAT phase {:?}", phase);
        self.phase_tx.send_replace(phase);
    }
}
