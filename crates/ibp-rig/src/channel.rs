//! CAT byte channel
//!
//! A [`Connector`] knows how to open the transport, a [`Channel`] moves whole
//! frames over it. Real radios use [`SerialConnector`]; the simulator and
//! tests hand a pre-opened `DuplexStream` to a [`StreamConnector`].

use std::io;
use std::time::Duration;

use ibp_cat::{CatCodec, Frame, ProtocolCodec};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, warn};

use crate::error::RigError;

/// FTdx10 factory default CAT rate
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

/// Longest wait for a reply; larger read timeouts are clamped to this
pub const MAX_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Opens the transport for a [`Channel`]
pub trait Connector: Send {
    /// Byte stream produced by this connector
    type Io: AsyncRead + AsyncWrite + Unpin + Send;

    /// Port or stream name, for logs and errors
    fn name(&self) -> &str;

    /// Open the transport
    fn connect(&mut self) -> Result<Self::Io, RigError>;
}

/// Opens a serial port
#[derive(Debug, Clone)]
pub struct SerialConnector {
    port: String,
    baud_rate: u32,
    read_timeout: Duration,
}

impl SerialConnector {
    pub fn new(port: impl Into<String>, baud_rate: u32, read_timeout: Duration) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            read_timeout,
        }
    }
}

impl Connector for SerialConnector {
    type Io = SerialStream;

    fn name(&self) -> &str {
        &self.port
    }

    fn connect(&mut self) -> Result<SerialStream, RigError> {
        debug!("Opening {} at {} baud", self.port, self.baud_rate);
        tokio_serial::new(&self.port, self.baud_rate)
            .timeout(self.read_timeout)
            .open_native_async()
            .map_err(|e| RigError::ChannelUnavailable {
                port: self.port.clone(),
                source: io::Error::other(e),
            })
    }
}

/// Hands out an already-open stream, once
pub struct StreamConnector<T> {
    name: String,
    stream: Option<T>,
}

impl<T> StreamConnector<T> {
    pub fn new(name: impl Into<String>, stream: T) -> Self {
        Self {
            name: name.into(),
            stream: Some(stream),
        }
    }
}

impl<T> Connector for StreamConnector<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    type Io = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn connect(&mut self) -> Result<T, RigError> {
        self.stream.take().ok_or_else(|| RigError::ChannelUnavailable {
            port: self.name.clone(),
            source: io::Error::new(io::ErrorKind::NotConnected, "stream already consumed"),
        })
    }
}

/// Frame-level reader/writer over an open transport
///
/// Bytes read past a terminator stay buffered for the next read.
pub struct Channel<T> {
    name: String,
    io: T,
    codec: CatCodec,
    buffer: Vec<u8>,
}

impl<T> Channel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(name: impl Into<String>, io: T) -> Self {
        Self {
            name: name.into(),
            io,
            codec: CatCodec::new(),
            buffer: vec![0u8; 256],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drop anything left over from an earlier exchange
    pub fn discard_pending(&mut self) {
        if self.codec.has_partial() {
            debug!("Discarding stale bytes on {}", self.name);
        }
        self.codec.clear();
    }

    /// Write one frame and flush
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), RigError> {
        debug!("{} <- {}", self.name, frame);
        self.io.write_all(frame.as_bytes()).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Read until a complete frame arrives or `timeout` passes
    ///
    /// Returns `Ok(None)` on timeout.
    pub async fn read_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, RigError> {
        let deadline = Instant::now() + timeout.min(MAX_READ_TIMEOUT);
        loop {
            if let Some(item) = self.codec.next_item() {
                let frame = item?;
                debug!("{} -> {}", self.name, frame);
                return Ok(Some(frame));
            }

            match timeout_at(deadline, self.io.read(&mut self.buffer)).await {
                Err(_) => return Ok(None),
                Ok(Ok(0)) => {
                    warn!("{} closed by peer", self.name);
                    return Err(RigError::ChannelClosed);
                }
                Ok(Ok(n)) => self.codec.push_bytes(&self.buffer[..n]),
                Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
                Ok(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// Shut the write half down
    pub async fn shutdown(&mut self) -> Result<(), RigError> {
        self.io.shutdown().await?;
        Ok(())
    }
}
