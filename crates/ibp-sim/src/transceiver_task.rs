//! Virtual transceiver actor task
//!
//! Owns a [`VirtualTransceiver`] and serves CAT frames read from an async
//! stream, usually one half of `tokio::io::duplex()`. Every frame and its
//! reply is published on a broadcast channel for monitoring.

use std::io;

use ibp_cat::{CatCodec, ProtocolCodec};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::VirtualTransceiver;

/// Commands that can be sent to a virtual transceiver task
#[derive(Debug, Clone)]
pub enum VirtualTransceiverCommand {
    /// Change the S-meter reading
    SetSMeter(u16),
    /// Shutdown the task
    Shutdown,
}

/// One frame served by the task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficEvent {
    /// Frame received from the controller
    pub request: String,
    /// Reply written back, if any
    pub reply: Option<String>,
}

/// Run the virtual transceiver until the stream closes or shutdown is requested
///
/// Returns the transceiver so callers can inspect its final state.
pub async fn run_virtual_transceiver<S>(
    mut stream: S,
    mut radio: VirtualTransceiver,
    mut cmd_rx: mpsc::Receiver<VirtualTransceiverCommand>,
    traffic_tx: broadcast::Sender<TrafficEvent>,
) -> io::Result<VirtualTransceiver>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut codec = CatCodec::new();
    let mut buf = [0u8; 256];
    let mut commands_open = true;

    info!("Starting virtual transceiver task");

    loop {
        tokio::select! {
            result = stream.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        debug!("Virtual transceiver stream closed");
                        break;
                    }
                    Ok(n) => {
                        codec.push_bytes(&buf[..n]);
                        while let Some(item) = codec.next_item() {
                            let frame = match item {
                                Ok(frame) => frame,
                                Err(e) => {
                                    warn!("Virtual transceiver dropped garbled input: {}", e);
                                    continue;
                                }
                            };
                            let reply = radio.process_frame(&frame);
                            // Publish before replying so observers see the request first
                            let _ = traffic_tx.send(TrafficEvent {
                                request: frame.as_str().to_string(),
                                reply: reply.clone(),
                            });
                            if let Some(reply) = reply {
                                stream.write_all(reply.as_bytes()).await?;
                                stream.flush().await?;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Virtual transceiver stream error: {}", e);
                        return Err(e);
                    }
                }
            }

            cmd = cmd_rx.recv(), if commands_open => {
                match cmd {
                    Some(VirtualTransceiverCommand::SetSMeter(value)) => {
                        radio.set_s_meter(value);
                    }
                    Some(VirtualTransceiverCommand::Shutdown) => {
                        info!("Shutdown requested for virtual transceiver");
                        break;
                    }
                    // Keep serving the stream without a controller handle
                    None => commands_open = false,
                }
            }
        }
    }

    info!("Virtual transceiver task ended");
    Ok(radio)
}
