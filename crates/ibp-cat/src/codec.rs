//! Frame type and streaming frame extraction
//!
//! Every CAT frame is printable ASCII terminated by `;`. Reads from a serial
//! port arrive in arbitrary chunks, so [`CatCodec`] buffers bytes until a
//! terminator shows up and hands out one [`Frame`] at a time.

use std::fmt;

use crate::error::DecodeError;
use crate::ProtocolCodec;

/// Frame terminator
pub const TERMINATOR: u8 = b';';

/// Maximum frame length (the longest real frame, `IF`, is 28 bytes)
const MAX_FRAME_LEN: usize = 64;

/// Reply the radio sends when it cannot execute a command
const REJECTION: &str = "?;";

/// One `;`-terminated CAT frame
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    text: String,
}

impl Frame {
    /// Validate raw bytes as a frame: printable ASCII ending in exactly one `;`
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let Some((&last, body)) = bytes.split_last() else {
            return Err(DecodeError::InvalidFrame("empty frame".into()));
        };
        if last != TERMINATOR {
            return Err(DecodeError::InvalidFrame(format!(
                "missing terminator: {:?}",
                String::from_utf8_lossy(bytes)
            )));
        }
        if body.is_empty() {
            return Err(DecodeError::InvalidFrame("frame has no opcode".into()));
        }
        if let Some(bad) = body
            .iter()
            .find(|b| !b.is_ascii_graphic() || **b == TERMINATOR)
        {
            return Err(DecodeError::InvalidFrame(format!(
                "unexpected byte 0x{bad:02X} in {:?}",
                String::from_utf8_lossy(bytes)
            )));
        }
        // Validated as ASCII above
        let text = String::from_utf8_lossy(bytes).into_owned();
        Ok(Self { text })
    }

    /// Build a frame from a body without terminator
    pub(crate) fn from_body(body: String) -> Self {
        let mut text = body;
        text.push(TERMINATOR as char);
        Self { text }
    }

    /// The two-letter opcode (or `?` for a rejection)
    pub fn opcode(&self) -> &str {
        let body = self.body();
        &body[..body.len().min(2)]
    }

    /// Frame text without the terminator
    pub fn body(&self) -> &str {
        &self.text[..self.text.len() - 1]
    }

    /// Full frame text including the terminator
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Raw wire bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Whether this is the radio's `?;` error reply
    pub fn is_rejection(&self) -> bool {
        self.text == REJECTION
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split a byte string holding one or more complete frames
pub fn split_frames(bytes: &[u8]) -> Result<Vec<Frame>, DecodeError> {
    let mut codec = CatCodec::new();
    codec.push_bytes(bytes);

    let mut frames = Vec::new();
    while let Some(frame) = codec.next_frame() {
        frames.push(frame?);
    }
    if codec.has_partial() {
        return Err(DecodeError::InvalidFrame(format!(
            "trailing bytes without terminator: {:?}",
            String::from_utf8_lossy(&codec.buffer)
        )));
    }
    Ok(frames)
}

/// Streaming CAT frame parser
pub struct CatCodec {
    buffer: Vec<u8>,
}

impl CatCodec {
    /// Create an empty codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_FRAME_LEN),
        }
    }

    /// Extract the next complete frame, if one is buffered
    ///
    /// Garbled frames are returned as errors so the caller can decide whether
    /// the exchange is still usable; the bytes are consumed either way.
    pub fn next_frame(&mut self) -> Option<Result<Frame, DecodeError>> {
        let term_pos = self.buffer.iter().position(|&b| b == TERMINATOR)?;
        let frame_bytes: Vec<u8> = self.buffer.drain(..=term_pos).collect();
        let result = Frame::parse(&frame_bytes);
        if let Err(e) = &result {
            tracing::warn!("Failed to parse CAT frame: {}", e);
        }
        Some(result)
    }

    /// Whether bytes of an unterminated frame are buffered
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty()
    }
}

impl Default for CatCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for CatCodec {
    type Item = Result<Frame, DecodeError>;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // Line noise without terminators must not grow the buffer forever
        if self.buffer.len() > MAX_FRAME_LEN * 4 {
            let start = self.buffer.len() - MAX_FRAME_LEN;
            self.buffer = self.buffer[start..].to_vec();
        }
    }

    fn next_item(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}
