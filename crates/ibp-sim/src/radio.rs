//! Virtual FTdx10
//!
//! Answers the CAT subset used by the controller with the same fixed-width
//! replies a real radio sends. Set commands are silent on success; anything
//! it does not understand gets `?;`.

use std::collections::HashSet;

use ibp_cat::{ClarifierOffset, Frame, MeterKind, Mode, FREQ_DIGITS, MAX_FREQUENCY_HZ};
use serde::{Deserialize, Serialize};
use tracing::debug;

const REJECT: &str = "?;";

/// Frame the radio answers with `?;`
struct Reject;

/// Starting state for a virtual transceiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualTransceiverConfig {
    pub frequency_a_hz: u64,
    pub frequency_b_hz: u64,
    /// Mode name as shown on the radio (`"USB"`, `"CW-U"`, ...)
    pub mode: String,
    /// Raw S-meter value (0-255)
    pub s_meter: u16,
}

impl Default for VirtualTransceiverConfig {
    fn default() -> Self {
        Self {
            frequency_a_hz: 7_074_000,
            frequency_b_hz: 14_074_000,
            mode: "USB".to_string(),
            s_meter: 7,
        }
    }
}

/// A simulated transceiver
#[derive(Debug)]
pub struct VirtualTransceiver {
    frequency_a: u64,
    frequency_b: u64,
    mode: Mode,
    clarifier: ClarifierOffset,
    rx_clarifier: bool,
    tx_clarifier: bool,
    s_meter: u16,
    /// (type, value) for RM0 and RM1
    meters: [(MeterKind, u16); 2],
    /// Opcodes answered with `?;`
    rejected: HashSet<String>,
    /// Opcodes never answered
    silent: HashSet<String>,
    history: Vec<String>,
}

impl Default for VirtualTransceiver {
    fn default() -> Self {
        Self::from_config(VirtualTransceiverConfig::default())
    }
}

impl VirtualTransceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: VirtualTransceiverConfig) -> Self {
        Self {
            frequency_a: config.frequency_a_hz,
            frequency_b: config.frequency_b_hz,
            mode: config.mode.parse().unwrap_or(Mode::Usb),
            clarifier: ClarifierOffset::ZERO,
            rx_clarifier: false,
            tx_clarifier: false,
            s_meter: config.s_meter,
            meters: [(MeterKind::S, config.s_meter), (MeterKind::Swr, 12)],
            rejected: HashSet::new(),
            silent: HashSet::new(),
            history: Vec::new(),
        }
    }

    pub fn frequency_a(&self) -> u64 {
        self.frequency_a
    }

    pub fn frequency_b(&self) -> u64 {
        self.frequency_b
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn clarifier(&self) -> ClarifierOffset {
        self.clarifier
    }

    /// RX and TX clarifier switches
    pub fn clarifier_switches(&self) -> (bool, bool) {
        (self.rx_clarifier, self.tx_clarifier)
    }

    pub fn set_s_meter(&mut self, value: u16) {
        self.s_meter = value;
        self.meters[0] = (MeterKind::S, value);
    }

    /// Answer every frame with this opcode with `?;`
    pub fn reject_opcode(&mut self, opcode: &str) {
        self.rejected.insert(opcode.to_string());
    }

    /// Never answer frames with this opcode
    pub fn ignore_opcode(&mut self, opcode: &str) {
        self.silent.insert(opcode.to_string());
    }

    /// Every frame received, in order
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Apply one frame and return the reply, if any
    pub fn process_frame(&mut self, frame: &Frame) -> Option<String> {
        self.history.push(frame.as_str().to_string());
        let opcode = frame.opcode();

        if self.silent.contains(opcode) {
            return None;
        }
        if self.rejected.contains(opcode) {
            return Some(REJECT.to_string());
        }

        let reply = match opcode {
            "FA" | "FB" => self.handle_frequency(frame.body()),
            "MD" => self.handle_mode(frame.body()),
            "CF" => self.handle_clarifier(frame.body()),
            "RM" => self.handle_meter(frame.body()),
            "SM" if frame.body() == "SM0" => Ok(Some(format!("SM0{:03}000;", self.s_meter))),
            "IF" if frame.body() == "IF" => Ok(Some(self.information())),
            _ => Err(Reject),
        };

        match reply {
            Ok(reply) => reply,
            Err(Reject) => {
                debug!("Virtual transceiver rejecting {}", frame);
                Some(REJECT.to_string())
            }
        }
    }

    fn handle_frequency(&mut self, body: &str) -> Result<Option<String>, Reject> {
        let is_b = body.as_bytes()[1] == b'B';
        let field = &body[2..];
        if field.is_empty() {
            let hz = if is_b { self.frequency_b } else { self.frequency_a };
            return Ok(Some(format!("{}{:09};", &body[..2], hz)));
        }
        if field.len() != FREQ_DIGITS || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Reject);
        }
        let hz: u64 = field.parse().map_err(|_| Reject)?;
        if hz == 0 || hz > MAX_FREQUENCY_HZ {
            return Err(Reject);
        }
        if is_b {
            self.frequency_b = hz;
        } else {
            self.frequency_a = hz;
        }
        Ok(None)
    }

    fn handle_mode(&mut self, body: &str) -> Result<Option<String>, Reject> {
        let chars: Vec<char> = body.chars().collect();
        match chars.as_slice() {
            ['M', 'D', '0'] => Ok(Some(format!("MD0{};", self.mode.code()))),
            ['M', 'D', '0', code] => {
                self.mode = Mode::from_code(*code).ok_or(Reject)?;
                Ok(None)
            }
            _ => Err(Reject),
        }
    }

    fn handle_clarifier(&mut self, body: &str) -> Result<Option<String>, Reject> {
        let params: Vec<char> = body[2..].chars().collect();
        if params.len() != 8 || params[0] != '0' || params[1] != '0' {
            return Err(Reject);
        }
        match params[2] {
            '1' => {
                let magnitude: String = params[4..8].iter().collect();
                self.clarifier = ClarifierOffset::from_fields(params[3], &magnitude).ok_or(Reject)?;
            }
            '0' => {
                let flag = |c: char| match c {
                    '0' => Ok(false),
                    '1' => Ok(true),
                    _ => Err(Reject),
                };
                self.rx_clarifier = flag(params[3])?;
                self.tx_clarifier = flag(params[4])?;
            }
            _ => return Err(Reject),
        }
        Ok(None)
    }

    fn handle_meter(&mut self, body: &str) -> Result<Option<String>, Reject> {
        let index = match body {
            "RM0" => 0,
            "RM1" => 1,
            _ => return Err(Reject),
        };
        let (kind, value) = self.meters[index];
        Ok(Some(format!("RM{}{:03}000;", meter_code(kind), value)))
    }

    fn information(&self) -> String {
        let flag = |on: bool| if on { '1' } else { '0' };
        format!(
            "IF001{:09}{}{}{}{}{}00000;",
            self.frequency_a,
            self.clarifier.direction(),
            self.clarifier.magnitude_field(),
            flag(self.rx_clarifier),
            flag(self.tx_clarifier),
            self.mode.code(),
        )
    }
}

fn meter_code(kind: MeterKind) -> char {
    match kind {
        MeterKind::S => '1',
        MeterKind::Unassigned => '2',
        MeterKind::Comp => '3',
        MeterKind::Alc => '4',
        MeterKind::Po => '5',
        MeterKind::Swr => '6',
        MeterKind::Idd => '7',
        MeterKind::Vdd => '8',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(radio: &mut VirtualTransceiver, text: &str) -> Option<String> {
        radio.process_frame(&Frame::parse(text.as_bytes()).unwrap())
    }

    #[test]
    fn test_set_and_read_frequency() {
        let mut radio = VirtualTransceiver::new();
        assert_eq!(send(&mut radio, "FA014100000;"), None);
        assert_eq!(radio.frequency_a(), 14_100_000);
        assert_eq!(send(&mut radio, "FA;").as_deref(), Some("FA014100000;"));
        assert_eq!(send(&mut radio, "FB;").as_deref(), Some("FB014074000;"));
    }

    #[test]
    fn test_mode() {
        let mut radio = VirtualTransceiver::new();
        assert_eq!(send(&mut radio, "MD03;"), None);
        assert_eq!(radio.mode(), Mode::CwU);
        assert_eq!(send(&mut radio, "MD0;").as_deref(), Some("MD03;"));
        assert_eq!(send(&mut radio, "MD0Z;").as_deref(), Some("?;"));
    }

    #[test]
    fn test_clarifier_frames() {
        let mut radio = VirtualTransceiver::new();
        send(&mut radio, "CF001-0250;");
        send(&mut radio, "CF00010000;");
        assert_eq!(radio.clarifier().hz(), -250);
        assert_eq!(radio.clarifier_switches(), (true, false));
    }

    #[test]
    fn test_information_layout() {
        let mut radio = VirtualTransceiver::new();
        send(&mut radio, "MD01;");
        let info = send(&mut radio, "IF;").unwrap();
        assert_eq!(info, "IF001007074000+000000100000;");
        let decoded = ibp_cat::decode_information(&info).unwrap();
        assert_eq!(decoded.frequency_hz, 7_074_000);
        assert_eq!(decoded.mode, Mode::Lsb);
    }

    #[test]
    fn test_meters() {
        let mut radio = VirtualTransceiver::new();
        assert_eq!(send(&mut radio, "RM0;").as_deref(), Some("RM1007000;"));
        assert_eq!(send(&mut radio, "RM1;").as_deref(), Some("RM6012000;"));
        assert_eq!(send(&mut radio, "SM0;").as_deref(), Some("SM0007000;"));
    }

    #[test]
    fn test_unknown_and_rejected() {
        let mut radio = VirtualTransceiver::new();
        assert_eq!(send(&mut radio, "ZZ;").as_deref(), Some("?;"));
        radio.reject_opcode("MD");
        assert_eq!(send(&mut radio, "MD03;").as_deref(), Some("?;"));
        radio.ignore_opcode("SM");
        assert_eq!(send(&mut radio, "SM0;"), None);
        assert_eq!(radio.history().len(), 3);
    }
}
