//! Property tests for command encoding and response decoding

use ibp_cat::{
    decode_command, decode_s_meter, offset_to_str, CatCodec, ClarifierOffset, Command,
    EncodeCommand, Frequency, MeterChannel, Mode, ProtocolCodec, Vfo, MAX_CLARIFIER_HZ,
    MAX_FREQUENCY_HZ,
};
use proptest::prelude::*;

mod helpers {
    use super::*;

    pub fn vfo() -> impl Strategy<Value = Vfo> {
        prop_oneof![Just(Vfo::A), Just(Vfo::B)]
    }

    pub fn frequency() -> impl Strategy<Value = Frequency> {
        (1u64..=MAX_FREQUENCY_HZ).prop_map(|hz| Frequency::from_hz(hz).unwrap())
    }

    pub fn mode() -> impl Strategy<Value = Mode> {
        (0..Mode::ALL.len()).prop_map(|i| Mode::ALL[i])
    }

    pub fn offset() -> impl Strategy<Value = ClarifierOffset> {
        (-MAX_CLARIFIER_HZ..=MAX_CLARIFIER_HZ).prop_map(|hz| ClarifierOffset::new(hz).unwrap())
    }

    pub fn meter_channel() -> impl Strategy<Value = MeterChannel> {
        prop_oneof![Just(MeterChannel::PRIMARY), Just(MeterChannel::SECONDARY)]
    }

    pub fn command() -> impl Strategy<Value = Command> {
        prop_oneof![
            (vfo(), frequency()).prop_map(|(vfo, frequency)| Command::SetFrequency { vfo, frequency }),
            vfo().prop_map(|vfo| Command::ReadFrequency { vfo }),
            mode().prop_map(|mode| Command::SetMode { mode }),
            offset().prop_map(|offset| Command::SetClarifierOffset { offset }),
            Just(Command::ResetClarifiers),
            meter_channel().prop_map(|channel| Command::ReadMeter { channel }),
            Just(Command::ReadSMeter),
            Just(Command::QueryInformation),
        ]
    }
}

proptest! {
    #[test]
    fn decode_recovers_every_command(cmd in helpers::command()) {
        let bytes = cmd.encode();
        prop_assert_eq!(decode_command(&bytes).unwrap(), cmd);
    }

    #[test]
    fn encoded_frames_are_terminated_ascii(cmd in helpers::command()) {
        let bytes = cmd.encode();
        prop_assert!(bytes.is_ascii());
        prop_assert_eq!(bytes.last(), Some(&b';'));
        for frame in cmd.frames() {
            prop_assert_eq!(frame.as_str().matches(';').count(), 1);
        }
    }

    #[test]
    fn set_frequency_field_is_nine_digits(vfo in helpers::vfo(), f in helpers::frequency()) {
        let bytes = Command::SetFrequency { vfo, frequency: f }.encode();
        prop_assert_eq!(bytes.len(), 12);
        prop_assert!(bytes[2..11].iter().all(u8::is_ascii_digit));
    }

    #[test]
    fn offset_to_str_always_well_formed(v in any::<i64>()) {
        let (dir, mag) = offset_to_str(v);
        prop_assert!(dir == '+' || dir == '-');
        prop_assert_eq!(mag.len(), 4);
        prop_assert!(mag.bytes().all(|b| b.is_ascii_digit()));
        if v.unsigned_abs() > MAX_CLARIFIER_HZ as u64 {
            prop_assert_eq!((dir, mag.as_str()), ('+', "0000"));
        }
    }

    #[test]
    fn codec_reassembles_arbitrary_chunking(split in 0usize..24) {
        let stream = b"FA014100000;SM0007000;";
        let split = split.min(stream.len());
        let mut codec = CatCodec::new();
        codec.push_bytes(&stream[..split]);
        let mut frames = Vec::new();
        while let Some(frame) = codec.next_item() {
            frames.push(frame.unwrap());
        }
        codec.push_bytes(&stream[split..]);
        while let Some(frame) = codec.next_item() {
            frames.push(frame.unwrap());
        }
        let texts: Vec<&str> = frames.iter().map(|f| f.as_str()).collect();
        prop_assert_eq!(texts, vec!["FA014100000;", "SM0007000;"]);
    }

    #[test]
    fn s_meter_decodes_any_three_digit_value(value in 0u16..=999) {
        let frame = format!("SM0{value:03};");
        prop_assert_eq!(decode_s_meter(&frame), Ok(value));
    }

    #[test]
    fn truncated_s_meter_never_panics(len in 0usize..6) {
        let frame = &"SM0007000;"[..len];
        prop_assert!(decode_s_meter(frame).is_err());
    }
}

#[test]
fn test_reference_encodings() {
    let cmd = Command::SetFrequency {
        vfo: "A".parse().unwrap(),
        frequency: Frequency::from_hz(14_100_000).unwrap(),
    };
    assert_eq!(cmd.encode(), b"FA014100000;");
    assert_eq!(decode_s_meter("SM0007000;"), Ok(7));
    assert_eq!(offset_to_str(1502), ('+', "1502".to_string()));
    assert_eq!(offset_to_str(30000), ('+', "0000".to_string()));
    assert_eq!(offset_to_str(-5000), ('-', "5000".to_string()));
}
