//! Integration tests for the transceiver controller
//!
//! Every test runs the controller against a virtual transceiver over an
//! in-memory duplex stream.

use std::sync::Arc;
use std::time::Duration;

use ibp_beacon::Band;
use ibp_cat::{ClarifierOffset, Frequency, MeterKind, Mode, Vfo};
use ibp_rig::{Phase, RigError, StreamConnector, Transceiver};
use ibp_sim::{run_virtual_transceiver, TrafficEvent, VirtualTransceiver};
use proptest::prelude::*;
use tokio::io::DuplexStream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub struct Bench {
        pub rig: Arc<Transceiver<StreamConnector<DuplexStream>>>,
        pub traffic: broadcast::Receiver<TrafficEvent>,
        pub task: JoinHandle<std::io::Result<VirtualTransceiver>>,
        _cmd_tx: mpsc::Sender<ibp_sim::VirtualTransceiverCommand>,
    }

    impl Bench {
        /// Close the controller and collect the simulator's final state
        pub async fn finish(self) -> VirtualTransceiver {
            self.rig.close().await;
            drop(self.rig);
            self.task.await.unwrap().unwrap()
        }
    }

    pub fn bench_with(radio: VirtualTransceiver) -> Bench {
        let (pc, radio_end) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (traffic_tx, traffic) = broadcast::channel(256);
        let task = tokio::spawn(run_virtual_transceiver(radio_end, radio, cmd_rx, traffic_tx));
        let rig = Transceiver::new(
            StreamConnector::new("sim", pc),
            Duration::from_millis(50),
        );
        Bench {
            rig: Arc::new(rig),
            traffic,
            task,
            _cmd_tx: cmd_tx,
        }
    }

    pub fn bench() -> Bench {
        bench_with(VirtualTransceiver::new())
    }

    pub fn freq(hz: u64) -> Frequency {
        Frequency::from_hz(hz).unwrap()
    }
}

use helpers::*;

// ============================================================================
// Basic commands
// ============================================================================

#[tokio::test]
async fn test_set_and_read_frequency() {
    let bench = bench();
    bench
        .rig
        .set_frequency(Vfo::A, freq(14_100_000))
        .await
        .unwrap();
    assert_eq!(
        bench.rig.read_frequency(Vfo::A).await.unwrap(),
        freq(14_100_000)
    );
    assert_eq!(
        bench.rig.read_frequency(Vfo::B).await.unwrap(),
        freq(14_074_000)
    );

    let radio = bench.finish().await;
    assert_eq!(radio.frequency_a(), 14_100_000);
}

#[tokio::test]
async fn test_set_mode_and_query_information() {
    let bench = bench();
    bench.rig.set_mode(Mode::DataU).await.unwrap();
    bench
        .rig
        .set_clarifier(ClarifierOffset::new(-250).unwrap())
        .await
        .unwrap();

    let info = bench.rig.query_information().await.unwrap();
    assert_eq!(info.mode, Mode::DataU);
    assert_eq!(info.clarifier.hz(), -250);
    assert!(info.rx_clarifier);
    assert!(!info.tx_clarifier);
    assert_eq!(info.frequency_hz, 7_074_000);
}

#[tokio::test]
async fn test_clarifier_frames_and_reset() {
    let mut bench = bench();
    bench
        .rig
        .set_clarifier(ClarifierOffset::new(1502).unwrap())
        .await
        .unwrap();
    bench.rig.reset_clarifiers().await.unwrap();

    let mut requests = Vec::new();
    while let Ok(event) = bench.traffic.try_recv() {
        requests.push(event.request);
    }
    assert_eq!(
        requests,
        [
            "CF001+1502;",
            "CF00010000;",
            "CF00000000;",
            "CF001+0000;"
        ]
    );

    let radio = bench.finish().await;
    assert_eq!(radio.clarifier(), ClarifierOffset::ZERO);
    assert_eq!(radio.clarifier_switches(), (false, false));
}

#[tokio::test]
async fn test_meters() {
    let bench = bench();
    assert_eq!(bench.rig.read_s_meter().await.unwrap(), 7);

    let (first, second) = bench.rig.read_meter().await.unwrap();
    assert_eq!(first.kind, Some(MeterKind::S));
    assert_eq!(first.value, 7);
    assert_eq!(second.kind, Some(MeterKind::Swr));
    assert_eq!(second.value, 12);
}

#[tokio::test]
async fn test_tune_to_band() {
    let bench = bench();
    let f = bench.rig.tune_to_band(Band::Band15m).await.unwrap();
    assert_eq!(f.hz(), 21_150_000);

    let radio = bench.finish().await;
    assert_eq!(radio.frequency_a(), 21_150_000);
    assert_eq!(radio.mode(), Mode::CwU);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_frequency_survives_radio_round_trip(hz in 1u64..=999_999_999, use_b in any::<bool>()) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let vfo = if use_b { Vfo::B } else { Vfo::A };
        let read_back = rt.block_on(async {
            let bench = bench();
            bench.rig.set_frequency(vfo, freq(hz)).await.unwrap();
            let read_back = bench.rig.read_frequency(vfo).await.unwrap();
            bench.finish().await;
            read_back
        });
        prop_assert_eq!(read_back.hz(), hz);
    }
}

// ============================================================================
// Scan
// ============================================================================

#[tokio::test]
async fn test_scan_restores_raw_frequency() {
    let mut radio = VirtualTransceiver::new();
    let frame = ibp_cat::Frame::parse(b"FA003573500;").unwrap();
    radio.process_frame(&frame);

    let mut bench = bench_with(radio);
    bench
        .rig
        .scan_beacon_frequencies(Duration::from_millis(1))
        .await
        .unwrap();

    let mut requests = Vec::new();
    while let Ok(event) = bench.traffic.try_recv() {
        requests.push(event.request);
    }
    assert_eq!(
        requests,
        [
            "FA;",
            "FA014100000;",
            "FA018110000;",
            "FA021150000;",
            "FA024930000;",
            "FA028200000;",
            "FA003573500;",
        ]
    );

    let radio = bench.finish().await;
    assert_eq!(radio.frequency_a(), 3_573_500);
}

#[tokio::test]
async fn test_scan_without_frequency_reply_changes_nothing() {
    let mut radio = VirtualTransceiver::new();
    radio.ignore_opcode("FA");
    let bench = bench_with(radio);

    let err = bench
        .rig
        .scan_beacon_frequencies(Duration::from_millis(1))
        .await
        .unwrap_err();
    assert!(matches!(err, RigError::Timeout { .. }));

    let radio = bench.finish().await;
    assert_eq!(radio.history(), ["FA;"]);
}

// ============================================================================
// Errors and channel lifecycle
// ============================================================================

#[tokio::test]
async fn test_rejected_command() {
    let mut radio = VirtualTransceiver::new();
    radio.reject_opcode("MD");
    let bench = bench_with(radio);

    let err = bench.rig.set_mode(Mode::Am).await.unwrap_err();
    assert!(matches!(err, RigError::Rejected(_)));
    // The channel survives a rejection
    assert!(bench.rig.is_open().await);
    assert_eq!(bench.rig.read_s_meter().await.unwrap(), 7);
}

#[tokio::test]
async fn test_query_timeout() {
    let mut radio = VirtualTransceiver::new();
    radio.ignore_opcode("SM");
    let bench = bench_with(radio);

    let err = bench.rig.read_s_meter().await.unwrap_err();
    assert!(matches!(err, RigError::Timeout { ref opcode, .. } if opcode == "SM"));
}

#[tokio::test]
async fn test_channel_opens_once() {
    let bench = bench();
    assert!(!bench.rig.is_open().await);
    assert_eq!(bench.rig.open_count().await, 0);

    bench.rig.read_s_meter().await.unwrap();
    bench.rig.set_mode(Mode::Usb).await.unwrap();
    bench.rig.read_s_meter().await.unwrap();

    assert!(bench.rig.is_open().await);
    assert_eq!(bench.rig.open_count().await, 1);
}

#[tokio::test]
async fn test_closed_stream_reports_unavailable_on_reopen() {
    let bench = bench();
    bench.rig.read_s_meter().await.unwrap();
    bench.rig.close().await;
    assert!(!bench.rig.is_open().await);

    // A stream connector cannot reopen
    let err = bench.rig.read_s_meter().await.unwrap_err();
    assert!(matches!(err, RigError::ChannelUnavailable { .. }));
}

#[tokio::test]
async fn test_peer_hangup_drops_channel() {
    let bench = bench();
    bench.rig.read_s_meter().await.unwrap();
    bench.task.abort();
    let _ = bench.task.await;

    let err = bench.rig.read_s_meter().await.unwrap_err();
    assert!(matches!(err, RigError::ChannelClosed | RigError::Io(_)));
    assert!(!bench.rig.is_open().await);
}

#[tokio::test]
async fn test_phase_returns_to_idle() {
    let bench = bench();
    let phase = bench.rig.subscribe_phase();
    assert_eq!(*phase.borrow(), Phase::Idle);

    bench.rig.read_s_meter().await.unwrap();
    assert_eq!(*phase.borrow(), Phase::Idle);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_never_interleave() {
    let mut bench = bench();

    let mut handles = Vec::new();
    for i in 0..8u64 {
        let rig = Arc::clone(&bench.rig);
        handles.push(tokio::spawn(async move {
            let offset = ClarifierOffset::new((i as i32 + 1) * 100).unwrap();
            rig.set_clarifier(offset).await.unwrap();
            rig.read_s_meter().await.unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 7);
    }

    let mut requests = Vec::new();
    while let Ok(event) = bench.traffic.try_recv() {
        requests.push(event.request);
    }
    assert_eq!(requests.len(), 8 * 3);

    // Every clarifier offset frame is immediately followed by its switch frame
    for (i, request) in requests.iter().enumerate() {
        if request.starts_with("CF001") {
            assert_eq!(requests[i + 1], "CF00010000;");
        }
    }
    assert_eq!(bench.rig.open_count().await, 1);
}
