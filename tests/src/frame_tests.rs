//! Whole-frame waveform checks across every selectable framing

use proptest::prelude::*;
use rstest::rstest;
use softuart_core::test_utils::scenarios::all_configs;
use softuart_core::test_utils::waveform::{
    capture_frame, decode_frame, run_until_idle, CaptureError, WaveformCapture,
};
use softuart_core::*;

#[rstest]
#[case(MessageVariant::Bits32, b"32b ")]
#[case(MessageVariant::Bits24, b"24b")]
#[case(MessageVariant::Bits16, b"16")]
fn test_payload_decodes_lsb_first(#[case] message: MessageVariant, #[case] expected: &[u8]) {
    let config = FrameConfig::new(message, StopBits::One, ParityMode::Space);
    let mut encoder = UartEncoder::new(config);
    let request = TransmitRequest::new();

    let capture = capture_frame(&mut encoder, &request).unwrap();
    let frame = decode_frame(capture.samples(), &config).unwrap();

    assert!(!frame.start_bit);
    assert_eq!(frame.bytes, expected);
    assert_eq!(frame.parity_bit, Some(false));
    assert_eq!(frame.stop_bits, vec![true]);
}

#[rstest]
#[case(StopBits::Zero, 0)]
#[case(StopBits::One, 1)]
#[case(StopBits::Two, 2)]
fn test_stop_bits_held_high(#[case] stop_bits: StopBits, #[case] held: usize) {
    let config = FrameConfig::new(MessageVariant::Bits24, stop_bits, ParityMode::Space);
    let mut encoder = UartEncoder::new(config);
    let request = TransmitRequest::new();

    let capture = capture_frame(&mut encoder, &request).unwrap();
    let writes: usize = capture.writes_per_tick().iter().map(|&w| w as usize).sum();

    // start + 24 data + parity + stop bits
    assert_eq!(writes, 1 + 24 + 1 + held);
    let stop_samples = &capture.samples()[26..26 + held];
    assert!(stop_samples.iter().all(|&high| high));
    assert!(!request.is_pending());
}

#[test]
fn test_reference_scenario_bit_string() {
    let mut encoder = UartEncoder::new(default_config());
    let request = TransmitRequest::new();
    let capture = capture_frame(&mut encoder, &request).unwrap();

    // '3'=0x33 '2'=0x32 'b'=0x62 ' '=0x20, each LSB first
    let expected = concat!("0", "11001100", "01001100", "01000110", "00000100", "0", "1");
    assert_eq!(capture.to_bit_string(), expected);
    assert_eq!(encoder.state(), TransmitState::Idle);
}

#[test]
fn test_every_config_completes_in_frame_ticks() {
    for config in all_configs() {
        let mut encoder = UartEncoder::new(config);
        let request = TransmitRequest::new();
        let capture = capture_frame(&mut encoder, &request).unwrap();

        assert_eq!(capture.samples().len(), config.frame_ticks(), "{:?}", config);
        assert!(capture.writes_per_tick().iter().all(|&w| w <= 1));
        let data_writes = capture.writes_per_tick()[1..1 + config.message.data_bits()]
            .iter()
            .filter(|&&w| w == 1)
            .count();
        assert_eq!(data_writes, config.message.data_bits());
    }
}

#[test]
fn test_panel_round_trips_restore_config() {
    let mut encoder = UartEncoder::default();
    let original = *encoder.config();

    for _ in 0..3 {
        encoder.registry_mut().cycle_message_variant();
    }
    for _ in 0..3 {
        encoder.registry_mut().cycle_stop_bits();
    }
    for _ in 0..5 {
        encoder.registry_mut().cycle_parity_mode();
    }
    assert_eq!(*encoder.config(), original);
}

#[test]
fn test_run_until_idle_reports_stuck_encoder() {
    let mut encoder = UartEncoder::default();
    let request = TransmitRequest::new();
    let mut capture = WaveformCapture::new();

    request.request();
    // A full frame needs 36 ticks including the idle tick
    assert_eq!(run_until_idle(&mut encoder, &mut capture, &request, 10), Err(HalError::TimingError));
    assert_eq!(run_until_idle(&mut encoder, &mut capture, &request, 100), Ok(26));
}

#[test]
fn test_capture_rejected_while_request_pending() {
    let mut encoder = UartEncoder::default();
    let request = TransmitRequest::new();

    assert!(request.request());
    assert_eq!(capture_frame(&mut encoder, &request).unwrap_err(), CaptureError::Rejected);
}

proptest! {
    #[test]
    fn prop_requests_during_frame_are_ignored(
        config_index in 0usize..45,
        request_ticks in proptest::collection::vec(0usize..40, 0..10),
    ) {
        let config = all_configs()[config_index];
        let mut encoder = UartEncoder::new(config);
        let request = TransmitRequest::new();
        let mut capture = WaveformCapture::new();

        prop_assert!(encoder.request_transmit(&request));
        let mut tick = 0;
        loop {
            if request_ticks.contains(&tick) {
                prop_assert!(!encoder.request_transmit(&request));
            }
            encoder.on_tick(&mut capture, &request).unwrap();
            capture.end_tick();
            tick += 1;
            if encoder.state().is_idle() {
                break;
            }
        }

        // Exactly one frame: the idle tick plus the frame itself
        prop_assert_eq!(tick, config.frame_ticks() + 1);
        prop_assert!(!request.is_pending());

        // And the encoder stays idle afterwards
        for _ in 0..5 {
            encoder.on_tick(&mut capture, &request).unwrap();
            capture.end_tick();
        }
        prop_assert!(encoder.state().is_idle());
    }

    #[test]
    fn prop_toggle_cycles_wrap(message in 0usize..10, stop in 0usize..10, parity in 0usize..20) {
        let mut registry = FrameRegistry::default();
        for _ in 0..message * 3 {
            registry.cycle_message_variant();
        }
        for _ in 0..stop * 3 {
            registry.cycle_stop_bits();
        }
        for _ in 0..parity * 5 {
            registry.cycle_parity_mode();
        }
        prop_assert_eq!(*registry.config(), default_config());
    }
}
