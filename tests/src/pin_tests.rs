//! Encoder and trigger adapters against embedded-hal mock pins

use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction};
use softuart_core::*;

fn bits_lsb_first(payload: &[u8]) -> impl Iterator<Item = bool> + '_ {
    payload.iter().flat_map(|byte| (0..8).map(move |bit| (byte >> bit) & 1 == 1))
}

fn level(high: bool) -> Transaction {
    Transaction::set(if high { State::High } else { State::Low })
}

#[test]
fn test_frame_on_mock_output_pin() {
    let config = FrameConfig::new(MessageVariant::Bits16, StopBits::Two, ParityMode::Odd);

    let mut expected = vec![level(true), level(false)];
    expected.extend(bits_lsb_first(b"16").map(level));
    expected.push(level(false));
    expected.push(level(true));
    expected.push(level(true));

    let pin = PinMock::new(&expected);
    let mut line = EmbeddedHalTxLine::new(pin, false);
    let mut encoder = UartEncoder::new(config);
    let request = TransmitRequest::new();

    encoder.init_line(&mut line).unwrap();
    assert!(encoder.request_transmit(&request));
    loop {
        encoder.on_tick(&mut line, &request).unwrap();
        if encoder.state().is_idle() {
            break;
        }
    }

    line.free().done();
}

#[test]
fn test_inverted_line_flips_levels() {
    let config = FrameConfig::new(MessageVariant::Bits16, StopBits::One, ParityMode::None);

    let mut expected = vec![level(true)];
    expected.extend(bits_lsb_first(b"16").map(|high| level(!high)));
    expected.push(level(false));

    let pin = PinMock::new(&expected);
    let mut line = EmbeddedHalTxLine::new(pin, true);
    let mut encoder = UartEncoder::new(config);
    let request = TransmitRequest::new();

    request.request();
    while {
        encoder.on_tick(&mut line, &request).unwrap();
        encoder.state().is_active()
    } {}

    line.free().done();
}

#[test]
fn test_buttons_on_mock_input_pins() {
    // Transmit button pressed on the second poll only
    let mut pins = [
        PinMock::new(&[Transaction::get(State::High), Transaction::get(State::Low)]),
        PinMock::new(&[Transaction::get(State::High), Transaction::get(State::High)]),
        PinMock::new(&[Transaction::get(State::High), Transaction::get(State::High)]),
        PinMock::new(&[Transaction::get(State::High), Transaction::get(State::High)]),
    ];

    let mut buttons = pins.clone().map(EmbeddedHalButton::new);
    let mut panel = ButtonPanel::new();
    let mut encoder = UartEncoder::default();
    let request = TransmitRequest::new();

    assert!(panel.poll_inputs(&mut buttons).unwrap().is_empty());
    let fired = panel.poll_inputs(&mut buttons).unwrap();
    assert_eq!(fired.as_slice(), &[TriggerAction::Transmit]);
    assert!(apply_action(fired[0], &mut encoder, &request));
    assert!(request.is_pending());

    for pin in pins.iter_mut() {
        pin.done();
    }
}
