//! Encoder shared between a periodic tick task and a trigger task

use std::sync::Arc;
use std::time::Duration;

use softuart_core::hal::mock::MockTxLine;
use softuart_core::*;

static ENCODER: SharedEncoder = shared_encoder(FrameConfig::new(
    MessageVariant::Bits32,
    StopBits::One,
    ParityMode::Space,
));

#[tokio::test(start_paused = true)]
async fn test_tick_task_and_trigger_task() {
    let request = Arc::new(TransmitRequest::new());
    let bit_period = TickConfig::default().bit_period();

    let tick_request = request.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_micros(bit_period.as_micros()));
        let mut line = MockTxLine::new();
        let mut frames = 0;
        let mut was_active = false;

        while frames < 2 {
            interval.tick().await;
            tick_shared(&ENCODER, &mut line, &tick_request).unwrap();

            let active = snapshot_shared(&ENCODER).0.is_active();
            if was_active && !active {
                frames += 1;
            }
            was_active = active;
        }
        line.writes()
    });

    // First press starts a frame, repeated presses while it is pending are ignored
    assert!(apply_action_shared(TriggerAction::Transmit, &ENCODER, &request));
    let mut ignored = 0;
    for _ in 0..5 {
        tokio::task::yield_now().await;
        if request.is_pending() {
            assert!(!apply_action_shared(TriggerAction::Transmit, &ENCODER, &request));
            ignored += 1;
        }
    }
    assert!(ignored > 0);

    // Wait for the frame to drain, then change framing and send again
    while request.is_pending() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(apply_action_shared(TriggerAction::CycleMessage, &ENCODER, &request));
    assert!(apply_action_shared(TriggerAction::Transmit, &ENCODER, &request));

    let writes = ticker.await.unwrap();
    // 4-byte frame then 3-byte frame, each with start, parity and one stop bit
    assert_eq!(writes.len(), (1 + 32 + 1 + 1) + (1 + 24 + 1 + 1));
    assert_eq!(snapshot_shared(&ENCODER).1.message, MessageVariant::Bits24);
}

#[test]
fn test_request_flag_from_many_threads() {
    let request = Arc::new(TransmitRequest::new());
    let accepted: usize = (0..8)
        .map(|_| {
            let request = request.clone();
            std::thread::spawn(move || request.request() as usize)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .sum();

    assert_eq!(accepted, 1);
    assert!(request.is_pending());
}
