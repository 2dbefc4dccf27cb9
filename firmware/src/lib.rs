#![no_std]

//! Firmware library: shared encoder state, the bit timer interrupt and
//! the button polling task

pub use embassy_executor::Spawner;
pub use embassy_time::Duration;

pub use softuart_core::*;

pub use crate::ch32v203_hardware::*;
pub use crate::tasks::*;

/// Framing selected at power-on
pub const POWER_ON_CONFIG: FrameConfig = FrameConfig::new(MessageVariant::Bits32, StopBits::One, ParityMode::Space);

/// Encoder state shared by the TIM2 interrupt and the button task
pub static ENCODER: SharedEncoder = shared_encoder(POWER_ON_CONFIG);

/// Set by the transmit button, cleared by the encoder after the last stop bit
pub static TX_REQUEST: TransmitRequest = TransmitRequest::new();

pub mod tasks {
    use super::*;

    /// Button sampling interval of the main loop
    pub const BUTTON_POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Consecutive equal samples needed before a level change counts
    pub const BUTTON_DEBOUNCE_POLLS: u8 = 2;

    /// Button polling task: fires trigger actions on each press edge
    #[embassy_executor::task]
    pub async fn button_task(mut buttons: [BoardButton; BUTTON_COUNT]) {
        #[cfg(feature = "defmt")]
        defmt::info!("Button task started");

        let mut panel = ButtonPanel::with_debounce(BUTTON_DEBOUNCE_POLLS);

        loop {
            match panel.poll_inputs(&mut buttons) {
                Ok(actions) => {
                    for action in actions {
                        let _accepted = apply_action_shared(action, &ENCODER, &TX_REQUEST);
                        #[cfg(feature = "defmt")]
                        if _accepted {
                            defmt::info!("Action: {:?}", action);
                        } else {
                            defmt::debug!("Ignored {:?}: frame in flight", action);
                        }
                    }
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Button read failed: {:?}", _e);
                }
            }

            embassy_time::Timer::after(BUTTON_POLL_INTERVAL).await;
        }
    }

    /// Body of the bit timer interrupt: exactly one encoder tick
    pub fn service_bit_tick(line: &mut BoardTxLine) {
        if tick_shared(&ENCODER, line, &TX_REQUEST).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("TX line write failed");
        }
    }
}

/// TIM2 update interrupt, one per bit period
#[no_mangle]
extern "C" fn TIM2_IRQHandler() {
    clear_bit_timer_flag();
    service_bit_tick(&mut tx_line());
}

// CH32V203 hardware module
pub mod ch32v203_hardware;

// Time driver for embassy
mod time_driver;
