#![cfg_attr(not(feature = "std"), no_std)]

//! # Soft UART Core
//!
//! Bit-banged UART transmitter for embedded systems. A fixed-period tick
//! drives a small state machine that emits start, data, parity and stop
//! bits on a single GPIO line.

pub mod types;
pub mod registry;
pub mod encoder;
pub mod trigger;
pub mod timing;
pub mod hal;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use registry::*;
pub use encoder::*;
pub use trigger::*;
pub use timing::*;
pub use hal::{Duration, HalError, TxLine, TriggerInput, EmbeddedHalTxLine, EmbeddedHalButton};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Power-on framing of the reference demo: 4-byte payload, one stop bit,
/// space parity
pub fn default_config() -> FrameConfig {
    FrameConfig {
        message: MessageVariant::Bits32,
        stop_bits: StopBits::One,
        parity: ParityMode::Space,
    }
}
