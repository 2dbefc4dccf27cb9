//! Hardware Abstraction Layer for the software UART transmitter

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::Duration;

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::Duration;

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Microsecond duration used when embassy-time is not linked in
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_micros(us: u64) -> Self {
            Self(us)
        }

        pub const fn as_micros(&self) -> u64 {
            self.0
        }
    }
}

use embedded_hal::digital::{InputPin, OutputPin};

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Timing operation failed
    TimingError,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::TimingError => write!(f, "Timing operation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// The single output line the encoder drives
pub trait TxLine {
    type Error: From<HalError>;

    /// Drive the line (true = High / mark, false = Low / space)
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;
}

/// A button (or any boolean input) sampled by the trigger poller
pub trait TriggerInput {
    type Error: From<HalError>;

    /// Check if the button is currently pressed
    fn is_pressed(&mut self) -> Result<bool, Self::Error>;
}

/// Generic implementation for embedded-hal compatible output pins
pub struct EmbeddedHalTxLine<P> {
    pin: P,
    inverted: bool,
}

impl<P> EmbeddedHalTxLine<P>
where
    P: OutputPin,
{
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }

    /// Release the wrapped pin
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P> TxLine for EmbeddedHalTxLine<P>
where
    P: OutputPin,
{
    type Error = HalError;

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        let output_level = if self.inverted { !high } else { high };
        if output_level {
            self.pin.set_high().map_err(|_| HalError::GpioError)
        } else {
            self.pin.set_low().map_err(|_| HalError::GpioError)
        }
    }
}

/// Generic implementation for embedded-hal compatible input pins
pub struct EmbeddedHalButton<P> {
    pin: P,
}

impl<P> EmbeddedHalButton<P>
where
    P: InputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P> TriggerInput for EmbeddedHalButton<P>
where
    P: InputPin,
{
    type Error = HalError;

    fn is_pressed(&mut self) -> Result<bool, Self::Error> {
        // Assuming active low (pulled up, grounded when pressed)
        self.pin.is_low().map_err(|_| HalError::GpioError)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    extern crate std;

    use super::*;
    use core::cell::{Cell, RefCell};
    use std::vec::Vec;

    /// Output line that records every level written to it
    #[derive(Default)]
    pub struct MockTxLine {
        writes: RefCell<Vec<bool>>,
        fail_next: Cell<bool>,
    }

    impl MockTxLine {
        pub fn new() -> Self {
            Self::default()
        }

        /// All levels written so far, in order
        pub fn writes(&self) -> Vec<bool> {
            self.writes.borrow().clone()
        }

        /// Last level written, if any
        pub fn level(&self) -> Option<bool> {
            self.writes.borrow().last().copied()
        }

        pub fn clear(&self) {
            self.writes.borrow_mut().clear();
        }

        /// Make the next `set_level` call fail with `GpioError`
        pub fn fail_next_write(&self) {
            self.fail_next.set(true);
        }
    }

    impl TxLine for MockTxLine {
        type Error = HalError;

        fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
            if self.fail_next.replace(false) {
                return Err(HalError::GpioError);
            }
            self.writes.borrow_mut().push(high);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockButton {
        pressed: Cell<bool>,
    }

    impl MockButton {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_pressed(&self, pressed: bool) {
            self.pressed.set(pressed);
        }
    }

    impl TriggerInput for MockButton {
        type Error = HalError;

        fn is_pressed(&mut self) -> Result<bool, Self::Error> {
            Ok(self.pressed.get())
        }
    }
}
