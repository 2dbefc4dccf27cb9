//! Bit period and timer register calculations for the tick source

use crate::hal::Duration;

/// Instruction clock of the reference board (8 MHz crystal, Fosc/2)
pub const DEFAULT_FCY_HZ: u32 = 4_000_000;

/// Default line rate
pub const DEFAULT_BAUD: u32 = 9_600;

/// Tick source parameters: one tick per bit period
///
/// Built through [`TickConfig::new`], so the baud rate is always non-zero,
/// at most the timer clock, and the period fits a 16-bit timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickConfig {
    fcy_hz: u32,
    baud: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            fcy_hz: DEFAULT_FCY_HZ,
            baud: DEFAULT_BAUD,
        }
    }
}

impl TickConfig {
    /// Create a new configuration with validation
    pub const fn new(fcy_hz: u32, baud: u32) -> Result<Self, &'static str> {
        if baud == 0 {
            return Err("Baud rate must be non-zero");
        }
        if baud > fcy_hz {
            return Err("Baud rate must not exceed the timer clock");
        }
        if fcy_hz / baud > u16::MAX as u32 {
            return Err("Bit period does not fit a 16-bit timer");
        }
        Ok(Self { fcy_hz, baud })
    }

    /// Timer input clock in Hz
    pub const fn fcy_hz(&self) -> u32 {
        self.fcy_hz
    }

    /// Bits per second on the line
    pub const fn baud(&self) -> u32 {
        self.baud
    }

    /// Duration of one bit, truncated to whole microseconds
    pub fn bit_period(&self) -> Duration {
        Duration::from_micros(1_000_000u64.checked_div(u64::from(self.baud)).unwrap_or(0))
    }

    /// Period register value for a 1:1 prescaled 16-bit timer, saturating
    pub fn timer_period_register(&self) -> u16 {
        u16::try_from(self.clocks_per_bit()).unwrap_or(u16::MAX)
    }

    /// Divisor a 16x oversampling hardware UART would need for the same rate
    pub fn hardware_uart_brg(&self) -> u16 {
        u16::try_from((self.clocks_per_bit() / 16).saturating_sub(1)).unwrap_or(u16::MAX)
    }

    /// Actual tick rate produced by the truncated period register
    pub fn effective_baud(&self) -> u32 {
        self.fcy_hz
            .checked_div(u32::from(self.timer_period_register()))
            .unwrap_or(0)
    }

    fn clocks_per_bit(&self) -> u32 {
        self.fcy_hz.checked_div(self.baud).unwrap_or(0)
    }
}
