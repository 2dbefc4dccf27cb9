//! CH32V203 Hardware Implementation
//!
//! Register-level GPIO, TIM2 and SysTick setup. The core clock is left on
//! the 8 MHz HSI it boots from, so HCLK = PCLK1 = 8 MHz.

use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use softuart_core::{EmbeddedHalButton, EmbeddedHalTxLine, TickConfig, BUTTON_COUNT};

/// Core / peripheral clock after reset
pub const HCLK_HZ: u32 = 8_000_000;

/// Line rate of the software UART
pub const BAUD: u32 = 9_600;

/// SysTick rate feeding the embassy time driver
pub const SYSTICK_HZ: u32 = 1_000;

const RCC_BASE: u32 = 0x4002_1000;
const GPIOA_BASE: u32 = 0x4001_0800;
const TIM2_BASE: u32 = 0x4000_0000;
const PFIC_BASE: u32 = 0xE000_E000;
const STK_BASE: u32 = 0xE000_F000;

const RCC_APB2PCENR: u32 = 0x18;
const RCC_APB1PCENR: u32 = 0x1C;

const GPIO_CFGLR: u32 = 0x00;
const GPIO_INDR: u32 = 0x08;
const GPIO_OUTDR: u32 = 0x0C;
const GPIO_BSHR: u32 = 0x10;
const GPIO_BCR: u32 = 0x14;

const TIM_CTLR1: u32 = 0x00;
const TIM_DMAINTENR: u32 = 0x0C;
const TIM_INTFR: u32 = 0x10;
const TIM_CNT: u32 = 0x24;
const TIM_PSC: u32 = 0x28;
const TIM_ATRLR: u32 = 0x2C;

const PFIC_IENR: u32 = 0x100;

const STK_CTLR: u32 = 0x00;
const STK_SR: u32 = 0x04;
const STK_CMPLR: u32 = 0x10;

const IRQ_SYSTICK: u32 = 12;
const IRQ_TIM2: u32 = 44;

/// Pin assignment on port A
pub mod pins {
    /// Software UART TX
    pub const TX_PIN: u8 = 2; // PA2

    /// Start transmission (S6 on the demo board)
    pub const TRANSMIT_PIN: u8 = 3; // PA3

    /// Cycle payload (S3)
    pub const MESSAGE_PIN: u8 = 4; // PA4

    /// Cycle stop bits (S5)
    pub const STOP_BITS_PIN: u8 = 5; // PA5

    /// Cycle parity (S4)
    pub const PARITY_PIN: u8 = 6; // PA6

    /// Buttons in panel order
    pub const BUTTON_PINS: [u8; super::BUTTON_COUNT] = [TRANSMIT_PIN, MESSAGE_PIN, STOP_BITS_PIN, PARITY_PIN];
}

#[inline(always)]
fn reg(base: u32, offset: u32) -> *mut u32 {
    (base + offset) as *mut u32
}

#[inline(always)]
unsafe fn modify(base: u32, offset: u32, f: impl FnOnce(u32) -> u32) {
    let r = reg(base, offset);
    core::ptr::write_volatile(r, f(core::ptr::read_volatile(r)));
}

/// Push-pull output on port A
pub struct PortAOutput {
    pin: u8,
}

impl PortAOutput {
    pub const fn new(pin: u8) -> Self {
        Self { pin }
    }
}

impl ErrorType for PortAOutput {
    type Error = Infallible;
}

impl OutputPin for PortAOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        unsafe { core::ptr::write_volatile(reg(GPIOA_BASE, GPIO_BCR), 1 << self.pin) };
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        unsafe { core::ptr::write_volatile(reg(GPIOA_BASE, GPIO_BSHR), 1 << self.pin) };
        Ok(())
    }
}

/// Pulled-up input on port A
pub struct PortAInput {
    pin: u8,
}

impl PortAInput {
    pub const fn new(pin: u8) -> Self {
        Self { pin }
    }
}

impl ErrorType for PortAInput {
    type Error = Infallible;
}

impl InputPin for PortAInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let indr = unsafe { core::ptr::read_volatile(reg(GPIOA_BASE, GPIO_INDR)) };
        Ok(indr & (1 << self.pin) != 0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// TX line as seen by the encoder
pub type BoardTxLine = EmbeddedHalTxLine<PortAOutput>;

/// Trigger buttons as seen by the panel (active-low)
pub type BoardButton = EmbeddedHalButton<PortAInput>;

pub fn tx_line() -> BoardTxLine {
    EmbeddedHalTxLine::new(PortAOutput::new(pins::TX_PIN), false)
}

pub fn buttons() -> [BoardButton; BUTTON_COUNT] {
    pins::BUTTON_PINS.map(|pin| EmbeddedHalButton::new(PortAInput::new(pin)))
}

/// Tick source parameters for this board, checked at compile time
pub const TICK_CONFIG: TickConfig = match TickConfig::new(HCLK_HZ, BAUD) {
    Ok(config) => config,
    Err(_) => panic!("HCLK_HZ / BAUD does not fit the 16-bit bit timer"),
};

/// Enable clocks and configure GPIO, TIM2 and SysTick
pub fn init_hardware() {
    enable_peripheral_clocks();
    configure_gpio_pins();
    configure_bit_timer(&TICK_CONFIG);
    configure_systick();

    #[cfg(feature = "defmt")]
    defmt::info!("CH32V203 hardware initialized");
}

fn enable_peripheral_clocks() {
    unsafe {
        // GPIOA
        modify(RCC_BASE, RCC_APB2PCENR, |v| v | (1 << 2));
        // TIM2
        modify(RCC_BASE, RCC_APB1PCENR, |v| v | (1 << 0));
    }
}

fn configure_gpio_pins() {
    unsafe {
        modify(GPIOA_BASE, GPIO_CFGLR, |mut cfg| {
            // TX: CNF=00 (push-pull), MODE=11 (50MHz output)
            cfg &= !(0xF << (pins::TX_PIN * 4));
            cfg |= 0x3 << (pins::TX_PIN * 4);

            // Buttons: CNF=10 (pull-up/down input), MODE=00
            for pin in pins::BUTTON_PINS {
                cfg &= !(0xF << (pin * 4));
                cfg |= 0x8 << (pin * 4);
            }
            cfg
        });

        // OUTDR selects pull-up for inputs and idles TX high
        modify(GPIOA_BASE, GPIO_OUTDR, |mut out| {
            out |= 1 << pins::TX_PIN;
            for pin in pins::BUTTON_PINS {
                out |= 1 << pin;
            }
            out
        });
    }
}

/// Run TIM2 at one update interrupt per bit period
fn configure_bit_timer(config: &TickConfig) {
    unsafe {
        core::ptr::write_volatile(reg(TIM2_BASE, TIM_PSC), 0);
        core::ptr::write_volatile(reg(TIM2_BASE, TIM_ATRLR), u32::from(config.timer_period_register()).saturating_sub(1));
        core::ptr::write_volatile(reg(TIM2_BASE, TIM_CNT), 0);
        core::ptr::write_volatile(reg(TIM2_BASE, TIM_INTFR), 0);
        // UIE
        core::ptr::write_volatile(reg(TIM2_BASE, TIM_DMAINTENR), 1);
        // ARPE | CEN
        core::ptr::write_volatile(reg(TIM2_BASE, TIM_CTLR1), (1 << 7) | 1);
    }
    enable_irq(IRQ_TIM2);
}

fn configure_systick() {
    unsafe {
        core::ptr::write_volatile(reg(STK_BASE, STK_SR), 0);
        core::ptr::write_volatile(reg(STK_BASE, STK_CMPLR), HCLK_HZ / SYSTICK_HZ - 1);
        // STE | STIE | STCLK (HCLK) | STRE (auto reload)
        core::ptr::write_volatile(reg(STK_BASE, STK_CTLR), 0xF);
    }
    enable_irq(IRQ_SYSTICK);
}

fn enable_irq(irq: u32) {
    unsafe {
        let ienr = reg(PFIC_BASE, PFIC_IENR + (irq / 32) * 4);
        core::ptr::write_volatile(ienr, 1 << (irq % 32));
    }
}

/// Acknowledge the TIM2 update interrupt
pub fn clear_bit_timer_flag() {
    unsafe { core::ptr::write_volatile(reg(TIM2_BASE, TIM_INTFR), 0) };
}

/// Acknowledge the SysTick compare interrupt
pub fn clear_systick_flag() {
    unsafe { core::ptr::write_volatile(reg(STK_BASE, STK_SR), 0) };
}
