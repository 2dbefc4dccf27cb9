//! Core data types for the software UART transmitter

/// Line level while no frame is being sent
pub const IDLE_LEVEL: bool = true;

/// Bits shifted out per payload byte, independent of the selected message
pub const BITS_PER_BYTE: u8 = 8;

/// Encoder phase
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitState {
    /// Waiting for a transmit request
    Idle,
    /// Next tick drives the start bit
    Start,
    /// Shifting payload bits, LSB first
    Data,
    /// Optional parity slot
    Parity,
    /// Holding the line high for the configured stop bits
    Stop,
}

impl TransmitState {
    pub const fn is_idle(&self) -> bool {
        matches!(self, TransmitState::Idle)
    }

    /// Returns true once a frame has started and until it completes
    pub const fn is_active(&self) -> bool {
        !self.is_idle()
    }
}

/// Parity selection as exposed on the board
///
/// Only the presence of a parity slot is honoured on the wire: every mode
/// other than `None` emits a Low (space) level.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParityMode {
    None = 0,
    Odd = 1,
    Even = 2,
    Mark = 3,
    Space = 4,
}

impl ParityMode {
    pub const COUNT: u8 = 5;

    pub const fn index(&self) -> u8 {
        *self as u8
    }

    pub const fn from_index(index: u8) -> Self {
        match index % Self::COUNT {
            0 => ParityMode::None,
            1 => ParityMode::Odd,
            2 => ParityMode::Even,
            3 => ParityMode::Mark,
            _ => ParityMode::Space,
        }
    }

    /// Next mode in toggle order, wrapping Space -> None
    pub const fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Level driven during the parity slot, `None` when no slot is sent
    pub const fn emitted_level(&self) -> Option<bool> {
        match self {
            ParityMode::None => None,
            ParityMode::Odd | ParityMode::Even | ParityMode::Mark | ParityMode::Space => Some(false),
        }
    }
}

impl Default for ParityMode {
    fn default() -> Self {
        ParityMode::Space
    }
}

/// Number of stop bits held after the parity slot
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    Zero,
    One,
    Two,
}

impl StopBits {
    pub const fn count(&self) -> u8 {
        match self {
            StopBits::Zero => 0,
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }

    /// Next setting in toggle order: One -> Two -> Zero -> One
    pub const fn next(&self) -> Self {
        match self {
            StopBits::One => StopBits::Two,
            StopBits::Two => StopBits::Zero,
            StopBits::Zero => StopBits::One,
        }
    }
}

impl Default for StopBits {
    fn default() -> Self {
        StopBits::One
    }
}

/// Fixed demo payloads, named after their total data bit count
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageVariant {
    /// "32b " (4 bytes)
    Bits32,
    /// "24b" (3 bytes)
    Bits24,
    /// "16" (2 bytes)
    Bits16,
}

impl MessageVariant {
    pub const fn payload(&self) -> &'static [u8] {
        match self {
            MessageVariant::Bits32 => b"32b ",
            MessageVariant::Bits24 => b"24b",
            MessageVariant::Bits16 => b"16",
        }
    }

    /// Total data bits on the wire for this payload
    pub const fn data_bits(&self) -> usize {
        self.payload().len() * BITS_PER_BYTE as usize
    }

    /// Next payload in toggle order: Bits32 -> Bits24 -> Bits16 -> Bits32
    pub const fn next(&self) -> Self {
        match self {
            MessageVariant::Bits32 => MessageVariant::Bits24,
            MessageVariant::Bits24 => MessageVariant::Bits16,
            MessageVariant::Bits16 => MessageVariant::Bits32,
        }
    }
}

impl Default for MessageVariant {
    fn default() -> Self {
        MessageVariant::Bits32
    }
}

/// Framing parameters toggled between transmissions
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameConfig {
    pub message: MessageVariant,
    pub stop_bits: StopBits,
    pub parity: ParityMode,
}

impl FrameConfig {
    pub const fn new(message: MessageVariant, stop_bits: StopBits, parity: ParityMode) -> Self {
        Self {
            message,
            stop_bits,
            parity,
        }
    }

    /// Ticks needed for one complete frame, start bit included
    pub const fn frame_ticks(&self) -> usize {
        let parity = match self.parity.emitted_level() {
            Some(_) => 1,
            None => 0,
        };
        // Zero stop bits still spends one tick completing the frame
        let stop_ticks = match self.stop_bits {
            StopBits::Zero => 1,
            other => other.count() as usize,
        };
        1 + self.message.data_bits() + parity + stop_ticks
    }
}
