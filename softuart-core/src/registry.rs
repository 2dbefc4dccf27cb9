//! Frame configuration registry and payload cursor

use crate::types::{FrameConfig, MessageVariant, ParityMode, StopBits, BITS_PER_BYTE};

/// Holds the toggleable framing parameters and the cursor into the
/// selected payload.
///
/// The toggle operations do not check whether a frame is in flight.
/// Changing the message mid-frame rewinds the cursor, so the remaining
/// ticks of that frame shift out the new payload from its first bit.
#[derive(Clone, Debug)]
pub struct FrameRegistry {
    config: FrameConfig,
    byte_index: usize,
    bit_offset: u8,
}

impl FrameRegistry {
    pub const fn new(config: FrameConfig) -> Self {
        Self {
            config,
            byte_index: 0,
            bit_offset: 0,
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Replace the whole configuration and rewind the cursor
    pub fn set_config(&mut self, config: FrameConfig) {
        self.config = config;
        self.rewind();
    }

    pub fn payload(&self) -> &'static [u8] {
        self.config.message.payload()
    }

    /// Select the next fixed payload (wraps after three)
    pub fn cycle_message_variant(&mut self) -> MessageVariant {
        self.config.message = self.config.message.next();
        self.rewind();
        self.config.message
    }

    /// Advance the stop bit count: 1 -> 2 -> 0 -> 1
    pub fn cycle_stop_bits(&mut self) -> StopBits {
        self.config.stop_bits = self.config.stop_bits.next();
        self.config.stop_bits
    }

    /// Advance the parity mode through all five settings
    pub fn cycle_parity_mode(&mut self) -> ParityMode {
        self.config.parity = self.config.parity.next();
        self.config.parity
    }

    /// Move the cursor back to bit 0 of byte 0
    pub fn rewind(&mut self) {
        self.byte_index = 0;
        self.bit_offset = 0;
    }

    /// Byte index and bit offset of the next bit to send
    pub fn cursor(&self) -> (usize, u8) {
        (self.byte_index, self.bit_offset)
    }

    /// Level of the bit under the cursor, without advancing
    pub fn current_bit(&self) -> bool {
        let byte = self.payload().get(self.byte_index).copied().unwrap_or(0);
        (byte >> self.bit_offset) & 0x01 == 0x01
    }

    /// Step the cursor past the current bit. Returns true when that was
    /// the last bit of the payload, in which case the cursor is rewound
    /// for the next frame.
    pub fn advance(&mut self) -> bool {
        self.bit_offset += 1;
        if self.bit_offset == BITS_PER_BYTE {
            self.bit_offset = 0;
            self.byte_index += 1;
        }

        let last = self.byte_index >= self.payload().len();
        if last {
            self.rewind();
        }
        last
    }

}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new(FrameConfig::default())
    }
}
