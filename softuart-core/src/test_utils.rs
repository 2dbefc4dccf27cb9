//! Test utilities for driving the encoder without hardware

#[cfg(feature = "test-utils")]
pub mod waveform {
    //! Per-tick line capture and frame decoding

    use crate::encoder::{TransmitRequest, UartEncoder};
    use crate::hal::{HalError, TxLine};
    use crate::types::{FrameConfig, IDLE_LEVEL};

    /// Records the line level once per tick, whether or not it was written
    #[derive(Debug, Clone)]
    pub struct WaveformCapture {
        level: bool,
        written_this_tick: bool,
        samples: Vec<bool>,
        writes_per_tick: Vec<u8>,
    }

    impl Default for WaveformCapture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WaveformCapture {
        pub fn new() -> Self {
            Self {
                level: IDLE_LEVEL,
                written_this_tick: false,
                samples: Vec::new(),
                writes_per_tick: Vec::new(),
            }
        }

        /// Close the current tick and sample the line
        pub fn end_tick(&mut self) {
            self.samples.push(self.level);
            self.writes_per_tick.push(self.written_this_tick as u8);
            self.written_this_tick = false;
        }

        /// Line level after each tick
        pub fn samples(&self) -> &[bool] {
            &self.samples
        }

        /// Number of writes seen during each tick (0 or 1)
        pub fn writes_per_tick(&self) -> &[u8] {
            &self.writes_per_tick
        }

        pub fn clear(&mut self) {
            self.samples.clear();
            self.writes_per_tick.clear();
            self.written_this_tick = false;
        }

        /// Render as a string of '1'/'0', one char per tick
        pub fn to_bit_string(&self) -> String {
            self.samples.iter().map(|&high| if high { '1' } else { '0' }).collect()
        }
    }

    impl TxLine for WaveformCapture {
        type Error = HalError;

        fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
            if self.written_this_tick {
                // More than one write per tick breaks the bit timing
                return Err(HalError::TimingError);
            }
            self.level = high;
            self.written_this_tick = true;
            Ok(())
        }
    }

    /// Tick the encoder until it returns to Idle or `max_ticks` is hit.
    /// Returns the number of ticks taken.
    pub fn run_until_idle(
        encoder: &mut UartEncoder,
        capture: &mut WaveformCapture,
        request: &TransmitRequest,
        max_ticks: usize,
    ) -> Result<usize, HalError> {
        for tick in 1..=max_ticks {
            encoder.on_tick(capture, request)?;
            capture.end_tick();
            if encoder.state().is_idle() {
                return Ok(tick);
            }
        }
        Err(HalError::TimingError)
    }

    /// Why [`capture_frame`] could not produce a frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CaptureError {
        /// The encoder was busy or a request was already pending
        Rejected,
        /// The line failed or the frame never finished
        Line(HalError),
    }

    impl From<HalError> for CaptureError {
        fn from(err: HalError) -> Self {
            CaptureError::Line(err)
        }
    }

    /// Request one frame and capture it, starting from Idle
    pub fn capture_frame(encoder: &mut UartEncoder, request: &TransmitRequest) -> Result<WaveformCapture, CaptureError> {
        let mut capture = WaveformCapture::new();
        if !encoder.request_transmit(request) {
            return Err(CaptureError::Rejected);
        }
        // Tick that notices the request
        encoder.on_tick(&mut capture, request)?;
        capture.clear();
        run_until_idle(encoder, &mut capture, request, 1024)?;
        Ok(capture)
    }

    /// A frame split back into its parts
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DecodedFrame {
        pub start_bit: bool,
        pub bytes: Vec<u8>,
        pub parity_bit: Option<bool>,
        pub stop_bits: Vec<bool>,
    }

    /// Split captured per-tick samples (first sample = start bit) using the
    /// framing the encoder was configured with
    pub fn decode_frame(samples: &[bool], config: &FrameConfig) -> Option<DecodedFrame> {
        let data_bits = config.message.data_bits();
        let has_parity = config.parity.emitted_level().is_some();
        let stop_count = config.stop_bits.count() as usize;
        if samples.len() < 1 + data_bits + has_parity as usize + stop_count {
            return None;
        }

        let start_bit = samples[0];
        let bytes = samples[1..1 + data_bits]
            .chunks(8)
            .map(|bits| {
                bits.iter()
                    .enumerate()
                    .fold(0u8, |byte, (i, &high)| byte | ((high as u8) << i))
            })
            .collect();

        let mut index = 1 + data_bits;
        let parity_bit = if has_parity {
            index += 1;
            Some(samples[index - 1])
        } else {
            None
        };
        let stop_bits = samples[index..index + stop_count].to_vec();

        Some(DecodedFrame {
            start_bit,
            bytes,
            parity_bit,
            stop_bits,
        })
    }
}

#[cfg(feature = "test-utils")]
pub mod scenarios {
    //! Common framing combinations

    use crate::types::{FrameConfig, MessageVariant, ParityMode, StopBits};

    /// Every message / stop bit / parity combination the panel can select
    pub fn all_configs() -> Vec<FrameConfig> {
        let messages = [MessageVariant::Bits32, MessageVariant::Bits24, MessageVariant::Bits16];
        let stops = [StopBits::Zero, StopBits::One, StopBits::Two];
        let parities = [
            ParityMode::None,
            ParityMode::Odd,
            ParityMode::Even,
            ParityMode::Mark,
            ParityMode::Space,
        ];

        let mut configs = Vec::new();
        for message in messages {
            for stop_bits in stops {
                for parity in parities {
                    configs.push(FrameConfig::new(message, stop_bits, parity));
                }
            }
        }
        configs
    }
}
