//! Tick-driven UART transmit state machine

use core::cell::RefCell;
use critical_section::Mutex;
use portable_atomic::{AtomicBool, Ordering};

use crate::hal::TxLine;
use crate::registry::FrameRegistry;
use crate::types::{FrameConfig, TransmitState, IDLE_LEVEL};

/// Pending transmission flag shared between the trigger context and the
/// tick handler. Safe for use in interrupt contexts.
pub struct TransmitRequest {
    pending: AtomicBool,
}

impl TransmitRequest {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Ask for one frame to be sent.
    ///
    /// Returns false when a frame is already pending or in flight; the
    /// call has no further effect in that case.
    pub fn request(&self) -> bool {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Called by the encoder once the last stop bit is out
    fn complete(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

impl Default for TransmitRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit-level UART encoder.
///
/// `on_tick` must be called once per bit period and never re-entered.
/// Every branch is constant time so it fits inside a timer interrupt.
pub struct UartEncoder {
    state: TransmitState,
    registry: FrameRegistry,
    stop_bits_sent: u8,
}

impl UartEncoder {
    /// Create a new encoder in `Idle` with the given framing
    pub const fn new(config: FrameConfig) -> Self {
        Self {
            state: TransmitState::Idle,
            registry: FrameRegistry::new(config),
            stop_bits_sent: 0,
        }
    }

    pub fn state(&self) -> TransmitState {
        self.state
    }

    pub fn config(&self) -> &FrameConfig {
        self.registry.config()
    }

    pub fn registry(&self) -> &FrameRegistry {
        &self.registry
    }

    /// Mutable access to the framing toggles. Intended for use between
    /// frames only; nothing here stops a caller from toggling mid-frame.
    pub fn registry_mut(&mut self) -> &mut FrameRegistry {
        &mut self.registry
    }

    /// Request a frame if the encoder is idle. Returns whether the
    /// request was accepted.
    pub fn request_transmit(&self, request: &TransmitRequest) -> bool {
        self.state.is_idle() && request.request()
    }

    /// Level the line should rest at before the first tick
    pub fn init_line<L: TxLine>(&self, line: &mut L) -> Result<(), L::Error> {
        line.set_level(IDLE_LEVEL)
    }

    /// Advance by one bit period, writing at most one level to `line`.
    ///
    /// The state only advances after the line write succeeds, so a failed
    /// write is retried on the next tick.
    pub fn on_tick<L: TxLine>(&mut self, line: &mut L, request: &TransmitRequest) -> Result<(), L::Error> {
        match self.state {
            TransmitState::Idle => {
                if request.is_pending() {
                    self.transition(TransmitState::Start);
                }
            }

            TransmitState::Start => {
                line.set_level(false)?;
                self.transition(TransmitState::Data);
            }

            TransmitState::Data => {
                self.handle_data_tick(line)?;
            }

            TransmitState::Parity => match self.config().parity.emitted_level() {
                Some(level) => {
                    line.set_level(level)?;
                    self.transition(TransmitState::Stop);
                }
                None => {
                    // No parity slot: this tick is already the first stop tick
                    self.transition(TransmitState::Stop);
                    self.handle_stop_tick(line, request)?;
                }
            },

            TransmitState::Stop => {
                self.handle_stop_tick(line, request)?;
            }
        }
        Ok(())
    }

    fn handle_data_tick<L: TxLine>(&mut self, line: &mut L) -> Result<(), L::Error> {
        line.set_level(self.registry.current_bit())?;

        if self.registry.advance() {
            self.transition(TransmitState::Parity);
        }
        Ok(())
    }

    fn handle_stop_tick<L: TxLine>(&mut self, line: &mut L, request: &TransmitRequest) -> Result<(), L::Error> {
        let target = self.config().stop_bits.count();
        if self.stop_bits_sent < target {
            line.set_level(true)?;
            self.stop_bits_sent += 1;
        }
        if self.stop_bits_sent >= target {
            self.finish(request);
        }
        Ok(())
    }

    fn finish(&mut self, request: &TransmitRequest) {
        self.stop_bits_sent = 0;
        request.complete();
        self.transition(TransmitState::Idle);
    }

    fn transition(&mut self, next: TransmitState) {
        #[cfg(feature = "defmt")]
        defmt::trace!("TX state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Abort any frame in flight and return to `Idle`
    pub fn reset(&mut self, request: &TransmitRequest) {
        self.registry.rewind();
        self.finish(request);
    }
}

impl Default for UartEncoder {
    fn default() -> Self {
        Self::new(FrameConfig::default())
    }
}

/// Encoder shared between the tick interrupt and the trigger context
pub type SharedEncoder = Mutex<RefCell<UartEncoder>>;

pub const fn shared_encoder(config: FrameConfig) -> SharedEncoder {
    Mutex::new(RefCell::new(UartEncoder::new(config)))
}

/// Run one tick on a shared encoder (call from the timer interrupt)
pub fn tick_shared<L: TxLine>(encoder: &SharedEncoder, line: &mut L, request: &TransmitRequest) -> Result<(), L::Error> {
    critical_section::with(|cs| encoder.borrow_ref_mut(cs).on_tick(line, request))
}

/// Snapshot of the shared encoder's state and framing
pub fn snapshot_shared(encoder: &SharedEncoder) -> (TransmitState, FrameConfig) {
    critical_section::with(|cs| {
        let encoder = encoder.borrow_ref(cs);
        (encoder.state(), *encoder.config())
    })
}
