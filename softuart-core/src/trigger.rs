//! Button edge detection and the actions bound to each button

use heapless::Vec;

use crate::encoder::{SharedEncoder, TransmitRequest, UartEncoder};
use crate::hal::TriggerInput;

/// Number of buttons on the trigger panel
pub const BUTTON_COUNT: usize = 4;

/// Operation fired by a button press
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerAction {
    /// Start a frame (S6 on the reference board)
    Transmit,
    /// Select the next payload (S3)
    CycleMessage,
    /// Select the next stop bit count (S5)
    CycleStopBits,
    /// Select the next parity mode (S4)
    CycleParity,
}

impl TriggerAction {
    /// Button-to-action binding, in polling order
    pub const PANEL: [TriggerAction; BUTTON_COUNT] = [
        TriggerAction::Transmit,
        TriggerAction::CycleMessage,
        TriggerAction::CycleStopBits,
        TriggerAction::CycleParity,
    ];
}

/// Rising-edge detector for a polled button
#[derive(Copy, Clone, Debug, Default)]
pub struct EdgeDetector {
    previous: bool,
    candidate: bool,
    stable_polls: u8,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self {
            previous: false,
            candidate: false,
            stable_polls: 0,
        }
    }

    /// Feed one sample. Returns true only on a not-pressed -> pressed edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = !self.previous && pressed;
        self.previous = pressed;
        edge
    }

    /// Like [`update`](Self::update), but a new level must be seen on
    /// `debounce_polls` consecutive polls before it is accepted.
    pub fn update_debounced(&mut self, pressed: bool, debounce_polls: u8) -> bool {
        if debounce_polls == 0 {
            return self.update(pressed);
        }

        if pressed != self.candidate {
            self.candidate = pressed;
            self.stable_polls = 0;
        }
        if self.candidate == self.previous {
            return false;
        }

        self.stable_polls = self.stable_polls.saturating_add(1);
        if self.stable_polls >= debounce_polls {
            self.stable_polls = 0;
            return self.update(self.candidate);
        }
        false
    }

    /// Last accepted level
    pub fn is_pressed(&self) -> bool {
        self.previous
    }
}

/// The four trigger buttons, polled once per main-loop iteration
#[derive(Clone, Debug, Default)]
pub struct ButtonPanel {
    detectors: [EdgeDetector; BUTTON_COUNT],
    debounce_polls: u8,
}

impl ButtonPanel {
    pub const fn new() -> Self {
        Self::with_debounce(0)
    }

    /// Require a level to hold for `debounce_polls` polls before it counts
    pub const fn with_debounce(debounce_polls: u8) -> Self {
        Self {
            detectors: [EdgeDetector::new(); BUTTON_COUNT],
            debounce_polls,
        }
    }

    /// Feed one sample per button (in [`TriggerAction::PANEL`] order) and
    /// collect the actions whose button was just pressed
    pub fn poll(&mut self, pressed: [bool; BUTTON_COUNT]) -> Vec<TriggerAction, BUTTON_COUNT> {
        let mut actions = Vec::new();
        for ((detector, sample), action) in self
            .detectors
            .iter_mut()
            .zip(pressed)
            .zip(TriggerAction::PANEL)
        {
            if detector.update_debounced(sample, self.debounce_polls) {
                // Capacity equals the number of buttons
                actions.push(action).ok();
            }
        }
        actions
    }

    /// Sample a set of inputs and return the fired actions
    pub fn poll_inputs<B: TriggerInput>(
        &mut self,
        inputs: &mut [B; BUTTON_COUNT],
    ) -> Result<Vec<TriggerAction, BUTTON_COUNT>, B::Error> {
        let mut samples = [false; BUTTON_COUNT];
        for (sample, input) in samples.iter_mut().zip(inputs.iter_mut()) {
            *sample = input.is_pressed()?;
        }
        Ok(self.poll(samples))
    }
}

/// Dispatch one action to the encoder.
///
/// Returns false only for a `Transmit` that was ignored because a frame
/// is already pending or in flight.
pub fn apply_action(action: TriggerAction, encoder: &mut UartEncoder, request: &TransmitRequest) -> bool {
    match action {
        TriggerAction::Transmit => encoder.request_transmit(request),
        TriggerAction::CycleMessage => {
            let _message = encoder.registry_mut().cycle_message_variant();
            #[cfg(feature = "defmt")]
            defmt::debug!("Message: {:?}", _message);
            true
        }
        TriggerAction::CycleStopBits => {
            let _stop_bits = encoder.registry_mut().cycle_stop_bits();
            #[cfg(feature = "defmt")]
            defmt::debug!("Stop bits: {:?}", _stop_bits);
            true
        }
        TriggerAction::CycleParity => {
            let _parity = encoder.registry_mut().cycle_parity_mode();
            #[cfg(feature = "defmt")]
            defmt::debug!("Parity: {:?}", _parity);
            true
        }
    }
}

/// [`apply_action`] on an encoder shared with the tick interrupt
pub fn apply_action_shared(action: TriggerAction, encoder: &SharedEncoder, request: &TransmitRequest) -> bool {
    critical_section::with(|cs| apply_action(action, &mut encoder.borrow_ref_mut(cs), request))
}
