//! In-memory platform for host tests and simulation.
//!
//! Each type implements one trait from [`crate::platform`] and records what
//! the cycle did to it.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::arming::{EdgePolarity, TouchPad};
use crate::platform::{AnalogSource, Notifier, StateStore, WakeArming};
use crate::state::LetterboxState;

/// Retained-memory byte.
#[derive(Debug, Clone)]
pub struct MockRetained {
    byte: u8,
    persists: usize,
}

impl MockRetained {
    pub fn new(state: LetterboxState) -> Self {
        Self::with_byte(state.to_byte())
    }

    /// Start from an arbitrary raw byte, e.g. to model corruption.
    pub fn with_byte(byte: u8) -> Self {
        Self { byte, persists: 0 }
    }

    pub fn byte(&self) -> u8 {
        self.byte
    }

    pub fn state(&self) -> Option<LetterboxState> {
        LetterboxState::from_byte(self.byte)
    }

    /// Number of `persist` calls so far.
    pub fn persists(&self) -> usize {
        self.persists
    }

    /// Overwrite the byte without counting a persist.
    pub fn corrupt(&mut self, byte: u8) {
        self.byte = byte;
    }
}

impl Default for MockRetained {
    fn default() -> Self {
        Self::new(LetterboxState::default())
    }
}

impl StateStore for MockRetained {
    fn load(&mut self) -> Option<LetterboxState> {
        LetterboxState::from_byte(self.byte)
    }

    fn persist(&mut self, state: LetterboxState) {
        self.byte = state.to_byte();
        self.persists += 1;
    }
}

/// ADC pin with a settable reading.
#[derive(Debug, Clone, Default)]
pub struct MockAnalog {
    millivolts: u32,
    reads: usize,
}

impl MockAnalog {
    pub fn new(millivolts: u32) -> Self {
        Self {
            millivolts,
            reads: 0,
        }
    }

    pub fn set_millivolts(&mut self, millivolts: u32) {
        self.millivolts = millivolts;
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl AnalogSource for MockAnalog {
    fn read_millivolts(&mut self) -> u32 {
        self.reads += 1;
        self.millivolts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSendError;

/// Transport that records every message it is asked to send.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    attempts: Vec<String>,
    offline: bool,
}

impl MockNotifier {
    /// A transport whose every send fails (no network).
    pub fn offline() -> Self {
        Self {
            attempts: Vec::new(),
            offline: true,
        }
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Every text handed to `send`, delivered or not.
    pub fn attempts(&self) -> &[String] {
        &self.attempts
    }

    pub fn last(&self) -> Option<&str> {
        self.attempts.last().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.attempts.clear();
    }
}

impl Notifier for MockNotifier {
    type Error = MockSendError;

    fn send(&mut self, text: &str) -> Result<(), Self::Error> {
        self.attempts.push(text.to_string());
        if self.offline {
            return Err(MockSendError);
        }
        Ok(())
    }
}

/// One call made against the wake-source registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingCall {
    Touch(TouchPad),
    Edge { mask: u64, polarity: EdgePolarity },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockArmingError;

/// Wake-source registers that log each write.
#[derive(Debug, Clone, Default)]
pub struct MockArming {
    calls: Vec<ArmingCall>,
    failing: bool,
}

impl MockArming {
    /// Registers that reject every write.
    pub fn failing() -> Self {
        Self {
            calls: Vec::new(),
            failing: true,
        }
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn calls(&self) -> &[ArmingCall] {
        &self.calls
    }

    /// Polarity of the most recent edge arming.
    pub fn last_edge(&self) -> Option<(u64, EdgePolarity)> {
        self.calls.iter().rev().find_map(|call| match call {
            ArmingCall::Edge { mask, polarity } => Some((*mask, *polarity)),
            ArmingCall::Touch(_) => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: ArmingCall) -> Result<(), MockArmingError> {
        self.calls.push(call);
        if self.failing {
            return Err(MockArmingError);
        }
        Ok(())
    }
}

impl WakeArming for MockArming {
    type Error = MockArmingError;

    fn enable_touch_wake(&mut self, pad: TouchPad) -> Result<(), Self::Error> {
        self.record(ArmingCall::Touch(pad))
    }

    fn enable_edge_wake(&mut self, mask: u64, polarity: EdgePolarity) -> Result<(), Self::Error> {
        self.record(ArmingCall::Edge { mask, polarity })
    }
}
