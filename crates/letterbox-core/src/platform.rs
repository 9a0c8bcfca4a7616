//! Hardware seams.
//!
//! One trait per collaborator the cycle needs. The firmware implements them on
//! top of ESP-IDF; [`crate::mock`] implements them in memory.

use crate::arming::{EdgePolarity, TouchPad};
use crate::state::LetterboxState;

/// Load/store capability for the sleep-retained state byte.
pub trait StateStore {
    /// Read the retained state. `None` when the stored byte does not decode.
    fn load(&mut self) -> Option<LetterboxState>;

    /// Write the state that the next wake will see.
    fn persist(&mut self, state: LetterboxState);
}

/// Source of one analog sample in millivolts.
///
/// There is no error path: a garbage reading is a hardware limitation the
/// conversion passes straight through.
pub trait AnalogSource {
    fn read_millivolts(&mut self) -> u32;
}

/// Fire-and-forget text transport.
pub trait Notifier {
    type Error: core::fmt::Debug;

    fn send(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Wake-source registers, written right before deep sleep.
pub trait WakeArming {
    type Error: core::fmt::Debug;

    /// Enable touch wake on `pad`.
    fn enable_touch_wake(&mut self, pad: TouchPad) -> Result<(), Self::Error>;

    /// Enable ext1 wake on the GPIOs in `mask` with the given polarity.
    fn enable_edge_wake(&mut self, mask: u64, polarity: EdgePolarity) -> Result<(), Self::Error>;
}
