//! Letterbox state kept in RTC memory across deep sleep.
//!
//! ESP-IDF reloads `.rtc.data` from flash on every boot that is not a
//! deep-sleep wake, so a cold boot sees the initial value again.

use core::sync::atomic::{AtomicU8, Ordering};

use letterbox_core::{LetterboxState, StateStore};

#[link_section = ".rtc.data"]
static LETTERBOX_STATE: AtomicU8 = AtomicU8::new(LetterboxState::Open.to_byte());

/// Handle to the retained state byte.
pub struct RtcRetainedState;

impl StateStore for RtcRetainedState {
    fn load(&mut self) -> Option<LetterboxState> {
        let byte = LETTERBOX_STATE.load(Ordering::Relaxed);
        let state = LetterboxState::from_byte(byte);
        if state.is_none() {
            log::warn!("RTC letterbox byte is 0x{:02x}", byte);
        }
        state
    }

    fn persist(&mut self, state: LetterboxState) {
        LETTERBOX_STATE.store(state.to_byte(), Ordering::Relaxed);
    }
}
