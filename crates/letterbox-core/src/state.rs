//! Letterbox state machine
//!
//! A single retained bit: is the flap currently open or closed. The reed
//! switch line can only wake us on a level, so the state decides which level
//! to wait for next and which edge is worth a message.
//!
//! ```text
//!            EdgeSignal / Send(LetterArrived)
//!   Closed ─────────────────────────────────▶ Open
//!     ▲                                         │
//!     └─────────────────────────────────────────┘
//!            EdgeSignal / Suppressed
//!
//!   TouchProbe   : state unchanged, Send(BatteryStatus)
//!   ColdBoot/Other: state unchanged, Suppressed
//! ```

use crate::wake::WakeTrigger;

/// Retained flap state. Cold boot starts in [`LetterboxState::Open`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LetterboxState {
    #[default]
    Open,
    Closed,
}

impl LetterboxState {
    const OPEN_BYTE: u8 = 0x00;
    const CLOSED_BYTE: u8 = 0x01;

    /// Encoding in the retained byte.
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Open => Self::OPEN_BYTE,
            Self::Closed => Self::CLOSED_BYTE,
        }
    }

    /// Decode the retained byte. Anything else is treated as corrupt.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            Self::OPEN_BYTE => Some(Self::Open),
            Self::CLOSED_BYTE => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }
}

/// Message template chosen by the state machine. The battery reading is filled
/// in by [`crate::compose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The flap just opened. Carries the low-battery clause when needed.
    LetterArrived,
    /// Reply to a touch probe.
    BatteryStatus,
}

/// Whether this cycle talks to the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDecision {
    Suppressed,
    Send(Notice),
}

impl NotificationDecision {
    pub fn is_send(&self) -> bool {
        matches!(self, Self::Send(_))
    }
}

/// Result of one step of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: LetterboxState,
    pub decision: NotificationDecision,
}

/// Advance the state machine by one trigger. Total over every input.
pub fn transition(current: LetterboxState, trigger: WakeTrigger) -> Transition {
    let (next, decision) = match (trigger, current) {
        (WakeTrigger::EdgeSignal, LetterboxState::Closed) => (
            LetterboxState::Open,
            NotificationDecision::Send(Notice::LetterArrived),
        ),
        // Owner reset the flap after collecting; re-arm silently.
        (WakeTrigger::EdgeSignal, LetterboxState::Open) => {
            (LetterboxState::Closed, NotificationDecision::Suppressed)
        }
        (WakeTrigger::TouchProbe, state) => {
            (state, NotificationDecision::Send(Notice::BatteryStatus))
        }
        (WakeTrigger::ColdBoot, state) | (WakeTrigger::Other(_), state) => {
            (state, NotificationDecision::Suppressed)
        }
    };

    log::debug!(
        "letterbox: {:?} + {:?} -> {:?} ({:?})",
        current,
        trigger,
        next,
        decision
    );

    Transition { next, decision }
}
