//! Wake-cycle logic for the letterbox notifier node.
//!
//! The node spends its life in deep sleep. Each wake runs one [`WakeCycle`]:
//! classify why we woke, advance the retained open/closed state, maybe emit a
//! message, then arm the wake sources for the next event. Hardware is reached
//! only through the traits in [`platform`], so the same code runs on the ESP32
//! and in host tests.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

extern crate alloc;

pub mod arming;
pub mod battery;
pub mod compose;
pub mod cycle;
pub mod error;
pub mod mock;
pub mod platform;
pub mod state;
pub mod wake;

pub use arming::{ArmingPlan, EdgeLine, EdgePolarity, TouchPad, WakeSources};
pub use battery::{BatteryMonitor, DividerRatio, LOW_BATTERY_THRESHOLD_VOLTS};
pub use compose::compose;
pub use cycle::{CycleReport, WakeCycle};
pub use error::{ConfigError, CycleError};
pub use platform::{AnalogSource, Notifier, StateStore, WakeArming};
pub use state::{LetterboxState, Notice, NotificationDecision, Transition};
pub use wake::{BootKind, WakeCause, WakeTrigger};
