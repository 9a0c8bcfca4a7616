//! Wake-source arming
//!
//! The reed switch shares one GPIO with a level-triggered wake source. To tell
//! "opened" from "closed" we wait for the opposite level of whatever we last
//! saw, which is why the retained state has to survive deep sleep.
//!
//! [`plan`] is pure; [`apply`] is the single place that turns a plan into the
//! ext1 bitmask and touch-pad calls the platform understands.

use crate::error::ConfigError;
use crate::platform::WakeArming;
use crate::state::LetterboxState;

/// GPIOs that ext1 can watch on the ESP32 (the RTC-capable ones).
const RTC_GPIOS: [u8; 18] = [
    0, 2, 4, 12, 13, 14, 15, 25, 26, 27, 32, 33, 34, 35, 36, 37, 38, 39,
];

/// ESP32 has touch pads T0..T9.
const TOUCH_PAD_COUNT: u8 = 10;

/// Level the edge wake source waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolarity {
    /// Wake when any selected line goes high (flap opens).
    RisingOnHigh,
    /// Wake when all selected lines are low (flap reset/closed).
    FallingOnLow,
}

/// Wake sources to enable before the next sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmingPlan {
    pub enable_touch: bool,
    pub edge_polarity: EdgePolarity,
}

/// Capacitive touch pad used as the diagnostic probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPad {
    pub channel: u8,
    /// Raw reading below which the pad counts as touched
    pub threshold: u16,
}

impl TouchPad {
    /// # Errors
    ///
    /// Returns [`ConfigError::TouchChannel`] for a channel the chip lacks.
    pub const fn new(channel: u8, threshold: u16) -> Result<Self, ConfigError> {
        if channel >= TOUCH_PAD_COUNT {
            return Err(ConfigError::TouchChannel(channel));
        }
        Ok(Self { channel, threshold })
    }
}

/// GPIO carrying the reed switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLine {
    gpio: u8,
}

impl EdgeLine {
    /// # Errors
    ///
    /// Returns [`ConfigError::NotRtcGpio`] if ext1 cannot watch `gpio`.
    pub const fn new(gpio: u8) -> Result<Self, ConfigError> {
        let mut i = 0;
        while i < RTC_GPIOS.len() {
            if RTC_GPIOS[i] == gpio {
                return Ok(Self { gpio });
            }
            i += 1;
        }
        Err(ConfigError::NotRtcGpio(gpio))
    }

    pub const fn gpio(&self) -> u8 {
        self.gpio
    }

    /// Bitmask in the form the ext1 wake API takes.
    pub const fn mask(&self) -> u64 {
        1u64 << self.gpio
    }
}

/// Physical wake sources of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSources {
    pub touch: TouchPad,
    pub edge: EdgeLine,
}

/// Compute the wake configuration for the state we are about to sleep in.
pub fn plan(next_state: LetterboxState) -> ArmingPlan {
    let edge_polarity = match next_state {
        LetterboxState::Open => EdgePolarity::RisingOnHigh,
        LetterboxState::Closed => EdgePolarity::FallingOnLow,
    };
    ArmingPlan {
        enable_touch: true,
        edge_polarity,
    }
}

/// Write `plan` to the platform. Takes effect at the next sleep entry.
///
/// # Errors
///
/// Returns the backend error of the first call that fails; nothing is retried.
pub fn apply<W: WakeArming>(
    plan: &ArmingPlan,
    sources: &WakeSources,
    arming: &mut W,
) -> Result<(), W::Error> {
    if plan.enable_touch {
        arming.enable_touch_wake(sources.touch)?;
    }
    arming.enable_edge_wake(sources.edge.mask(), plan.edge_polarity)?;
    log::debug!(
        "arming: touch={} T{} edge=GPIO{} {:?}",
        plan.enable_touch,
        sources.touch.channel,
        sources.edge.gpio(),
        plan.edge_polarity
    );
    Ok(())
}
