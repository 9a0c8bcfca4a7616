//! Error types for the wake cycle
//!
//! - [`ConfigError`] - rejected hardware constants (divider, wake pins)
//! - [`CycleError`] - a wake cycle that could not arm the next wake
//!
//! The state machine itself has no error path; every `(state, trigger)` pair
//! is defined.

/// Invalid board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `r1` is zero, so the divider factor `r1 / (r1 + r2)` would be zero.
    DividerRatio {
        /// Resistor between the ADC pin and ground
        r1_ohms: u32,
        /// Resistor between the battery and the ADC pin
        r2_ohms: u32,
    },
    /// The GPIO cannot be watched by the ext1 wake source.
    NotRtcGpio(u8),
    /// The chip has no touch pad with this number.
    TouchChannel(u8),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::DividerRatio { r1_ohms, r2_ohms } => {
                write!(f, "Invalid divider: r1={r1_ohms} r2={r2_ohms} (r1 must be non-zero)")
            }
            ConfigError::NotRtcGpio(gpio) => {
                write!(f, "GPIO{gpio} is not an RTC GPIO and cannot wake from deep sleep")
            }
            ConfigError::TouchChannel(channel) => write!(f, "No touch pad T{channel}"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Failure of a wake cycle.
///
/// Generic over the arming backend's error so callers can log the underlying
/// platform code.
#[derive(Debug)]
pub enum CycleError<E> {
    /// Writing the wake-source configuration failed. The next state has
    /// already been persisted when this is returned.
    Arming(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for CycleError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CycleError::Arming(err) => write!(f, "Arming wake sources failed: {err:?}"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for CycleError<E> {}
