//! Battery monitor
//!
//! The battery is sensed through a resistor divider so the ADC never sees more
//! than its input range. Recovering the battery voltage is a single division by
//! the divider factor `r1 / (r1 + r2)`.

use crate::error::ConfigError;
use crate::platform::AnalogSource;

/// Low-battery threshold in volts: 3 cells at 1.2 V nominal. Inclusive.
pub const LOW_BATTERY_THRESHOLD_VOLTS: f32 = 3.6;

/// Resistor divider between the battery and the ADC pin.
///
/// `r1` sits between the ADC pin and ground, `r2` between the battery and the
/// ADC pin, so the pin sees `r1 / (r1 + r2)` of the battery voltage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DividerRatio {
    r1_ohms: u32,
    r2_ohms: u32,
}

impl DividerRatio {
    /// Two equal resistors: the pin sees half the battery voltage.
    pub const HALF: Self = Self {
        r1_ohms: 1,
        r2_ohms: 1,
    };

    /// No divider fitted: the pin sees the battery voltage directly.
    pub const UNITY: Self = Self {
        r1_ohms: 1,
        r2_ohms: 0,
    };

    /// Build a divider from its resistor values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DividerRatio`] if `r1_ohms` is zero.
    pub const fn from_resistors(r1_ohms: u32, r2_ohms: u32) -> Result<Self, ConfigError> {
        if r1_ohms == 0 {
            return Err(ConfigError::DividerRatio { r1_ohms, r2_ohms });
        }
        Ok(Self { r1_ohms, r2_ohms })
    }

    /// Fraction of the battery voltage present at the ADC pin.
    pub fn factor(&self) -> f32 {
        let r1 = self.r1_ohms as f32;
        r1 / (r1 + self.r2_ohms as f32)
    }
}

impl Default for DividerRatio {
    fn default() -> Self {
        Self::HALF
    }
}

/// Convert a pin sample in millivolts into the battery voltage in volts.
pub fn voltage_from_millivolts(millivolts: u32, ratio: DividerRatio) -> f32 {
    millivolts as f32 / ratio.factor() / 1000.0
}

/// Whether `volts` is at or below [`LOW_BATTERY_THRESHOLD_VOLTS`].
pub fn is_low(volts: f32) -> bool {
    volts <= LOW_BATTERY_THRESHOLD_VOLTS
}

/// Reads the battery voltage from an analog source behind a divider.
pub struct BatteryMonitor<A> {
    source: A,
    ratio: DividerRatio,
}

impl<A: AnalogSource> BatteryMonitor<A> {
    pub fn new(source: A, ratio: DividerRatio) -> Self {
        Self { source, ratio }
    }

    /// Take one fresh sample and convert it. Never cached.
    pub fn read_voltage(&mut self) -> f32 {
        let millivolts = self.source.read_millivolts();
        let volts = voltage_from_millivolts(millivolts, self.ratio);
        log::debug!("battery: {}mV at pin -> {:.2}V", millivolts, volts);
        volts
    }

    pub fn ratio(&self) -> DividerRatio {
        self.ratio
    }

    pub fn source_mut(&mut self) -> &mut A {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAnalog;

    #[test]
    fn half_divider_doubles_the_pin_voltage() {
        assert_eq!(DividerRatio::HALF.factor(), 0.5);
        assert_eq!(voltage_from_millivolts(1950, DividerRatio::HALF), 3.9);
    }

    #[test]
    fn unity_divider_passes_through() {
        assert_eq!(DividerRatio::UNITY.factor(), 1.0);
        assert_eq!(voltage_from_millivolts(4000, DividerRatio::UNITY), 4.0);
    }

    #[test]
    fn arbitrary_divider_uses_r1_over_total() {
        let ratio = DividerRatio::from_resistors(100_000, 300_000).unwrap();
        assert_eq!(ratio.factor(), 0.25);
        assert_eq!(voltage_from_millivolts(1000, ratio), 4.0);
    }

    #[test]
    fn zero_r1_is_rejected() {
        assert_eq!(
            DividerRatio::from_resistors(0, 10),
            Err(ConfigError::DividerRatio {
                r1_ohms: 0,
                r2_ohms: 10
            })
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        let at_threshold = voltage_from_millivolts(1800, DividerRatio::HALF);
        assert_eq!(at_threshold, LOW_BATTERY_THRESHOLD_VOLTS);
        assert!(is_low(at_threshold));
        assert!(is_low(3.0));
        assert!(!is_low(3.61));
        assert!(!is_low(4.0));
    }

    #[test]
    fn monitor_samples_fresh_every_read() {
        let mut monitor = BatteryMonitor::new(MockAnalog::new(2000), DividerRatio::HALF);
        assert_eq!(monitor.read_voltage(), 4.0);

        monitor.source_mut().set_millivolts(1500);
        assert_eq!(monitor.read_voltage(), 3.0);
        assert_eq!(monitor.source_mut().reads(), 2);
    }

    #[test]
    fn zero_sample_is_passed_through() {
        let mut monitor = BatteryMonitor::new(MockAnalog::new(0), DividerRatio::HALF);
        assert_eq!(monitor.read_voltage(), 0.0);
    }
}
