//! Wake classifier
//!
//! Maps the platform's wake cause onto the small set of triggers the state
//! machine cares about. A power-on boot is its own trigger and never mixes
//! with the "woke for some other reason" case.

/// Hardware-reported reason for leaving deep sleep.
///
/// Numbering follows ESP-IDF's `esp_sleep_source_t`. Values this enum does not
/// list are kept in [`WakeCause::Unknown`] rather than folded into a known arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCause {
    /// Not a wake from sleep (or no source recorded)
    Undefined,
    /// Catch-all used only when disabling sources
    All,
    /// External signal on a single RTC_IO pin
    Ext0,
    /// External signal on a set of RTC GPIOs (RTC_CNTL)
    Ext1,
    Timer,
    Touchpad,
    /// ULP program
    Ulp,
    Gpio,
    Uart,
    Wifi,
    Coprocessor,
    CoprocessorTrap,
    Bluetooth,
    Unknown(u32),
}

impl WakeCause {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Undefined,
            1 => Self::All,
            2 => Self::Ext0,
            3 => Self::Ext1,
            4 => Self::Timer,
            5 => Self::Touchpad,
            6 => Self::Ulp,
            7 => Self::Gpio,
            8 => Self::Uart,
            9 => Self::Wifi,
            10 => Self::Coprocessor,
            11 => Self::CoprocessorTrap,
            12 => Self::Bluetooth,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Undefined => 0,
            Self::All => 1,
            Self::Ext0 => 2,
            Self::Ext1 => 3,
            Self::Timer => 4,
            Self::Touchpad => 5,
            Self::Ulp => 6,
            Self::Gpio => 7,
            Self::Uart => 8,
            Self::Wifi => 9,
            Self::Coprocessor => 10,
            Self::CoprocessorTrap => 11,
            Self::Bluetooth => 12,
            Self::Unknown(raw) => raw,
        }
    }

    /// One-line description for the boot log.
    pub fn description(self) -> &'static str {
        match self {
            Self::Ext0 => "external signal using RTC_IO",
            Self::Ext1 => "external signal using RTC_CNTL",
            Self::Timer => "timer",
            Self::Touchpad => "touchpad",
            Self::Ulp => "ULP program",
            Self::Gpio => "GPIO",
            Self::Uart => "UART",
            Self::Wifi => "Wi-Fi",
            Self::Coprocessor => "co-processor",
            Self::CoprocessorTrap => "co-processor trap",
            Self::Bluetooth => "Bluetooth",
            Self::Undefined | Self::All | Self::Unknown(_) => "not caused by deep sleep",
        }
    }
}

impl core::fmt::Display for WakeCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.description(), self.raw())
    }
}

/// How the processor came to be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootKind {
    /// Power-on or any reset other than a deep-sleep wake. Retained memory is
    /// not trustworthy.
    ColdBoot,
    DeepSleepWake,
}

/// Abstract reason for this wake cycle. Derived every cycle, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeTrigger {
    ColdBoot,
    /// Manual touch on the diagnostic pad
    TouchProbe,
    /// The reed switch line hit the armed level
    EdgeSignal,
    /// Any other wake source; nothing happens downstream
    Other(WakeCause),
}

/// Classify a boot into a [`WakeTrigger`].
pub fn classify(boot: BootKind, cause: WakeCause) -> WakeTrigger {
    if boot == BootKind::ColdBoot {
        return WakeTrigger::ColdBoot;
    }

    match cause {
        WakeCause::Touchpad => WakeTrigger::TouchProbe,
        // ext1 is the only edge source this node ever arms.
        WakeCause::Ext1 => WakeTrigger::EdgeSignal,
        WakeCause::Undefined
        | WakeCause::All
        | WakeCause::Ext0
        | WakeCause::Timer
        | WakeCause::Ulp
        | WakeCause::Gpio
        | WakeCause::Uart
        | WakeCause::Wifi
        | WakeCause::Coprocessor
        | WakeCause::CoprocessorTrap
        | WakeCause::Bluetooth
        | WakeCause::Unknown(_) => WakeTrigger::Other(cause),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_follow_esp_idf_numbering() {
        assert_eq!(WakeCause::from_raw(3), WakeCause::Ext1);
        assert_eq!(WakeCause::from_raw(5), WakeCause::Touchpad);
        assert_eq!(WakeCause::from_raw(0), WakeCause::Undefined);
        assert_eq!(WakeCause::from_raw(42), WakeCause::Unknown(42));
        for raw in 0..16 {
            assert_eq!(WakeCause::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn touchpad_wake_is_a_touch_probe() {
        assert_eq!(
            classify(BootKind::DeepSleepWake, WakeCause::Touchpad),
            WakeTrigger::TouchProbe
        );
    }

    #[test]
    fn ext1_wake_is_an_edge_signal() {
        assert_eq!(
            classify(BootKind::DeepSleepWake, WakeCause::Ext1),
            WakeTrigger::EdgeSignal
        );
    }

    #[test]
    fn unarmed_sources_fall_into_other() {
        for cause in [
            WakeCause::Undefined,
            WakeCause::Ext0,
            WakeCause::Timer,
            WakeCause::Ulp,
            WakeCause::Unknown(99),
        ] {
            assert_eq!(
                classify(BootKind::DeepSleepWake, cause),
                WakeTrigger::Other(cause)
            );
        }
    }

    #[test]
    fn cold_boot_wins_over_any_reported_cause() {
        assert_eq!(
            classify(BootKind::ColdBoot, WakeCause::Undefined),
            WakeTrigger::ColdBoot
        );
        assert_eq!(
            classify(BootKind::ColdBoot, WakeCause::Ext1),
            WakeTrigger::ColdBoot
        );
        assert_ne!(
            classify(BootKind::DeepSleepWake, WakeCause::Undefined),
            WakeTrigger::ColdBoot
        );
    }

    #[test]
    fn description_names_the_source() {
        assert_eq!(
            alloc::format!("{}", WakeCause::Touchpad),
            "touchpad (5)"
        );
        assert_eq!(
            WakeCause::Unknown(77).description(),
            "not caused by deep sleep"
        );
    }
}
