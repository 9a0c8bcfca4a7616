use esp_idf_svc::sys::{self, esp, EspError};

use letterbox_core::arming::{EdgePolarity, TouchPad};
use letterbox_core::{BootKind, WakeArming, WakeCause};

pub fn wake_cause() -> WakeCause {
    let raw = unsafe { sys::esp_sleep_get_wakeup_cause() };
    WakeCause::from_raw(raw as u32)
}

/// Only a deep-sleep reset leaves RTC memory trustworthy.
pub fn boot_kind() -> BootKind {
    let reason = unsafe { sys::esp_reset_reason() };
    if reason == sys::esp_reset_reason_t_ESP_RST_DEEPSLEEP {
        BootKind::DeepSleepWake
    } else {
        log::info!("Reset reason {} is not a deep-sleep wake", reason);
        BootKind::ColdBoot
    }
}

/// Wake-source registers of the ESP32 sleep controller.
pub struct EspWakeArming;

impl WakeArming for EspWakeArming {
    type Error = EspError;

    fn enable_touch_wake(&mut self, pad: TouchPad) -> Result<(), EspError> {
        esp!(unsafe { sys::touch_pad_init() })?;
        esp!(unsafe { sys::touch_pad_set_fsm_mode(sys::touch_fsm_mode_t_TOUCH_FSM_MODE_TIMER) })?;
        esp!(unsafe { sys::touch_pad_config(pad.channel as sys::touch_pad_t, pad.threshold) })?;
        esp!(unsafe { sys::esp_sleep_enable_touchpad_wakeup() })
    }

    fn enable_edge_wake(&mut self, mask: u64, polarity: EdgePolarity) -> Result<(), EspError> {
        let mode = match polarity {
            EdgePolarity::RisingOnHigh => sys::esp_sleep_ext1_wakeup_mode_t_ESP_EXT1_WAKEUP_ANY_HIGH,
            EdgePolarity::FallingOnLow => sys::esp_sleep_ext1_wakeup_mode_t_ESP_EXT1_WAKEUP_ALL_LOW,
        };
        esp!(unsafe { sys::esp_sleep_enable_ext1_wakeup(mask, mode) })
    }
}

/// Enter deep sleep with whatever wake sources are armed. Does not return.
pub fn enter_deep_sleep() -> ! {
    log::info!("Entering deep sleep");
    unsafe { sys::esp_deep_sleep_start() }
}
