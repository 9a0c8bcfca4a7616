//! Board wiring and build-time credentials.

use letterbox_core::arming::{EdgeLine, TouchPad, WakeSources};
use letterbox_core::{ConfigError, DividerRatio};

/// Reed switch on the flap.
pub const REED_GPIO: u8 = 13;

/// Touch pad T3 (GPIO15), the manual battery probe.
pub const TOUCH_CHANNEL: u8 = 3;
pub const TOUCH_THRESHOLD: u16 = 40;

// Battery sense: ADC1 channel 0 on GPIO36, behind r1 = r2.
pub const BATTERY_R1_OHMS: u32 = 1;
pub const BATTERY_R2_OHMS: u32 = 1;

pub const WIFI_CONNECT_ATTEMPTS: u32 = 20;
pub const WIFI_RETRY_DELAY_MS: u32 = 500;

/// Give up on SNTP after this long and let TLS try with the clock we have.
pub const TIME_SYNC_BUDGET_MS: u32 = 10_000;

pub const WIFI_SSID: &str = env!(
    "LETTERBOX_WIFI_SSID",
    "Set LETTERBOX_WIFI_SSID in .env or the environment before building."
);
pub const WIFI_PASSWORD: &str = env!(
    "LETTERBOX_WIFI_PASSWORD",
    "Set LETTERBOX_WIFI_PASSWORD in .env or the environment before building."
);
pub const BOT_TOKEN: &str = env!(
    "LETTERBOX_BOT_TOKEN",
    "Set LETTERBOX_BOT_TOKEN in .env or the environment before building."
);
pub const CHAT_ID: &str = env!(
    "LETTERBOX_CHAT_ID",
    "Set LETTERBOX_CHAT_ID in .env or the environment before building."
);

pub fn battery_divider() -> Result<DividerRatio, ConfigError> {
    DividerRatio::from_resistors(BATTERY_R1_OHMS, BATTERY_R2_OHMS)
}

pub fn wake_sources() -> Result<WakeSources, ConfigError> {
    Ok(WakeSources {
        touch: TouchPad::new(TOUCH_CHANNEL, TOUCH_THRESHOLD)?,
        edge: EdgeLine::new(REED_GPIO)?,
    })
}
