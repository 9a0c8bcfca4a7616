mod battery_adc;
mod config;
mod retained;
mod runtime_diagnostics;
mod telegram;
mod time_sync;
mod wake_hw;
mod wifi_manager;

use core::fmt;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys::EspError;

use letterbox_core::arming;
use letterbox_core::{
    BatteryMonitor, BootKind, ConfigError, LetterboxState, StateStore, WakeCause, WakeCycle,
};

use battery_adc::AdcBattery;
use retained::RtcRetainedState;
use telegram::{BotSettings, TelegramNotifier};
use wake_hw::EspWakeArming;
use wifi_manager::{StationSettings, WifiManager};

/// Setup failures that keep the cycle from running at all.
#[derive(Debug)]
enum FirmwareError {
    Esp(EspError),
    Config(ConfigError),
}

impl fmt::Display for FirmwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirmwareError::Esp(err) => write!(f, "platform: {}", err),
            FirmwareError::Config(err) => write!(f, "config: {}", err),
        }
    }
}

impl From<EspError> for FirmwareError {
    fn from(err: EspError) -> Self {
        FirmwareError::Esp(err)
    }
}

impl From<ConfigError> for FirmwareError {
    fn from(err: ConfigError) -> Self {
        FirmwareError::Config(err)
    }
}

fn bot_settings() -> BotSettings {
    BotSettings {
        token: config::BOT_TOKEN,
        chat_id: config::CHAT_ID,
        station: StationSettings {
            ssid: config::WIFI_SSID,
            password: config::WIFI_PASSWORD,
            attempts: config::WIFI_CONNECT_ATTEMPTS,
            retry_delay_ms: config::WIFI_RETRY_DELAY_MS,
        },
        time_sync_budget_ms: config::TIME_SYNC_BUDGET_MS,
    }
}

fn run_cycle(boot: BootKind, cause: WakeCause) -> Result<(), FirmwareError> {
    let peripherals = Peripherals::take()?;

    // Status LED stays lit for as long as we are awake.
    let mut status_led = PinDriver::output(peripherals.pins.gpio26)?;
    status_led.set_high()?;

    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();

    let battery = BatteryMonitor::new(
        AdcBattery::new(peripherals.adc1, peripherals.pins.gpio36)?,
        config::battery_divider()?,
    );
    let notifier = TelegramNotifier::new(
        WifiManager::new(peripherals.modem, sys_loop, nvs),
        bot_settings(),
    );
    let mut node = WakeCycle::new(
        RtcRetainedState,
        battery,
        notifier,
        EspWakeArming,
        config::wake_sources()?,
    );

    let result = node.run(boot, cause);
    node.notifier_mut().shutdown();

    match result {
        Ok(report) => runtime_diagnostics::log_cycle(&report),
        // Nothing to roll back; the node just may not wake on the next event.
        Err(err) => log::error!("{}", err),
    }
    Ok(())
}

/// Arm for the retained state when setup failed before the cycle could.
fn arm_for_retained_state() {
    let state = RtcRetainedState.load().unwrap_or(LetterboxState::Open);
    let sources = match config::wake_sources() {
        Ok(sources) => sources,
        Err(err) => {
            log::error!("Cannot arm wake sources: {}", err);
            return;
        }
    };
    if let Err(err) = arming::apply(&arming::plan(state), &sources, &mut EspWakeArming) {
        log::error!("Arming wake sources failed: {}", err);
    }
}

fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Starting...");

    let boot = wake_hw::boot_kind();
    let cause = wake_hw::wake_cause();
    runtime_diagnostics::log_wake(boot, cause);

    if let Err(err) = run_cycle(boot, cause) {
        log::error!("Wake cycle aborted: {}", err);
        arm_for_retained_state();
    }

    runtime_diagnostics::log_heap("before_sleep");
    wake_hw::enter_deep_sleep();
}
