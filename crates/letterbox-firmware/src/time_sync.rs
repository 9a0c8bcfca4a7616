use std::time::{SystemTime, UNIX_EPOCH};

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sntp::EspSntp;
use esp_idf_svc::sys::EspError;

/// Anything earlier means the RTC still counts from boot, not from NTP.
const MIN_VALID_EPOCH_SECS: u64 = 24 * 3600;
const POLL_MS: u32 = 100;

/// Start SNTP against pool.ntp.org and wait until the clock is plausible.
///
/// The returned handle must live as long as TLS is in use. Running out of
/// budget is logged, not fatal: certificate checks may still pass.
pub fn sync_clock(budget_ms: u32) -> Result<EspSntp<'static>, EspError> {
    let sntp = EspSntp::new_default()?;
    let mut waited_ms = 0;
    while !clock_is_set() {
        if waited_ms >= budget_ms {
            log::warn!("Time sync did not complete within {}ms", budget_ms);
            return Ok(sntp);
        }
        FreeRtos::delay_ms(POLL_MS);
        waited_ms += POLL_MS;
    }
    log::info!("Time synchronized after {}ms", waited_ms);
    Ok(sntp)
}

fn clock_is_set() -> bool {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|now| now.as_secs() >= MIN_VALID_EPOCH_SECS)
        .unwrap_or(false)
}
