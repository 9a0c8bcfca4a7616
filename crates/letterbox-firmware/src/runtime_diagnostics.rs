use esp_idf_svc::sys;

use letterbox_core::{BootKind, CycleReport, WakeCause};

/// Log heap usage statistics and current task stack headroom.
pub fn log_heap(label: &str) {
    let free_heap = unsafe { sys::esp_get_free_heap_size() };
    let min_free = unsafe { sys::esp_get_minimum_free_heap_size() };
    let stack_hwm_words = unsafe { sys::uxTaskGetStackHighWaterMark(core::ptr::null_mut()) };
    let stack_hwm_bytes = (stack_hwm_words as usize) * core::mem::size_of::<sys::StackType_t>();
    log::info!(
        "[MEM] {}: free={} min_free={} stack_hwm={}B",
        label,
        free_heap,
        min_free,
        stack_hwm_bytes
    );
}

pub fn log_wake(boot: BootKind, cause: WakeCause) {
    match boot {
        BootKind::ColdBoot => log::info!("Cold boot"),
        BootKind::DeepSleepWake => log::info!("Wakeup caused by {}", cause),
    }
}

/// One line per cycle, so a serial capture reads as a history of the flap.
pub fn log_cycle(report: &CycleReport) {
    let battery = report
        .battery_volts
        .map(|volts| format!("{:.2}V", volts))
        .unwrap_or_else(|| String::from("-"));
    log::info!(
        "Cycle: {:?} {:?} -> {:?}, message={}, battery={}, next wake on {:?}",
        report.trigger,
        report.previous,
        report.next,
        report.message.as_deref().unwrap_or("none"),
        battery,
        report.plan.edge_polarity
    );
}
