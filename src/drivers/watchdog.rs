//! Task Watchdog Timer (TWDT) driver.
//!
//! Every operation in this firmware blocks, so the main task is the only
//! thing that can stall.  It subscribes itself to the ESP-IDF TWDT and
//! feeds it once per sequencer step; the longest uninterruptible step
//! (warm-up + build-up + solenoid dwell) is well under the timeout.
//!
//! On host builds the driver is a no-op.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Reset the chip if the main task is not fed within this window.
pub const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Subscribe the calling task to the TWDT.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms: WATCHDOG_TIMEOUT_MS,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: plain FFI calls on the current task; the config struct
        // outlives the call.
        let subscribed = unsafe {
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                log::warn!("watchdog: reconfigure returned {} (already running?)", ret);
            }
            esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
        };
        if subscribed {
            log::info!("watchdog: main task subscribed ({} ms)", WATCHDOG_TIMEOUT_MS);
        } else {
            log::warn!("watchdog: subscription failed, running unguarded");
        }
        Self { subscribed }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        log::debug!("watchdog(sim): no-op");
        Self {}
    }

    /// Feed the watchdog.  Call at least once per timeout window.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the calling (subscribed) task.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
