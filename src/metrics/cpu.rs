use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use sysinfo::System;

use crate::error::{Error, Result};

/// Measures CPU utilization over a window of wall-clock time.
///
/// Implementations block the calling thread for `window`.
pub trait UsageSampler: Send + Sync {
    fn measure(&self, window: Duration) -> Result<f64>;
}

pub struct SysinfoSampler {
    sys: Mutex<System>,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        Self {
            sys: Mutex::new(sys),
        }
    }

    /// Brand string of the first CPU, e.g. "Intel(R) Core(TM) i7-8569U CPU @ 2.80GHz".
    pub fn cpu_name(&self) -> Option<String> {
        let sys = self.sys.lock().ok()?;
        sys.cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|name| !name.is_empty())
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageSampler for SysinfoSampler {
    fn measure(&self, window: Duration) -> Result<f64> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|_| Error::measurement_unavailable("cpu sampler state poisoned"))?;

        // Usage is computed from the delta between two refreshes.
        sys.refresh_cpu_usage();
        thread::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_cpu_usage();

        if sys.cpus().is_empty() {
            return Err(Error::measurement_unavailable("no CPUs reported"));
        }
        let usage = sys.global_cpu_usage() as f64;
        if !usage.is_finite() {
            return Err(Error::measurement_unavailable(format!(
                "cpu usage reading was {usage}"
            )));
        }
        Ok(usage.clamp(0.0, 100.0))
    }
}
