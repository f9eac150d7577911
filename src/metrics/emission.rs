use std::time::Duration;

use crate::error::{Error, Result};

const WATTS_PER_KILOWATT: f64 = 1000.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Grams of CO2 emitted by a CPU over one interval.
///
/// `cpu_usage_percent` is the average utilization over the interval (0..=100),
/// `carbon_intensity` is in gCO2/kWh. The result is rounded to `precision`
/// decimal places.
pub fn compute_emission(
    cpu_usage_percent: f64,
    interval_seconds: f64,
    cpu_tdp_watts: f64,
    carbon_intensity: f64,
    precision: u32,
) -> Result<f64> {
    if !(0.0..=100.0).contains(&cpu_usage_percent) {
        return Err(Error::invalid_argument(format!(
            "cpu usage must be within 0..=100, got {cpu_usage_percent}"
        )));
    }
    if !(interval_seconds > 0.0 && interval_seconds.is_finite()) {
        return Err(Error::invalid_argument(format!(
            "interval must be positive, got {interval_seconds}"
        )));
    }
    if !(cpu_tdp_watts > 0.0 && cpu_tdp_watts.is_finite()) {
        return Err(Error::invalid_argument(format!(
            "cpu TDP must be positive, got {cpu_tdp_watts}"
        )));
    }
    if !(carbon_intensity >= 0.0 && carbon_intensity.is_finite()) {
        return Err(Error::invalid_argument(format!(
            "carbon intensity must be non-negative, got {carbon_intensity}"
        )));
    }

    let energy_kwh = cpu_usage_percent / 100.0
        * (cpu_tdp_watts / WATTS_PER_KILOWATT)
        * (interval_seconds / SECONDS_PER_HOUR);
    Ok(round_to(energy_kwh * carbon_intensity, precision))
}

pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10_f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Static inputs of a monitoring session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyContext {
    cpu_tdp_watts: f64,
    carbon_intensity: f64,
    sampling_interval: f64,
    period: Duration,
    precision: u32,
}

impl EnergyContext {
    pub fn new(
        cpu_tdp_watts: f64,
        carbon_intensity: f64,
        sampling_interval: f64,
        precision: u32,
    ) -> Result<Self> {
        // Validate once here so per-tick computation cannot fail on these inputs.
        compute_emission(0.0, sampling_interval, cpu_tdp_watts, carbon_intensity, precision)?;
        let period = Duration::try_from_secs_f64(sampling_interval).map_err(|_| {
            Error::invalid_argument(format!(
                "interval of {sampling_interval} s does not fit a timer period"
            ))
        })?;
        if period.is_zero() {
            return Err(Error::invalid_argument(format!(
                "interval of {sampling_interval} s is shorter than a nanosecond"
            )));
        }
        Ok(Self {
            cpu_tdp_watts,
            carbon_intensity,
            sampling_interval,
            period,
            precision,
        })
    }

    pub fn cpu_tdp_watts(&self) -> f64 {
        self.cpu_tdp_watts
    }

    pub fn carbon_intensity(&self) -> f64 {
        self.carbon_intensity
    }

    pub fn sampling_interval(&self) -> f64 {
        self.sampling_interval
    }

    /// The sampling interval as a timer period.
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Emission for one sampling interval at the given utilization.
    pub fn emission(&self, cpu_usage_percent: f64) -> Result<f64> {
        compute_emission(
            cpu_usage_percent,
            self.sampling_interval,
            self.cpu_tdp_watts,
            self.carbon_intensity,
            self.precision,
        )
    }
}
