use std::collections::VecDeque;

use super::TimeUnit;
use crate::error::{Error, Result};

/// Fixed-capacity window of emission samples, oldest first.
///
/// Starts zero-filled to its full capacity so the chart always spans the
/// whole x-axis. The padding is indistinguishable from idle samples; use
/// [`RollingSeries::appended`] to know how many real samples arrived.
#[derive(Clone, Debug)]
pub struct RollingSeries {
    data: VecDeque<f64>,
    capacity: usize,
    appended: u64,
}

impl RollingSeries {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: std::iter::repeat(0.0).take(capacity).collect(),
            capacity,
            appended: 0,
        }
    }

    pub fn append(&mut self, value: f64) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(value);
        self.appended += 1;
    }

    pub fn snapshot(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of real samples appended since creation.
    pub fn appended(&self) -> u64 {
        self.appended
    }

    pub fn last(&self) -> Option<f64> {
        if self.appended == 0 {
            None
        } else {
            self.data.back().copied()
        }
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(0.0_f64, f64::max)
    }

    /// `(index, value)` pairs for plotting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect()
    }
}

/// How the x-axis of a series is labelled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeAxisSpec {
    sampling_interval: f64,
    x_unit: TimeUnit,
    ticks: usize,
}

impl TimeAxisSpec {
    pub fn new(sampling_interval: f64, x_unit: TimeUnit, ticks: usize) -> Result<Self> {
        if !(sampling_interval > 0.0) {
            return Err(Error::invalid_argument(format!(
                "sampling interval must be positive, got {sampling_interval}"
            )));
        }
        if ticks < 2 {
            return Err(Error::invalid_argument(format!(
                "an axis needs at least 2 ticks, got {ticks}"
            )));
        }
        Ok(Self {
            sampling_interval,
            x_unit,
            ticks,
        })
    }

    pub fn sampling_interval(&self) -> f64 {
        self.sampling_interval
    }

    pub fn x_unit(&self) -> TimeUnit {
        self.x_unit
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Evenly spaced labels from the oldest point to the newest, expressed as
    /// time before now in the x unit. Never more labels than points.
    pub fn labels(&self, len: usize) -> Vec<String> {
        if len == 0 {
            return Vec::new();
        }
        if len == 1 {
            return vec!["now".to_string()];
        }
        let ticks = self.ticks.min(len);
        let last = len - 1;
        (0..ticks)
            .map(|k| {
                let idx = k * last / (ticks - 1);
                let ago = (last - idx) as f64 * self.sampling_interval / self.x_unit.seconds();
                if ago == 0.0 {
                    "now".to_string()
                } else {
                    format!("-{}{}", trim_number(ago), self.x_unit)
                }
            })
            .collect()
    }

    /// Total time covered by `len` points, in the x unit.
    pub fn span(&self, len: usize) -> f64 {
        len.saturating_sub(1) as f64 * self.sampling_interval / self.x_unit.seconds()
    }
}

fn trim_number(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}
