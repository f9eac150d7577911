pub mod log;

pub use log::SessionLog;

use chrono::NaiveDateTime;

/// A finished session as stored on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    /// Session end time decoded from the file name, if it could be parsed.
    pub created: Option<NaiveDateTime>,
    pub samples: Vec<f64>,
}

impl SessionRecord {
    pub fn new(created: Option<NaiveDateTime>, samples: Vec<f64>) -> Self {
        Self { created, samples }
    }
}

/// Drops the zero padding a [`RollingSeries`](crate::metrics::series::RollingSeries)
/// starts with.
pub fn trim_leading_zeros(series: &[f64]) -> &[f64] {
    let start = series
        .iter()
        .position(|&v| v != 0.0)
        .unwrap_or(series.len());
    &series[start..]
}
