use super::TimeUnit;
use crate::session::SessionRecord;

/// Sum of a series after rescaling each value from "per y unit" to
/// "per x unit".
pub fn total_consumption(series: &[f64], x_unit: TimeUnit, y_unit: TimeUnit) -> f64 {
    let scale = x_unit.seconds() / y_unit.seconds();
    series.iter().map(|v| v * scale).sum()
}

/// Total over every stored session.
pub fn historical_total(records: &[SessionRecord], x_unit: TimeUnit, y_unit: TimeUnit) -> f64 {
    records
        .iter()
        .map(|r| total_consumption(&r.samples, x_unit, y_unit))
        .sum()
}
