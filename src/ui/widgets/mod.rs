pub mod emission_chart;
pub mod usage_gauge;
