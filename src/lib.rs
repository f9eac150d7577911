//! CO2 footprint of CPU usage from live grid carbon intensity.
//!
//! A [`metrics::scheduler::SampleScheduler`] measures CPU utilization on a
//! worker thread once per interval, [`metrics::emission`] turns it into grams
//! of CO2, the samples land in a [`metrics::series::RollingSeries`] drawn by
//! [`ui`], and [`session::SessionLog`] keeps finished sessions on disk.

pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod install;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod ui;
pub mod util;

pub use error::{Error, Result};
