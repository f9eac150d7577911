use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::{ChartMarker, Colors, FailurePolicy, Settings};
use crate::event::{self, AppEvent};
use crate::metrics::aggregate::total_consumption;
use crate::metrics::cpu::UsageSampler;
use crate::metrics::scheduler::{Delivery, SampleScheduler};
use crate::metrics::series::{RollingSeries, TimeAxisSpec};
use crate::metrics::TimeUnit;
use crate::util::format_grams;

const MAX_POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Static facts about the run shown in the header.
#[derive(Clone, Debug, Default)]
pub struct SessionInfo {
    pub zone: String,
    pub carbon_intensity: f64,
    pub intensity_unit: String,
    pub fossil_percentage: Option<f64>,
    pub cpu_name: String,
    pub cpu_tdp_watts: f64,
}

/// What is left once the loop stops.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedSession {
    pub samples: Vec<f64>,
    pub session_total: f64,
    pub appended: u64,
    pub skipped_ticks: u64,
    pub failed_samples: u64,
}

impl FinishedSession {
    /// Samples still in the window. Older ones have scrolled out and are
    /// neither in `session_total` nor in the saved file.
    pub fn covered(&self) -> usize {
        self.appended.min(self.samples.len() as u64) as usize
    }

    pub fn summary(&self, saved: Option<&Path>) -> String {
        let Some(path) = saved else {
            return "No samples recorded, nothing saved.".to_string();
        };
        let covered = self.covered();
        let span = if self.appended > covered as u64 {
            format!("the last {covered} of {} samples", self.appended)
        } else {
            format!("{covered} samples")
        };
        format!(
            "Session: {} CO2 over {span}, saved to {}",
            format_grams(self.session_total),
            path.display()
        )
    }
}

/// Merges the loop result with the save that follows it. When both fail the
/// save error is returned with the loop error in its context.
pub fn settle_shutdown(
    run: color_eyre::Result<()>,
    saved: crate::Result<Option<PathBuf>>,
) -> color_eyre::Result<Option<PathBuf>> {
    match (run, saved) {
        (Ok(()), saved) => Ok(saved?),
        (Err(run_err), Ok(_)) => Err(run_err),
        (Err(run_err), Err(save_err)) => {
            error!(error = %run_err, "event loop failed");
            Err(color_eyre::Report::new(save_err)
                .wrap_err(format!("event loop failed ({run_err}) and the session was not saved")))
        }
    }
}

pub struct App<S> {
    pub running: bool,
    pub show_help: bool,
    pub hostname: String,
    pub info: SessionInfo,
    pub series: RollingSeries,
    pub axis: TimeAxisSpec,
    pub y_unit: TimeUnit,
    pub colors: Colors,
    pub marker: ChartMarker,
    pub historical_total: f64,
    pub last_usage: Option<f64>,
    pub failed_samples: u64,
    pub started: Instant,
    failure_policy: FailurePolicy,
    scheduler: SampleScheduler<S>,
}

impl<S: UsageSampler + 'static> App<S> {
    pub fn new(
        scheduler: SampleScheduler<S>,
        axis: TimeAxisSpec,
        settings: &Settings,
        info: SessionInfo,
        historical_total: f64,
    ) -> Self {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            running: true,
            show_help: false,
            hostname,
            info,
            series: RollingSeries::new(settings.history_points),
            axis,
            y_unit: settings.y_unit,
            colors: settings.colors,
            marker: settings.marker,
            historical_total,
            last_usage: None,
            failed_samples: 0,
            started: Instant::now(),
            failure_policy: settings.failure_policy,
            scheduler,
        }
    }

    pub fn run(
        &mut self,
        terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    ) -> color_eyre::Result<()> {
        info!(
            period_ms = self.scheduler.period().as_millis() as u64,
            window_ms = self.scheduler.window().as_millis() as u64,
            "sampling started"
        );

        while self.running {
            terminal.draw(|frame| crate::ui::render(frame, self))?;

            let timeout = self.scheduler.until_next(Instant::now()).min(MAX_POLL_TIMEOUT);
            match event::poll_event(timeout)? {
                AppEvent::Key(key) => self.handle_key(key),
                AppEvent::Resize | AppEvent::Tick => {}
            }

            self.scheduler.poll(Instant::now());
            if let Some(delivery) = self.scheduler.take() {
                self.apply(delivery);
            }
        }

        Ok(())
    }

    /// Folds one worker result into the series.
    pub fn apply(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Sample {
                usage_percent,
                grams,
            } => {
                self.last_usage = Some(usage_percent);
                self.series.append(grams);
            }
            Delivery::Unavailable(reason) => {
                self.failed_samples += 1;
                warn!(
                    reason = %reason,
                    policy = ?self.failure_policy,
                    "cpu usage unavailable for this tick"
                );
                match self.failure_policy {
                    FailurePolicy::Skip => {}
                    FailurePolicy::Hold => {
                        if let Some(last) = self.series.last() {
                            self.series.append(last);
                        }
                    }
                    FailurePolicy::Zero => self.series.append(0.0),
                }
            }
        }
    }

    /// Total of the current window in the configured units.
    pub fn session_total(&self) -> f64 {
        total_consumption(&self.series.snapshot(), self.axis.x_unit(), self.y_unit)
    }

    pub fn skipped_ticks(&self) -> u64 {
        self.scheduler.skipped()
    }

    pub fn period(&self) -> Duration {
        self.scheduler.period()
    }

    pub fn is_sampling(&self) -> bool {
        self.scheduler.is_sampling()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops ticking, waits for the in-flight measurement and keeps its result.
    pub fn finish(mut self) -> FinishedSession {
        if let Some(delivery) = self.scheduler.shutdown() {
            self.apply(delivery);
        }
        FinishedSession {
            samples: self.series.snapshot(),
            session_total: self.session_total(),
            appended: self.series.appended(),
            skipped_ticks: self.scheduler.skipped(),
            failed_samples: self.failed_samples,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        // Help overlay
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }
}
