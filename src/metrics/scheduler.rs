use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::cpu::UsageSampler;
use super::emission::EnergyContext;

/// Result handed from a sampling worker to the render loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    Sample { usage_percent: f64, grams: f64 },
    Unavailable(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A worker was spawned for this tick.
    Started,
    /// A previous worker is still measuring; this tick is dropped.
    Skipped,
    /// The scheduler was shut down.
    Stopped,
    /// No worker thread could be spawned; an `Unavailable` delivery is left
    /// in the mailbox.
    Failed,
}

struct Shared {
    in_flight: AtomicBool,
    mailbox: Mutex<Option<Delivery>>,
}

/// Clears the in-flight flag when the worker exits, even by panic.
struct InFlightGuard(Arc<Shared>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

/// Periodic trigger that runs at most one measurement at a time on a worker
/// thread and leaves its result in a single-slot mailbox.
pub struct SampleScheduler<S> {
    sampler: Arc<S>,
    context: EnergyContext,
    period: Duration,
    window: Duration,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    last_tick: Option<Instant>,
    stopped: bool,
    skipped: u64,
}

impl<S: UsageSampler + 'static> SampleScheduler<S> {
    /// `margin` is subtracted from the period to get the measurement window,
    /// so a measurement finishes before the next tick is due.
    pub fn new(sampler: Arc<S>, context: EnergyContext, margin: Duration) -> Self {
        let period = context.period();
        let window = match period.checked_sub(margin) {
            Some(w) if !w.is_zero() => w,
            _ => period,
        };
        Self {
            sampler,
            context,
            period,
            window,
            shared: Arc::new(Shared {
                in_flight: AtomicBool::new(false),
                mailbox: Mutex::new(None),
            }),
            worker: None,
            last_tick: None,
            stopped: false,
            skipped: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Fires a tick if one is due. Ticks keep a fixed cadence; after a stall
    /// longer than a period the schedule restarts from `now` instead of
    /// firing a burst of catch-up ticks.
    pub fn poll(&mut self, now: Instant) -> Option<TickOutcome> {
        let due = match self.last_tick {
            Some(last) => last + self.period,
            None => now,
        };
        if now < due {
            return None;
        }
        let late = now.saturating_duration_since(due);
        self.last_tick = Some(if late >= self.period { now } else { due });
        Some(self.tick())
    }

    /// Time left until the next tick is due.
    pub fn until_next(&self, now: Instant) -> Duration {
        match self.last_tick {
            Some(last) => (last + self.period).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.stopped {
            return TickOutcome::Stopped;
        }
        if self
            .shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.skipped += 1;
            debug!(skipped = self.skipped, "sampling still in flight, dropping tick");
            return TickOutcome::Skipped;
        }

        // The flag was clear, so any previous worker has finished.
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        let guard = InFlightGuard(Arc::clone(&self.shared));
        let sampler = Arc::clone(&self.sampler);
        let context = self.context;
        let window = self.window;

        let spawned = thread::Builder::new()
            .name("energymon-sampler".to_string())
            .spawn(move || {
                let delivery = match sampler
                    .measure(window)
                    .and_then(|usage| context.emission(usage).map(|grams| (usage, grams)))
                {
                    Ok((usage_percent, grams)) => Delivery::Sample {
                        usage_percent,
                        grams,
                    },
                    Err(e) => Delivery::Unavailable(e.to_string()),
                };
                if let Ok(mut slot) = guard.0.mailbox.lock() {
                    *slot = Some(delivery);
                }
                drop(guard);
            });

        self.adopt_worker(spawned)
    }

    fn adopt_worker(&mut self, spawned: io::Result<JoinHandle<()>>) -> TickOutcome {
        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                TickOutcome::Started
            }
            Err(e) => {
                // The closure (and its guard) was dropped, clearing the flag.
                warn!(error = %e, "could not spawn sampling worker");
                self.deliver(Delivery::Unavailable(format!("worker spawn failed: {e}")));
                TickOutcome::Failed
            }
        }
    }

    /// Takes the most recent delivery, if any.
    pub fn take(&self) -> Option<Delivery> {
        self.shared.mailbox.lock().ok().and_then(|mut slot| slot.take())
    }

    pub fn is_sampling(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Ticks dropped because a measurement was still running.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Stops ticking, waits for the in-flight worker and returns whatever it
    /// delivered last.
    pub fn shutdown(&mut self) -> Option<Delivery> {
        self.stopped = true;
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("sampling worker panicked");
            }
        }
        self.take()
    }

    fn deliver(&self, delivery: Delivery) {
        if let Ok(mut slot) = self.shared.mailbox.lock() {
            *slot = Some(delivery);
        }
    }
}

impl<S> Drop for SampleScheduler<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
