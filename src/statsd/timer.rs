use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use futures::FutureExt;

/// Measures one unit of work.
pub trait Stopwatch: Send {
    /// Starts (or restarts) measuring.
    fn start(&mut self);
    /// Stops measuring. Elapsed time is frozen until the next `start`.
    fn stop(&mut self);
    /// Elapsed whole milliseconds between `start` and `stop`.
    fn elapsed_millis(&self) -> i64;
}

/// Hands out a fresh [`Stopwatch`] per timed operation.
pub trait StopwatchFactory: Send + Sync {
    /// Returns a stopped stopwatch.
    fn get(&self) -> Box<dyn Stopwatch>;
}

/// Stopwatch backed by [`Instant`].
#[derive(Debug, Default)]
pub struct InstantStopwatch {
    started: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch for InstantStopwatch {
    fn start(&mut self) {
        self.started = Some(Instant::now());
        self.elapsed = Duration::ZERO;
    }

    fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }

    fn elapsed_millis(&self) -> i64 {
        let elapsed = self
            .started
            .map_or(self.elapsed, |started| started.elapsed());
        i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Factory for [`InstantStopwatch`].
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantStopwatchFactory;

impl StopwatchFactory for InstantStopwatchFactory {
    fn get(&self) -> Box<dyn Stopwatch> {
        Box::new(InstantStopwatch::default())
    }
}

/// Runs `op` under a fresh stopwatch. A panic is captured so the caller can record
/// the elapsed time before resuming it with [`unwind`].
pub(crate) fn measure<R>(factory: &dyn StopwatchFactory, op: impl FnOnce() -> R) -> (thread::Result<R>, i64) {
    let mut stopwatch = factory.get();
    stopwatch.start();
    let output = panic::catch_unwind(AssertUnwindSafe(op));
    stopwatch.stop();
    (output, stopwatch.elapsed_millis())
}

/// Async counterpart of [`measure`]. Creating the future counts as part of the work.
pub(crate) async fn measure_async<F, Fut>(
    factory: &dyn StopwatchFactory,
    op: F,
) -> (thread::Result<Fut::Output>, i64)
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    let mut stopwatch = factory.get();
    stopwatch.start();
    let output = AssertUnwindSafe(async move { op().await })
        .catch_unwind()
        .await;
    stopwatch.stop();
    (output, stopwatch.elapsed_millis())
}

/// Returns the output of a measured operation or resumes its panic.
pub(crate) fn unwind<R>(output: thread::Result<R>) -> R {
    match output {
        Ok(output) => output,
        Err(payload) => panic::resume_unwind(payload),
    }
}
