//! Synchronous wrappers around [`Statsd`] and [`Batch`].
//!
//! Each [`BlockingStatsd`] owns a current-thread tokio runtime and drives the async
//! client with `block_on`. Do not call it from inside an async runtime; use
//! [`Statsd`] there.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use super::batch::Batch;
use super::client::Statsd;
use super::transport::Transport;
use super::{GaugeValue, Metric, SampleRate};
use crate::MetricResult;

/// Blocking `StatsD` client.
///
/// ```
/// use rylv_statsd::{BlockingStatsd, NullTransport};
///
/// let statsd = BlockingStatsd::new(NullTransport, "app.").unwrap();
/// statsd.counter("requests", 1);
/// let rows = statsd.time("db.query", || 42);
/// assert_eq!(rows, 42);
/// ```
pub struct BlockingStatsd<T> {
    runtime: Arc<Runtime>,
    inner: Statsd<T>,
}

impl<T> Clone for BlockingStatsd<T> {
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for BlockingStatsd<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingStatsd")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

fn build_runtime() -> MetricResult<Arc<Runtime>> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(Arc::new(runtime))
}

#[cfg(feature = "udp")]
impl BlockingStatsd<super::net::UdpTransport> {
    /// Connects a UDP client described by `options`.
    ///
    /// # Errors
    /// Returns an error if the runtime cannot be built, the host cannot be resolved or
    /// the socket cannot be bound.
    pub fn connect(options: super::client::StatsdOptions) -> MetricResult<Self> {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(Statsd::connect(options))?;
        Ok(Self { runtime, inner })
    }

    /// Releases the socket.
    pub fn close(&self) {
        self.inner.close();
    }
}

impl<T: Transport> BlockingStatsd<T> {
    /// Creates a blocking client over `transport`.
    ///
    /// # Errors
    /// Returns [`crate::MetricsError::StdIo`] if the runtime cannot be built.
    pub fn new(transport: T, prefix: impl Into<Arc<str>>) -> MetricResult<Self> {
        Self::from_statsd(Statsd::new(transport, prefix))
    }

    /// Wraps an already configured async client.
    ///
    /// # Errors
    /// Returns [`crate::MetricsError::StdIo`] if the runtime cannot be built.
    pub fn from_statsd(statsd: Statsd<T>) -> MetricResult<Self> {
        Ok(Self {
            runtime: build_runtime()?,
            inner: statsd,
        })
    }

    /// The async client underneath.
    #[must_use]
    pub const fn statsd(&self) -> &Statsd<T> {
        &self.inner
    }

    /// Sends one metric.
    pub fn send(&self, name: &str, metric: Metric<'_>) {
        self.runtime.block_on(self.inner.send(name, metric));
    }

    /// Adds `value` to a counter.
    pub fn counter(&self, name: &str, value: i64) {
        self.send(name, Metric::counter(value));
    }

    /// Adds `value` to a counter for a sampled fraction of calls.
    pub fn counter_sampled(&self, name: &str, value: i64, sample_rate: SampleRate) {
        self.send(name, Metric::counter_sampled(value, sample_rate));
    }

    /// Records a timing in milliseconds.
    pub fn timing(&self, name: &str, millis: i64) {
        self.send(name, Metric::timing(millis));
    }

    /// Records a timing for a sampled fraction of calls.
    pub fn timing_sampled(&self, name: &str, millis: i64, sample_rate: SampleRate) {
        self.send(name, Metric::timing_sampled(millis, sample_rate));
    }

    /// Sets or adjusts a gauge.
    pub fn gauge(&self, name: &str, value: impl Into<GaugeValue>) {
        self.send(name, Metric::gauge(value));
    }

    /// Records a histogram sample.
    pub fn histogram(&self, name: &str, value: i64) {
        self.send(name, Metric::histogram(value));
    }

    /// Marks a meter.
    pub fn meter(&self, name: &str, value: i64) {
        self.send(name, Metric::meter(value));
    }

    /// Adds a member to a set.
    pub fn set(&self, name: &str, value: &str) {
        self.send(name, Metric::set(value));
    }

    /// Runs `op` and records how long it took.
    ///
    /// The timing is sent even when `op` panics; the panic then continues unwinding.
    pub fn time<R>(&self, name: &str, op: impl FnOnce() -> R) -> R {
        self.time_inner(name, None, op)
    }

    /// Like [`BlockingStatsd::time`] for a sampled fraction of calls. `op` always runs.
    pub fn time_sampled<R>(&self, name: &str, sample_rate: SampleRate, op: impl FnOnce() -> R) -> R {
        self.time_inner(name, Some(sample_rate), op)
    }

    fn time_inner<R>(&self, name: &str, sample_rate: Option<SampleRate>, op: impl FnOnce() -> R) -> R {
        self.runtime
            .block_on(self.inner.time_inner(name, sample_rate, || async move { op() }))
    }

    /// Creates an empty batch bound to this client.
    #[must_use]
    pub fn batch(&self) -> BlockingBatch<T> {
        BlockingBatch {
            runtime: Arc::clone(&self.runtime),
            inner: self.inner.batch(),
        }
    }
}

/// Blocking counterpart of [`Batch`].
pub struct BlockingBatch<T> {
    runtime: Arc<Runtime>,
    inner: Batch<T>,
}

impl<T> std::fmt::Debug for BlockingBatch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingBatch")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> BlockingBatch<T> {
    /// The async batch underneath. Adding to it is already synchronous.
    #[must_use]
    pub const fn batch(&self) -> &Batch<T> {
        &self.inner
    }

    /// Number of commands waiting for the next flush.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing is waiting for the next flush.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Copies the text of the commands waiting for the next flush.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.inner.commands()
    }

    /// Queues one metric.
    pub fn add(&self, name: &str, metric: Metric<'_>) {
        self.inner.add(name, metric);
    }

    /// Queues a counter increment.
    pub fn counter(&self, name: &str, value: i64) {
        self.inner.counter(name, value);
    }

    /// Queues a counter increment for a sampled fraction of calls.
    pub fn counter_sampled(&self, name: &str, value: i64, sample_rate: SampleRate) {
        self.inner.counter_sampled(name, value, sample_rate);
    }

    /// Queues a timing in milliseconds.
    pub fn timing(&self, name: &str, millis: i64) {
        self.inner.timing(name, millis);
    }

    /// Queues a timing for a sampled fraction of calls.
    pub fn timing_sampled(&self, name: &str, millis: i64, sample_rate: SampleRate) {
        self.inner.timing_sampled(name, millis, sample_rate);
    }

    /// Queues a gauge value or adjustment.
    pub fn gauge(&self, name: &str, value: impl Into<GaugeValue>) {
        self.inner.gauge(name, value);
    }

    /// Queues a histogram sample.
    pub fn histogram(&self, name: &str, value: i64) {
        self.inner.histogram(name, value);
    }

    /// Queues a meter mark.
    pub fn meter(&self, name: &str, value: i64) {
        self.inner.meter(name, value);
    }

    /// Queues a set member.
    pub fn set(&self, name: &str, value: &str) {
        self.inner.set(name, value);
    }

    /// Runs `op` and queues how long it took.
    pub fn time<R>(&self, name: &str, op: impl FnOnce() -> R) -> R {
        self.inner.time(name, op)
    }

    /// Runs `op` and queues how long it took for a sampled fraction of calls.
    pub fn time_sampled<R>(&self, name: &str, sample_rate: SampleRate, op: impl FnOnce() -> R) -> R {
        self.inner.time_sampled(name, sample_rate, op)
    }

    /// Sends everything queued so far as one packet and returns how many commands it
    /// held.
    pub fn flush(&self) -> usize {
        self.runtime.block_on(self.inner.flush())
    }
}
