use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use super::batch::Batch;
use super::command::{Command, CommandEncoder};
use super::net::TextEncoding;
use super::pool::BufferPool;
use super::sampling::{RandomSampler, SampleDecider};
use super::timer::{measure_async, unwind, InstantStopwatchFactory, StopwatchFactory};
use super::transport::Transport;
use super::{GaugeValue, Metric, SampleRate};

/// Default `StatsD` port.
pub const DEFAULT_PORT: u16 = 8125;

/// Default datagram size limit in bytes.
pub const DEFAULT_MAX_UDP_PACKET_SIZE: usize = 512;

/// Configuration for a UDP `StatsD` client.
#[derive(Debug, Clone)]
pub struct StatsdOptions {
    /// Host name or IP address of the `StatsD` server.
    pub host: String,
    /// Port of the `StatsD` server.
    pub port: u16,
    /// Largest datagram to send. Larger packets are split on line boundaries.
    /// Set to 0 for no limit. Adjust if your MTU differs from the usual.
    pub max_udp_packet_size: usize,
    /// Prefix prepended verbatim to all metric names. Include a trailing dot if desired
    /// (e.g., `"myapp."` results in `"myapp.metric"`).
    pub stats_prefix: String,
    /// Encoding applied to packets before sending.
    pub encoding: TextEncoding,
}

impl Default for StatsdOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_udp_packet_size: DEFAULT_MAX_UDP_PACKET_SIZE,
            stats_prefix: String::new(),
            encoding: TextEncoding::default(),
        }
    }
}

/// Emits metrics through a [`Transport`].
///
/// Every call encodes one command and sends it right away; use [`Statsd::batch`] to
/// group commands into a single packet. Transport failures are logged and dropped,
/// so recording a metric never fails.
///
/// `Statsd` is cheap to clone and can be shared across threads and tasks.
///
/// # Example
///
/// ```
/// use rylv_statsd::{NullTransport, Statsd};
///
/// # async fn run() {
/// let statsd = Statsd::new(NullTransport, "myapp.");
/// statsd.counter("requests", 1).await;
/// let answer = statsd.time("compute", || async { 42 }).await;
/// assert_eq!(answer, 42);
/// # }
/// ```
pub struct Statsd<T> {
    encoder: CommandEncoder,
    transport: Arc<T>,
    sampler: Arc<dyn SampleDecider>,
    stopwatch_factory: Arc<dyn StopwatchFactory>,
}

impl<T> Clone for Statsd<T> {
    fn clone(&self) -> Self {
        Self {
            encoder: self.encoder.clone(),
            transport: Arc::clone(&self.transport),
            sampler: Arc::clone(&self.sampler),
            stopwatch_factory: Arc::clone(&self.stopwatch_factory),
        }
    }
}

impl<T> std::fmt::Debug for Statsd<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statsd")
            .field("prefix", &self.encoder.prefix())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "udp")]
impl Statsd<super::net::UdpTransport> {
    /// Connects a UDP client described by `options`.
    ///
    /// # Errors
    /// Returns an error if the host cannot be resolved or the socket cannot be bound.
    pub async fn connect(options: StatsdOptions) -> crate::MetricResult<Self> {
        let transport = super::net::UdpTransport::connect(&options).await?;
        Ok(Self::new(transport, options.stats_prefix))
    }

    /// Releases the socket. Metrics recorded afterwards are logged and dropped.
    pub fn close(&self) {
        self.transport.close();
    }
}

impl<T: Transport> Statsd<T> {
    /// Creates a client that prepends `prefix` to every metric name.
    ///
    /// Uses the shared [`BufferPool`], a [`RandomSampler`] and [`Instant`](std::time::Instant)
    /// stopwatches.
    #[must_use]
    pub fn new(transport: T, prefix: impl Into<Arc<str>>) -> Self {
        Self {
            encoder: CommandEncoder::new(prefix, BufferPool::shared()),
            transport: Arc::new(transport),
            sampler: Arc::new(RandomSampler),
            stopwatch_factory: Arc::new(InstantStopwatchFactory),
        }
    }

    /// Replaces the sampling decision.
    #[must_use]
    pub fn with_sampler(mut self, sampler: impl SampleDecider + 'static) -> Self {
        self.sampler = Arc::new(sampler);
        self
    }

    /// Replaces the stopwatch used by [`Statsd::time`].
    #[must_use]
    pub fn with_stopwatch_factory(mut self, factory: impl StopwatchFactory + 'static) -> Self {
        self.stopwatch_factory = Arc::new(factory);
        self
    }

    /// Allocates commands from `pool` instead of the shared pool.
    #[must_use]
    pub fn with_buffer_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.encoder = CommandEncoder::new(self.encoder.prefix(), pool);
        self
    }

    /// The prefix prepended to every metric name.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.encoder.prefix()
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The encoder used for every command of this client.
    #[must_use]
    pub const fn encoder(&self) -> &CommandEncoder {
        &self.encoder
    }

    /// Creates an empty batch that shares this client's prefix, pool and transport.
    #[must_use]
    pub fn batch(&self) -> Batch<T> {
        Batch::new(self.clone())
    }

    /// Sends one metric.
    ///
    /// Sampled metrics consult the sampler first; when it says no, nothing is encoded
    /// or sent.
    pub async fn send(&self, name: &str, metric: Metric<'_>) {
        if let Some(command) = self.encode_sampled(name, &metric) {
            self.send_command(command).await;
        }
    }

    /// Adds `value` to a counter.
    pub async fn counter(&self, name: &str, value: i64) {
        self.send(name, Metric::counter(value)).await;
    }

    /// Adds `value` to a counter for a sampled fraction of calls.
    pub async fn counter_sampled(&self, name: &str, value: i64, sample_rate: SampleRate) {
        self.send(name, Metric::counter_sampled(value, sample_rate))
            .await;
    }

    /// Records a timing in milliseconds.
    pub async fn timing(&self, name: &str, millis: i64) {
        self.send(name, Metric::timing(millis)).await;
    }

    /// Records a timing in milliseconds for a sampled fraction of calls.
    pub async fn timing_sampled(&self, name: &str, millis: i64, sample_rate: SampleRate) {
        self.send(name, Metric::timing_sampled(millis, sample_rate))
            .await;
    }

    /// Sets or adjusts a gauge. A bare `f64` sets it.
    pub async fn gauge(&self, name: &str, value: impl Into<GaugeValue>) {
        self.send(name, Metric::gauge(value)).await;
    }

    /// Records a histogram sample.
    pub async fn histogram(&self, name: &str, value: i64) {
        self.send(name, Metric::histogram(value)).await;
    }

    /// Marks a meter.
    pub async fn meter(&self, name: &str, value: i64) {
        self.send(name, Metric::meter(value)).await;
    }

    /// Adds a member to a set.
    pub async fn set(&self, name: &str, value: &str) {
        self.send(name, Metric::set(value)).await;
    }

    /// Runs `op`, then records how long it took as a timing.
    ///
    /// The timing is sent on every exit path before control returns to the caller: an
    /// `Err` from `op` is returned after the metric went out, and a panic in `op`
    /// resumes unwinding after the metric went out.
    pub async fn time<F, Fut>(&self, name: &str, op: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.time_inner(name, None, op).await
    }

    /// Like [`Statsd::time`], but the timing is only sent for a sampled fraction of
    /// calls. `op` always runs.
    pub async fn time_sampled<F, Fut>(&self, name: &str, sample_rate: SampleRate, op: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.time_inner(name, Some(sample_rate), op).await
    }

    pub(crate) async fn time_inner<F, Fut>(
        &self,
        name: &str,
        sample_rate: Option<SampleRate>,
        op: F,
    ) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let (output, millis) = measure_async(self.stopwatch_factory(), op).await;
        if self.should_send(sample_rate) {
            self.timing(name, millis).await;
        }
        unwind(output)
    }

    /// Sends an already encoded command and releases its buffer.
    pub async fn send_command(&self, command: Command) {
        self.send_packet(command.as_bytes()).await;
    }

    pub(crate) async fn send_packet(&self, packet: &[u8]) {
        if let Err(err) = self.transport.send(packet).await {
            warn!("Error sending metrics: {err}");
        }
    }

    pub(crate) fn should_send(&self, sample_rate: Option<SampleRate>) -> bool {
        sample_rate.is_none_or(|rate| self.sampler.should_send(rate))
    }

    pub(crate) fn encode_sampled(&self, name: &str, metric: &Metric<'_>) -> Option<Command> {
        self.should_send(metric.sample_rate())
            .then(|| self.encoder.encode_metric(name, metric))
    }

    pub(crate) fn stopwatch_factory(&self) -> &dyn StopwatchFactory {
        self.stopwatch_factory.as_ref()
    }

    pub(crate) fn pool(&self) -> &Arc<BufferPool> {
        self.encoder.pool()
    }
}
