use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use crossbeam::queue::SegQueue;
use parking_lot::Mutex;

use super::client::Statsd;
use super::command::Command;
use super::timer::{measure, measure_async, unwind};
use super::transport::Transport;
use super::{GaugeValue, Metric, SampleRate};

/// Accumulates commands and sends them as one newline-joined packet.
///
/// Adding is synchronous and lock-free, so a batch can be shared between threads
/// (wrap it in an `Arc`). [`Batch::flush`] detaches everything added so far in one
/// atomic swap; commands added concurrently with a flush go to the next one.
///
/// Dropping a batch without flushing discards its commands and returns their buffers
/// to the pool.
///
/// ```
/// use rylv_statsd::{NullTransport, Statsd};
///
/// # async fn run() {
/// let batch = Statsd::new(NullTransport, "app.").batch();
/// batch.counter("jobs", 3);
/// batch.gauge("load", 0.75);
/// assert_eq!(batch.flush().await, 2);
/// assert_eq!(batch.flush().await, 0);
/// # }
/// ```
pub struct Batch<T> {
    statsd: Statsd<T>,
    commands: ArcSwap<SegQueue<Command>>,
    snapshot: Mutex<()>,
}

impl<T> std::fmt::Debug for Batch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("pending", &self.commands.load().len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Batch<T> {
    pub(crate) fn new(statsd: Statsd<T>) -> Self {
        Self {
            statsd,
            commands: ArcSwap::from_pointee(SegQueue::new()),
            snapshot: Mutex::new(()),
        }
    }

    /// The client this batch sends through.
    #[must_use]
    pub const fn statsd(&self) -> &Statsd<T> {
        &self.statsd
    }

    /// Number of commands waiting for the next flush.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.load().len()
    }

    /// Whether nothing is waiting for the next flush.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.load().is_empty()
    }

    /// Copies the text of the commands waiting for the next flush, oldest first.
    ///
    /// The commands stay queued. Commands added by other threads while the copy is
    /// taken may end up ahead of the copied ones in the next packet.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        let _snapshot = self.snapshot.lock();
        // holding the guard keeps a concurrent flush waiting until everything is back
        let queue = self.commands.load();
        let taken: Vec<Command> = (0..queue.len()).map_while(|_| queue.pop()).collect();
        let texts = taken.iter().map(|command| command.as_str().to_owned()).collect();
        for command in taken {
            queue.push(command);
        }
        texts
    }

    /// Queues one metric. Sampled metrics that lose the draw are not queued.
    pub fn add(&self, name: &str, metric: Metric<'_>) {
        if let Some(command) = self.statsd.encode_sampled(name, &metric) {
            self.commands.load().push(command);
        }
    }

    /// Queues a counter increment.
    pub fn counter(&self, name: &str, value: i64) {
        self.add(name, Metric::counter(value));
    }

    /// Queues a counter increment for a sampled fraction of calls.
    pub fn counter_sampled(&self, name: &str, value: i64, sample_rate: SampleRate) {
        self.add(name, Metric::counter_sampled(value, sample_rate));
    }

    /// Queues a timing in milliseconds.
    pub fn timing(&self, name: &str, millis: i64) {
        self.add(name, Metric::timing(millis));
    }

    /// Queues a timing for a sampled fraction of calls.
    pub fn timing_sampled(&self, name: &str, millis: i64, sample_rate: SampleRate) {
        self.add(name, Metric::timing_sampled(millis, sample_rate));
    }

    /// Queues a gauge value or adjustment.
    pub fn gauge(&self, name: &str, value: impl Into<GaugeValue>) {
        self.add(name, Metric::gauge(value));
    }

    /// Queues a histogram sample.
    pub fn histogram(&self, name: &str, value: i64) {
        self.add(name, Metric::histogram(value));
    }

    /// Queues a meter mark.
    pub fn meter(&self, name: &str, value: i64) {
        self.add(name, Metric::meter(value));
    }

    /// Queues a set member.
    pub fn set(&self, name: &str, value: &str) {
        self.add(name, Metric::set(value));
    }

    /// Runs `op` and queues how long it took.
    ///
    /// The timing is queued even when `op` panics; the panic then continues unwinding.
    pub fn time<R>(&self, name: &str, op: impl FnOnce() -> R) -> R {
        self.time_inner(name, None, op)
    }

    /// Runs `op` and queues how long it took for a sampled fraction of calls.
    pub fn time_sampled<R>(&self, name: &str, sample_rate: SampleRate, op: impl FnOnce() -> R) -> R {
        self.time_inner(name, Some(sample_rate), op)
    }

    fn time_inner<R>(&self, name: &str, sample_rate: Option<SampleRate>, op: impl FnOnce() -> R) -> R {
        let (output, millis) = measure(self.statsd.stopwatch_factory(), op);
        self.queue_elapsed(name, sample_rate, millis);
        unwind(output)
    }

    /// Awaits `op` and queues how long it took, also when it panics.
    pub async fn time_async<F, Fut>(&self, name: &str, op: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.time_async_inner(name, None, op).await
    }

    /// Awaits `op` and queues how long it took for a sampled fraction of calls.
    pub async fn time_async_sampled<F, Fut>(
        &self,
        name: &str,
        sample_rate: SampleRate,
        op: F,
    ) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.time_async_inner(name, Some(sample_rate), op).await
    }

    async fn time_async_inner<F, Fut>(
        &self,
        name: &str,
        sample_rate: Option<SampleRate>,
        op: F,
    ) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let (output, millis) = measure_async(self.statsd.stopwatch_factory(), op).await;
        self.queue_elapsed(name, sample_rate, millis);
        unwind(output)
    }

    // The sampling decision for timed work covers the timing only, the work always runs.
    fn queue_elapsed(&self, name: &str, sample_rate: Option<SampleRate>, millis: i64) {
        if self.statsd.should_send(sample_rate) {
            self.add(name, Metric::timing(millis));
        }
    }

    /// Sends everything queued so far as one packet and returns how many commands it
    /// held. An empty batch sends nothing.
    pub async fn flush(&self) -> usize {
        let mut detached = self.commands.swap(Arc::new(SegQueue::new()));

        // adders that loaded the old queue before the swap may still be pushing
        let queue = loop {
            match Arc::try_unwrap(detached) {
                Ok(queue) => break queue,
                Err(shared) => {
                    detached = shared;
                    tokio::task::yield_now().await;
                }
            }
        };

        let commands: Vec<Command> = std::iter::from_fn(|| queue.pop()).collect();
        if commands.is_empty() {
            return 0;
        }

        let joined_len = commands.iter().map(Command::len).sum::<usize>() + commands.len() - 1;
        let mut packet = self.statsd.pool().acquire(joined_len);
        for (i, command) in commands.iter().enumerate() {
            if i > 0 {
                packet.push(b'\n');
            }
            packet.extend_from_slice(command.as_bytes());
        }
        debug_assert_eq!(packet.len(), joined_len);

        let count = commands.len();
        drop(commands);
        self.statsd.send_packet(packet.as_slice()).await;
        count
    }
}
