use std::fmt;
use std::sync::Arc;

use itoa::Buffer;

use super::format;
use super::pool::{BufferPool, PooledBuffer};
use super::{GaugeValue, Metric, MetricKind, SampleRate};

/// One encoded `StatsD` line: `<prefix><name>:<value>|<unit>[|@<rate>]`.
///
/// The bytes live in a pooled buffer which goes back to its pool when the command is
/// dropped. Sending or batching a command consumes it.
pub struct Command {
    buf: PooledBuffer,
}

impl Command {
    /// The encoded line.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The encoded line as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: commands are only built by concatenating `&str` parts and ASCII separators
        unsafe { std::str::from_utf8_unchecked(&self.buf) }
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the command holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Command").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds [`Command`]s for one client.
///
/// Holds the client's prefix and buffer pool; cloning is cheap.
#[derive(Clone, Debug)]
pub struct CommandEncoder {
    prefix: Arc<str>,
    pool: Arc<BufferPool>,
}

impl CommandEncoder {
    /// Creates an encoder that prepends `prefix` verbatim to every name.
    #[must_use]
    pub fn new(prefix: impl Into<Arc<str>>, pool: Arc<BufferPool>) -> Self {
        Self {
            prefix: prefix.into(),
            pool,
        }
    }

    /// The prefix prepended to every metric name.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The pool commands are allocated from.
    #[must_use]
    pub const fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Encodes a pre-formatted value.
    ///
    /// `name` must not contain `:`, `|` or newlines; it is written as is. The rate
    /// suffix is only written when `sample_rate` is not 1.
    #[must_use]
    pub fn encode(
        &self,
        name: &str,
        value: &str,
        kind: MetricKind,
        sample_rate: SampleRate,
    ) -> Command {
        let unit = kind.unit();
        let rate = if sample_rate.is_always() {
            None
        } else {
            Some(format::rate(sample_rate.value()))
        };

        // format!("{}{}:{}|{}", prefix, name, value, unit) plus "|@{rate}" when sampled
        let len = command_len(&self.prefix, name, value, unit, rate.as_deref());

        let mut buf = self.pool.acquire(len);
        buf.extend_from_slice(self.prefix.as_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.push(b':');
        buf.extend_from_slice(value.as_bytes());
        buf.push(b'|');
        buf.extend_from_slice(unit.as_bytes());
        if let Some(rate) = rate.as_deref() {
            buf.extend_from_slice(b"|@");
            buf.extend_from_slice(rate.as_bytes());
        }

        debug_assert_eq!(buf.len(), len);
        Command { buf }
    }

    /// Formats the value of `metric` and encodes it.
    #[must_use]
    pub fn encode_metric(&self, name: &str, metric: &Metric<'_>) -> Command {
        let kind = metric.kind();
        let sample_rate = metric.sample_rate().unwrap_or_default();
        let mut buffer = Buffer::new();

        match metric {
            Metric::Counter { value, .. }
            | Metric::Timing { value, .. }
            | Metric::Histogram(value)
            | Metric::Meter(value) => {
                self.encode(name, buffer.format(*value), kind, sample_rate)
            }
            Metric::Gauge(GaugeValue::Absolute(value)) => {
                self.encode(name, &format::fixed(*value), kind, sample_rate)
            }
            Metric::Gauge(GaugeValue::Delta(value)) => {
                self.encode(name, &format::delta(*value), kind, sample_rate)
            }
            Metric::Set(value) => self.encode(name, value, kind, sample_rate),
        }
    }
}

#[inline]
fn command_len(prefix: &str, name: &str, value: &str, unit: &str, rate: Option<&str>) -> usize {
    let mut len = prefix.len() + name.len() + value.len() + unit.len() + 2; // ':' + '|'
    if let Some(rate) = rate {
        len += rate.len() + 2; // '|@'
    }
    len
}
