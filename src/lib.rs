//! # rylv-statsd
//!
//! A `StatsD` client for Rust that encodes metrics into pooled buffers and ships them
//! over a packet-size aware UDP transport.
//!
//! ## Features
//!
//! - **Byte-exact wire format**: `<prefix><name>:<value>|<unit>[|@<rate>]`
//! - **Pooled encoding**: commands are written into reusable buffers that go back to
//!   the pool as soon as they are sent or dropped
//! - **Batching**: lock-free accumulation from many threads, one datagram per flush
//! - **Packet splitting**: oversized datagrams are split on line boundaries
//! - **Async core, blocking adapter**: `Statsd` is async (tokio), `BlockingStatsd`
//!   wraps it for synchronous callers
//!
//! ## Quick Start
//!
//! ```no_run
//! use rylv_statsd::{GaugeValue, SampleRate, Statsd, StatsdOptions};
//!
//! # async fn run() -> rylv_statsd::MetricResult<()> {
//! let options = StatsdOptions {
//!     stats_prefix: "myapp.".to_string(),
//!     ..StatsdOptions::default()
//! };
//! let statsd = Statsd::connect(options).await?;
//!
//! statsd.counter("page.views", 1).await;
//! statsd.timing_sampled("db.query", 12, SampleRate::new(0.25)?).await;
//! statsd.gauge("queue.depth", GaugeValue::Delta(-3.0)).await;
//! statsd.set("users.unique", "user-42").await;
//!
//! let batch = statsd.batch();
//! batch.counter("jobs.done", 10);
//! batch.histogram("payload.size", 512);
//! batch.flush().await;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

// https://github.com/statsd/statsd/blob/master/docs/metric_types.md
mod error;
mod statsd;

pub use error::MetricsError;
pub use statsd::batch::Batch;
#[cfg(feature = "blocking")]
pub use statsd::blocking::{BlockingBatch, BlockingStatsd};
pub use statsd::client::{Statsd, StatsdOptions, DEFAULT_MAX_UDP_PACKET_SIZE, DEFAULT_PORT};
pub use statsd::command::{Command, CommandEncoder};
pub use statsd::format;
#[cfg(feature = "udp")]
pub use statsd::net::UdpTransport;
pub use statsd::net::TextEncoding;
pub use statsd::pool::{BufferPool, PooledBuffer, DEFAULT_POOL_CAPACITY};
pub use statsd::sampling::{RandomSampler, SampleDecider};
pub use statsd::timer::{InstantStopwatch, InstantStopwatchFactory, Stopwatch, StopwatchFactory};
pub use statsd::transport::{Fragments, NullTransport, Transport};
pub use statsd::{GaugeValue, Metric, MetricKind, SampleRate};

/// Result type for metric operations.
///
/// Wraps errors that can occur while configuring a client or transmitting metrics.
pub type MetricResult<T> = Result<T, MetricsError>;
