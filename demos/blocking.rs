//! Uses the blocking client from plain synchronous code.
//!
//! Run with: `cargo run --example blocking`

use rylv_statsd::{BlockingStatsd, StatsdOptions};
use std::time::Duration;

fn main() -> rylv_statsd::MetricResult<()> {
    let statsd = BlockingStatsd::connect(StatsdOptions {
        stats_prefix: "cli.".to_string(),
        ..StatsdOptions::default()
    })?;

    statsd.counter("runs", 1);
    let total = statsd.time("compute", || {
        std::thread::sleep(Duration::from_millis(10));
        (1..=100).sum::<i64>()
    });
    statsd.gauge("last.total", total as f64);

    let batch = statsd.batch();
    batch.meter("items", 3);
    batch.set("hosts", "build-01");
    batch.flush();

    statsd.close();
    Ok(())
}
