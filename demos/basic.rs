//! Sends one metric of every kind to a local StatsD server.
//!
//! Run with: `cargo run --example basic`

use rylv_statsd::{GaugeValue, SampleRate, Statsd, StatsdOptions};
use std::time::Duration;

#[tokio::main]
async fn main() -> rylv_statsd::MetricResult<()> {
    let options = StatsdOptions {
        stats_prefix: "myapp.".to_string(),
        ..StatsdOptions::default()
    };
    let statsd = Statsd::connect(options).await?;

    // Counter: myapp.request.count:1|c
    statsd.counter("request.count", 1).await;

    // Sampled counter: sent for roughly one call in ten, as myapp.cache.hit:1|c|@0.1
    statsd
        .counter_sampled("cache.hit", 1, SampleRate::new(0.1)?)
        .await;

    // Timing: myapp.request.latency:42|ms
    statsd.timing("request.latency", 42).await;

    // Gauges: absolute value, then relative adjustments
    statsd.gauge("connections", 128.0).await;
    statsd.gauge("queue.depth", GaugeValue::Delta(5.0)).await;
    statsd.gauge("queue.depth", GaugeValue::Delta(-2.0)).await;

    statsd.histogram("payload.size", 1024).await;
    statsd.meter("logins", 1).await;
    statsd.set("users.unique", "user-42").await;

    // Timed unit of work
    let rows = statsd
        .time("db.query", || async {
            tokio::time::sleep(Duration::from_millis(15)).await;
            3
        })
        .await;
    println!("query returned {rows} rows");

    statsd.close();
    Ok(())
}
