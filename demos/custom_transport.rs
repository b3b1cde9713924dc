//! Implements a transport that prints packets instead of sending them.
//!
//! Run with: `cargo run --example custom_transport`

use rylv_statsd::{MetricResult, Statsd, Transport};

struct StdoutTransport;

impl Transport for StdoutTransport {
    async fn send(&self, packet: &[u8]) -> MetricResult<()> {
        println!("{}", String::from_utf8_lossy(packet));
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let statsd = Statsd::new(StdoutTransport, "demo.");

    statsd.counter("hello", 1).await;
    statsd.gauge("ratio", 0.5).await;

    let batch = statsd.batch();
    batch.timing("step.one", 12);
    batch.timing("step.two", 30);
    batch.flush().await;
}
