//! Accumulates metrics from several threads and sends them in one flush.
//!
//! Run with: `cargo run --example batch`

use rylv_statsd::{Statsd, StatsdOptions};
use std::sync::Arc;

#[tokio::main]
async fn main() -> rylv_statsd::MetricResult<()> {
    let statsd = Statsd::connect(StatsdOptions {
        stats_prefix: "worker.".to_string(),
        ..StatsdOptions::default()
    })
    .await?;
    let batch = Arc::new(statsd.batch());

    let handles: Vec<_> = (0..4)
        .map(|id| {
            let batch = Arc::clone(&batch);
            std::thread::spawn(move || {
                for job in 0..25 {
                    batch.counter(&format!("thread.{id}.jobs"), 1);
                    batch.histogram("job.size", job * 10);
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }

    // Lines are joined with '\n' and split into datagrams of at most 512 bytes
    let flushed = batch.flush().await;
    println!("flushed {flushed} commands");
    Ok(())
}
