use rylv_statsd::{
    BufferPool, MetricResult, MetricsError, Metric, NullTransport, SampleRate, Statsd, Transport,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A transport that stores packets in memory
#[derive(Clone, Default)]
struct MemoryTransport {
    packets: Arc<Mutex<Vec<String>>>,
}

impl MemoryTransport {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.packets.lock().unwrap())
    }
}

impl Transport for MemoryTransport {
    async fn send(&self, packet: &[u8]) -> MetricResult<()> {
        self.packets
            .lock()
            .unwrap()
            .push(String::from_utf8(packet.to_vec()).unwrap());
        Ok(())
    }
}

/// A transport that always fails
#[derive(Default)]
struct BrokenTransport {
    attempts: AtomicUsize,
}

impl Transport for BrokenTransport {
    async fn send(&self, _packet: &[u8]) -> MetricResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(MetricsError::from("network down"))
    }
}

#[tokio::test]
async fn test_memory_transport_sees_wire_format() {
    let transport = MemoryTransport::default();
    let statsd = Statsd::new(transport.clone(), "svc.");

    statsd.send("raw", Metric::counter(-4)).await;
    statsd
        .counter_sampled("sampled", 1, SampleRate::new(0.25).unwrap())
        .await;

    let packets = transport.take();
    assert_eq!(packets[0], "svc.raw:-4|c");
    // sampled metrics may be skipped; when sent they carry the rate
    assert!(packets.len() == 1 || packets[1] == "svc.sampled:1|c|@0.25");
}

#[tokio::test]
async fn test_time_reports_error_after_emitting() {
    let transport = MemoryTransport::default();
    let statsd = Statsd::new(transport.clone(), "");

    let result: Result<(), std::io::Error> = statsd
        .time("io", || async { Err(std::io::Error::other("disk full")) })
        .await;

    assert!(result.is_err());
    let packets = transport.take();
    assert_eq!(packets.len(), 1);
    assert!(packets[0].starts_with("io:") && packets[0].ends_with("|ms"));
}

#[tokio::test]
async fn test_failing_transport_is_silent_and_leak_free() {
    let transport = Arc::new(BrokenTransport::default());
    let pool = BufferPool::new(8);
    let statsd = Statsd::new(Arc::clone(&transport), "").with_buffer_pool(Arc::clone(&pool));

    for i in 0..20 {
        statsd.counter("c", i).await;
    }
    let batch = statsd.batch();
    batch.counter("a", 1);
    batch.counter("b", 1);
    batch.flush().await;

    assert_eq!(transport.attempts.load(Ordering::SeqCst), 21);
    assert_eq!(pool.outstanding(), 0);
    assert_eq!(pool.acquired_total(), 23);
    assert!(pool.high_water_mark() >= 3);
}

#[tokio::test]
async fn test_null_transport_accepts_everything() {
    let statsd = Statsd::new(NullTransport, "off.");
    statsd.counter("c", 1).await;
    assert_eq!(statsd.batch().flush().await, 0);
}
