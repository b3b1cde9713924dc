use rylv_statsd::{BufferPool, MetricResult, SampleRate, Statsd, Transport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingTransport {
    packets: Mutex<Vec<String>>,
    sends: AtomicUsize,
}

impl Transport for CollectingTransport {
    async fn send(&self, packet: &[u8]) -> MetricResult<()> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.packets
            .lock()
            .unwrap()
            .push(String::from_utf8(packet.to_vec()).unwrap());
        Ok(())
    }
}

fn create_batch_client() -> (Statsd<Arc<CollectingTransport>>, Arc<CollectingTransport>, Arc<BufferPool>) {
    let transport = Arc::new(CollectingTransport::default());
    let pool = BufferPool::new(128);
    let statsd = Statsd::new(Arc::clone(&transport), "stress.").with_buffer_pool(Arc::clone(&pool));
    (statsd, transport, pool)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_adds_then_single_flush() {
    let (statsd, transport, pool) = create_batch_client();
    let batch = Arc::new(statsd.batch());
    let threads = 16;
    let per_thread = 1_000;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let batch = Arc::clone(&batch);
            std::thread::spawn(move || {
                for i in 0..per_thread {
                    batch.counter(&format!("thread.{t}"), i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(batch.len(), threads * per_thread as usize);
    assert_eq!(batch.flush().await, threads * per_thread as usize);
    assert_eq!(transport.sends.load(Ordering::SeqCst), 1);

    // empty flush makes no transport call
    assert_eq!(batch.flush().await, 0);
    assert_eq!(transport.sends.load(Ordering::SeqCst), 1);

    let packets = transport.packets.lock().unwrap();
    let mut per_name: HashMap<&str, usize> = HashMap::new();
    for line in packets[0].split('\n') {
        let (name, rest) = line.split_once(':').unwrap();
        assert!(rest.ends_with("|c"), "bad line {line}");
        *per_name.entry(name).or_default() += 1;
    }
    assert_eq!(per_name.len(), threads);
    assert!(per_name.values().all(|&n| n == per_thread as usize));
    assert_eq!(pool.outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_flushes_racing_with_adders() {
    let (statsd, transport, pool) = create_batch_client();
    let batch = Arc::new(statsd.batch());
    let threads = 8;
    let per_thread = 2_000;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let batch = Arc::clone(&batch);
            std::thread::spawn(move || {
                for i in 0..per_thread {
                    batch.histogram("h", i);
                }
            })
        })
        .collect();

    let flushers: Vec<_> = (0..2)
        .map(|_| {
            let batch = Arc::clone(&batch);
            tokio::spawn(async move {
                let mut flushed = 0;
                for _ in 0..50 {
                    flushed += batch.flush().await;
                    tokio::task::yield_now().await;
                }
                flushed
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    let mut flushed = 0;
    for flusher in flushers {
        flushed += flusher.await.unwrap();
    }
    flushed += batch.flush().await;

    let total = threads * per_thread as usize;
    assert_eq!(flushed, total);
    let lines: usize = transport
        .packets
        .lock()
        .unwrap()
        .iter()
        .map(|p| p.split('\n').count())
        .sum();
    assert_eq!(lines, total);
    assert_eq!(pool.outstanding(), 0);
}

#[tokio::test]
async fn test_sampled_batch_drops_roughly_half() {
    let (statsd, _, _) = create_batch_client();
    let batch = statsd.batch();
    let rate = SampleRate::new(0.5).unwrap();

    for _ in 0..10_000 {
        batch.counter_sampled("c", 1, rate);
    }

    let queued = batch.len();
    assert!((4_000..=6_000).contains(&queued), "queued {queued}");
}
