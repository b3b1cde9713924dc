use rylv_statsd::{BlockingStatsd, GaugeValue, StatsdOptions};

use super::{bind_receiver, spawn_udp_receiver, spawn_udp_receiver_exact};

fn connect(port: u16) -> BlockingStatsd<rylv_statsd::UdpTransport> {
    BlockingStatsd::connect(StatsdOptions {
        port,
        stats_prefix: "sync.".to_string(),
        ..StatsdOptions::default()
    })
    .unwrap()
}

#[test]
fn test_blocking_client_sends() {
    let (socket, addr) = bind_receiver();
    let receiver = spawn_udp_receiver_exact(socket, 3);
    let statsd = connect(addr.port());

    statsd.counter("c", 2);
    statsd.gauge("g", GaugeValue::Delta(1.2345));
    let out = statsd.time("t", || "ok");

    assert_eq!(out, "ok");
    let received = receiver.join().unwrap();
    assert_eq!(received[0], b"sync.c:2|c");
    assert_eq!(received[1], b"sync.g:+1.235|g");
    let timing = String::from_utf8(received[2].clone()).unwrap();
    assert!(timing.starts_with("sync.t:") && timing.ends_with("|ms"), "{timing}");
}

#[test]
fn test_blocking_batch_from_threads() {
    let (socket, addr) = bind_receiver();
    let receiver = spawn_udp_receiver(socket);
    let statsd = connect(addr.port());
    let batch = std::sync::Arc::new(statsd.batch());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let batch = std::sync::Arc::clone(&batch);
            std::thread::spawn(move || {
                for i in 0..10 {
                    batch.meter(&format!("m{t}"), i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(batch.flush(), 40);
    statsd.close();

    let received = receiver.join().unwrap();
    let lines = received.iter().flat_map(|p| p.split('\n')).count();
    assert_eq!(lines, 40);
}
