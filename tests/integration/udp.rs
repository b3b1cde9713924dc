use rylv_statsd::{
    GaugeValue, SampleRate, Statsd, StatsdOptions, TextEncoding, UdpTransport, DEFAULT_MAX_UDP_PACKET_SIZE,
};

use super::{bind_receiver, spawn_udp_receiver, spawn_udp_receiver_exact};

fn options(port: u16, prefix: &str) -> StatsdOptions {
    StatsdOptions {
        port,
        stats_prefix: prefix.to_string(),
        ..StatsdOptions::default()
    }
}

#[tokio::test]
async fn test_every_kind_reaches_the_server() {
    let (socket, addr) = bind_receiver();
    let receiver = spawn_udp_receiver_exact(socket, 8);
    let statsd = Statsd::connect(options(addr.port(), "app.")).await.unwrap();

    statsd.counter("page.views", 5).await;
    statsd.timing("db.query", 12).await;
    statsd.gauge("temperature", 21.25).await;
    statsd.gauge("queue.depth", GaugeValue::Delta(-3.0)).await;
    statsd.gauge("queue.depth", GaugeValue::Delta(0.5)).await;
    statsd.histogram("payload", 512).await;
    statsd.meter("hits", 1).await;
    statsd.set("users", "alice").await;

    let received: Vec<String> = receiver
        .join()
        .unwrap()
        .into_iter()
        .map(|p| String::from_utf8(p).unwrap())
        .collect();
    assert_eq!(
        received,
        vec![
            "app.page.views:5|c",
            "app.db.query:12|ms",
            "app.temperature:21.250000000000000|g",
            "app.queue.depth:-3|g",
            "app.queue.depth:+.5|g",
            "app.payload:512|h",
            "app.hits:1|m",
            "app.users:alice|s",
        ]
    );
}

#[tokio::test]
async fn test_sampled_rate_one_has_no_suffix() {
    let (socket, addr) = bind_receiver();
    let receiver = spawn_udp_receiver_exact(socket, 1);
    let statsd = Statsd::connect(options(addr.port(), "")).await.unwrap();

    statsd.counter_sampled("c", 1, SampleRate::ALWAYS).await;

    assert_eq!(receiver.join().unwrap(), vec![b"c:1|c".to_vec()]);
}

#[tokio::test]
async fn test_default_limit_splits_large_batch() {
    let (socket, addr) = bind_receiver();
    let receiver = spawn_udp_receiver(socket);
    let statsd = Statsd::connect(options(addr.port(), "split.")).await.unwrap();

    let batch = statsd.batch();
    for i in 0..100 {
        batch.counter(&format!("metric.{i:03}"), i);
    }
    assert_eq!(batch.flush().await, 100);

    let received = receiver.join().unwrap();
    assert!(received.len() > 1, "expected several datagrams");
    assert!(received.iter().all(|p| p.len() <= DEFAULT_MAX_UDP_PACKET_SIZE));
    let lines: Vec<&str> = received.iter().flat_map(|p| p.split('\n')).collect();
    assert_eq!(lines.len(), 100);
    assert_eq!(lines[0], "split.metric.000:0|c");
    assert_eq!(lines[99], "split.metric.099:99|c");
}

#[tokio::test]
async fn test_oversized_single_line_is_sent_whole() {
    let (socket, addr) = bind_receiver();
    let receiver = spawn_udp_receiver_exact(socket, 1);
    let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap(), addr, 16, TextEncoding::Utf8)
        .await
        .unwrap();
    let statsd = Statsd::new(transport, "");

    let member = "x".repeat(64);
    statsd.set("s", &member).await;

    assert_eq!(receiver.join().unwrap()[0].len(), "s:".len() + 64 + "|s".len());
}

#[tokio::test]
async fn test_latin1_encoding_on_the_wire() {
    let (socket, addr) = bind_receiver();
    let receiver = spawn_udp_receiver_exact(socket, 1);
    let statsd = Statsd::connect(StatsdOptions {
        encoding: TextEncoding::Latin1,
        ..options(addr.port(), "")
    })
    .await
    .unwrap();

    statsd.set("city", "Zürich").await;

    assert_eq!(receiver.join().unwrap(), vec![b"city:Z\xfcrich|s".to_vec()]);
}

#[tokio::test]
async fn test_close_drops_later_metrics() {
    let (socket, addr) = bind_receiver();
    let receiver = spawn_udp_receiver(socket);
    let statsd = Statsd::connect(options(addr.port(), "")).await.unwrap();

    statsd.counter("before", 1).await;
    statsd.close();
    statsd.close();
    statsd.counter("after", 1).await;

    assert_eq!(receiver.join().unwrap(), vec!["before:1|c"]);
}

#[tokio::test]
async fn test_unknown_host_fails_to_connect() {
    let result = Statsd::connect(StatsdOptions {
        host: "does-not-exist.invalid".to_string(),
        ..StatsdOptions::default()
    })
    .await;
    assert!(result.is_err());
}
