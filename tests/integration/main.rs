mod batch_stress;
mod blocking;
mod custom_transport;
mod udp;

use std::net::{SocketAddr, UdpSocket};
use std::thread::JoinHandle;
use std::time::Duration;

// ============================================================================
// Shared UDP receivers
// ============================================================================

/// Binds a loopback socket on an ephemeral port.
pub fn bind_receiver() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("couldn't bind to address");
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

/// Collects datagrams on a thread until nothing arrives for a while.
pub fn spawn_udp_receiver(socket: UdpSocket) -> JoinHandle<Vec<String>> {
    std::thread::spawn(move || {
        socket
            .set_read_timeout(Some(Duration::from_millis(500)))
            .expect("set_read_timeout failed");
        let mut buf = [0; 10000];
        let mut received = Vec::<String>::new();

        while let Ok((number_of_bytes, _)) = socket.recv_from(&mut buf) {
            received.push(String::from_utf8(buf[..number_of_bytes].to_vec()).unwrap());
        }
        received
    })
}

/// Collects exactly `expected_count` datagrams on a thread.
pub fn spawn_udp_receiver_exact(socket: UdpSocket, expected_count: usize) -> JoinHandle<Vec<Vec<u8>>> {
    std::thread::spawn(move || {
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set_read_timeout failed");
        let mut buf = [0; 10000];
        (0..expected_count)
            .map(|_| {
                let (number_of_bytes, _) = socket.recv_from(&mut buf).expect("Expected udp message");
                buf[..number_of_bytes].to_vec()
            })
            .collect()
    })
}
