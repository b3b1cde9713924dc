use std::borrow::Cow;

#[cfg(feature = "udp")]
pub use udp::UdpTransport;

/// Text encoding applied to packets before they hit the wire.
///
/// Commands are built as UTF-8. `Ascii` and `Latin1` replace every character they
/// cannot represent with `?`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Pass-through.
    #[default]
    Utf8,
    /// 7-bit ASCII.
    Ascii,
    /// ISO-8859-1.
    Latin1,
}

impl TextEncoding {
    /// Encodes a UTF-8 packet. Borrows when no conversion is needed.
    #[must_use]
    pub fn encode(self, packet: &[u8]) -> Cow<'_, [u8]> {
        let limit = match self {
            Self::Utf8 => return Cow::Borrowed(packet),
            Self::Ascii => 0x7f_u8,
            Self::Latin1 => 0xff_u8,
        };
        if packet.is_ascii() {
            return Cow::Borrowed(packet);
        }
        let Ok(text) = std::str::from_utf8(packet) else {
            return Cow::Borrowed(packet);
        };

        Cow::Owned(
            text.chars()
                .map(|c| match u8::try_from(u32::from(c)) {
                    Ok(b) if b <= limit => b,
                    _ => b'?',
                })
                .collect(),
        )
    }
}

#[cfg(feature = "udp")]
mod udp {
    use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
    use std::sync::Arc;

    use arc_swap::ArcSwapOption;
    use tokio::net::{lookup_host, UdpSocket};
    use tracing::debug;

    use super::TextEncoding;
    use crate::statsd::client::StatsdOptions;
    use crate::statsd::transport::{Fragments, Transport};
    use crate::{MetricResult, MetricsError};

    /// Sends packets as UDP datagrams, splitting oversized ones on line boundaries.
    ///
    /// The socket is released exactly once, either by [`UdpTransport::close`] or on drop.
    #[derive(Debug)]
    pub struct UdpTransport {
        socket: ArcSwapOption<UdpSocket>,
        destination: SocketAddr,
        max_udp_packet_size: usize,
        encoding: TextEncoding,
    }

    impl UdpTransport {
        /// Resolves `options.host:options.port` and binds an ephemeral local socket.
        ///
        /// IPv4 addresses are preferred when the host resolves to several.
        ///
        /// # Errors
        /// Returns [`MetricsError::Resolve`] when the host has no address and
        /// [`MetricsError::StdIo`] when resolution or binding fails.
        pub async fn connect(options: &StatsdOptions) -> MetricResult<Self> {
            let destination = resolve(&options.host, options.port).await?;
            let bind_addr = match destination {
                SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
                SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
            };
            Self::bind(
                bind_addr,
                destination,
                options.max_udp_packet_size,
                options.encoding,
            )
            .await
        }

        /// Binds a socket to `bind_addr` that sends to `destination`.
        ///
        /// A `max_udp_packet_size` of 0 disables packet splitting.
        ///
        /// # Errors
        /// Returns [`MetricsError::StdIo`] if the socket cannot be bound.
        pub async fn bind(
            bind_addr: SocketAddr,
            destination: SocketAddr,
            max_udp_packet_size: usize,
            encoding: TextEncoding,
        ) -> MetricResult<Self> {
            let socket = UdpSocket::bind(bind_addr).await?;
            debug!(%destination, local = ?socket.local_addr().ok(), "UDP transport bound");
            Ok(Self {
                socket: ArcSwapOption::from_pointee(socket),
                destination,
                max_udp_packet_size,
                encoding,
            })
        }

        /// The resolved destination.
        #[must_use]
        pub const fn destination(&self) -> SocketAddr {
            self.destination
        }

        /// The packet size limit; 0 means unlimited.
        #[must_use]
        pub const fn max_udp_packet_size(&self) -> usize {
            self.max_udp_packet_size
        }

        /// Releases the socket. Later calls do nothing; later sends fail with
        /// [`MetricsError::TransportClosed`].
        pub fn close(&self) {
            if self.socket.swap(None).is_some() {
                debug!(destination = %self.destination, "UDP transport closed");
            }
        }

        /// Whether [`UdpTransport::close`] has been called.
        #[must_use]
        pub fn is_closed(&self) -> bool {
            self.socket.load().is_none()
        }
    }

    impl Transport for UdpTransport {
        async fn send(&self, packet: &[u8]) -> MetricResult<()> {
            let socket: Arc<UdpSocket> = self
                .socket
                .load_full()
                .ok_or(MetricsError::TransportClosed)?;

            let encoded = self.encoding.encode(packet);
            for fragment in Fragments::new(&encoded, self.max_udp_packet_size) {
                socket.send_to(fragment, self.destination).await?;
            }
            Ok(())
        }
    }

    /// Resolves `host:port`, preferring IPv4.
    async fn resolve(host: &str, port: u16) -> MetricResult<SocketAddr> {
        let addrs: Vec<SocketAddr> = lookup_host((host, port)).await?.collect();
        addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| MetricsError::Resolve {
                host: host.to_owned(),
                port,
            })
    }

}
