use std::future::Future;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::MetricResult;

/// Destination for encoded packets.
///
/// Implement this trait to ship metrics somewhere other than UDP, or to capture them
/// in tests. A packet is one command or several newline-joined commands.
pub trait Transport: Send + Sync + 'static {
    /// Sends one packet.
    ///
    /// # Errors
    /// Returns `MetricResult::Err` if the packet could not be handed to the network.
    /// Callers in this crate log and drop such errors.
    fn send(&self, packet: &[u8]) -> impl Future<Output = MetricResult<()>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, packet: &[u8]) -> impl Future<Output = MetricResult<()>> + Send {
        (**self).send(packet)
    }
}

/// Transport that discards everything. Used when metrics are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    async fn send(&self, _packet: &[u8]) -> MetricResult<()> {
        Ok(())
    }
}

/// Splits a packet into datagrams of at most `max_packet_size` bytes on newline
/// boundaries.
///
/// While the remainder is too large, the last `\n` at an index in
/// `1..=max_packet_size` is used as the split point and dropped. A remainder without
/// such a newline is yielded whole, even though it is oversized. A `max_packet_size`
/// of 0 disables splitting.
///
/// ```
/// use rylv_statsd::Fragments;
///
/// let packet = b"a:1|c\nb:2|c\nc:3|c";
/// let fragments: Vec<&[u8]> = Fragments::new(packet, 12).collect();
/// assert_eq!(fragments, [&b"a:1|c\nb:2|c"[..], &b"c:3|c"[..]]);
/// ```
#[derive(Debug, Clone)]
pub struct Fragments<'a> {
    rest: Option<&'a [u8]>,
    max_packet_size: usize,
}

impl<'a> Fragments<'a> {
    /// Creates the splitter for `packet`.
    #[must_use]
    pub const fn new(packet: &'a [u8], max_packet_size: usize) -> Self {
        Self {
            rest: Some(packet),
            max_packet_size,
        }
    }
}

impl<'a> Iterator for Fragments<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.take()?;
        let max = self.max_packet_size;
        if max == 0 || rest.len() <= max {
            return Some(rest);
        }

        // rest.len() > max, so index max is in bounds
        match (1..=max).rev().find(|&i| rest[i] == b'\n') {
            Some(i) => {
                if rest.len() - i > 1 {
                    self.rest = Some(&rest[i + 1..]);
                }
                Some(&rest[..i])
            }
            None => {
                tracing::trace!(
                    len = rest.len(),
                    max,
                    "No newline before packet limit, sending oversized packet"
                );
                Some(rest)
            }
        }
    }
}

impl FusedIterator for Fragments<'_> {}
