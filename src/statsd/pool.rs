use crossbeam::queue::ArrayQueue;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Number of idle buffers kept by [`BufferPool::shared`].
pub const DEFAULT_POOL_CAPACITY: usize = 256;

// Buffers that grew past this (large batch joins) are freed instead of pooled.
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

static SHARED_POOL: OnceLock<Arc<BufferPool>> = OnceLock::new();

/// A pool of reusable byte buffers.
///
/// Buffers are handed out as [`PooledBuffer`] guards which return themselves to the
/// pool when dropped, so every acquisition is released exactly once on every path.
/// The pool also tracks how many buffers are currently out, which makes leaks
/// observable in tests.
#[derive(Debug)]
pub struct BufferPool {
    idle: ArrayQueue<Vec<u8>>,
    outstanding: AtomicUsize,
    high_water_mark: AtomicUsize,
    acquired_total: AtomicUsize,
}

impl BufferPool {
    /// Creates a pool that keeps at most `capacity` idle buffers.
    #[must_use]
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            idle: ArrayQueue::new(capacity.max(1)),
            outstanding: AtomicUsize::new(0),
            high_water_mark: AtomicUsize::new(0),
            acquired_total: AtomicUsize::new(0),
        })
    }

    /// Returns the process-wide pool used when no pool is configured.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        SHARED_POOL
            .get_or_init(|| Self::new(DEFAULT_POOL_CAPACITY))
            .clone()
    }

    /// Takes an empty buffer with room for at least `capacity` bytes.
    #[must_use]
    pub fn acquire(self: &Arc<Self>, capacity: usize) -> PooledBuffer {
        let mut buf = self.idle.pop().unwrap_or_default();
        buf.reserve_exact(capacity);

        let outstanding = self.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        self.high_water_mark.fetch_max(outstanding, Ordering::AcqRel);
        self.acquired_total.fetch_add(1, Ordering::Relaxed);

        PooledBuffer {
            buf,
            pool: Arc::clone(self),
        }
    }

    fn release(&self, mut buf: Vec<u8>) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        // a full pool just drops the buffer
        let _ = self.idle.push(buf);
    }

    /// Buffers acquired and not yet released.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// The largest number of buffers that were out at the same time.
    #[must_use]
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark.load(Ordering::Acquire)
    }

    /// Total number of acquisitions since the pool was created.
    #[must_use]
    pub fn acquired_total(&self) -> usize {
        self.acquired_total.load(Ordering::Relaxed)
    }

    /// Buffers currently waiting in the pool for reuse.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}

/// A buffer on loan from a [`BufferPool`]; returned to it on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl PooledBuffer {
    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// The written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
