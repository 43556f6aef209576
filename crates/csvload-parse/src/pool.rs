//! Pooled read buffers.
//!
//! Scanners lease their read buffer from a [`BufferPool`] and the lease's
//! `Drop` impl returns it on every exit path, so a closed (or failed) reader
//! never strands its buffer. The pool is an explicit object owned by the
//! caller; there is no process-wide pool.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use bytes::BytesMut;

/// A shared pool of reusable read buffers.
#[derive(Debug, Clone, Default)]
pub struct BufferPool {
    inner: Arc<Mutex<Vec<BytesMut>>>,
}

impl BufferPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lease a zero-filled buffer of `capacity` bytes, reusing a pooled
    /// allocation when one is available.
    #[must_use]
    pub fn lease(&self, capacity: usize) -> BufferLease {
        let mut buf = self
            .inner
            .lock()
            .ok()
            .and_then(|mut pooled| pooled.pop())
            .unwrap_or_default();
        buf.clear();
        buf.resize(capacity, 0);
        BufferLease {
            pool: self.clone(),
            buf,
        }
    }

    /// Number of buffers currently resting in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.lock().map(|pooled| pooled.len()).unwrap_or(0)
    }

    fn give_back(&self, buf: BytesMut) {
        if let Ok(mut pooled) = self.inner.lock() {
            pooled.push(buf);
        }
    }
}

/// RAII lease over a pooled buffer; returns the buffer on drop.
#[derive(Debug)]
pub struct BufferLease {
    pool: BufferPool,
    buf: BytesMut,
}

impl Deref for BufferLease {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buf
    }
}

impl DerefMut for BufferLease {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

impl Drop for BufferLease {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf));
    }
}
