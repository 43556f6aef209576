//! Input compression probe and bounded decompression.
//!
//! The probe peeks at most [`SNIFF_LEN`] bytes of the raw stream to recognize
//! a compression container, then hands the *complete* stream (peeked bytes
//! included) to the matching decoder. Decompressed output is counted against
//! an optional byte budget so a small compressed input cannot expand without
//! bound.

use std::io::{self, Read};

use thiserror::Error;

use crate::error::StreamError;

/// Maximum number of bytes the probe reads ahead of the decoder.
pub const SNIFF_LEN: usize = 8;

/// Framed-brotli signature (the proposed `.br` magic). Raw brotli streams
/// carry no header and must be selected explicitly.
const BROTLI_MAGIC: [u8; 4] = [0xCE, 0xB2, 0xCF, 0x81];

/// Compression handling for the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Sniff magic bytes: gzip and zlib are recognized, the framed-brotli
    /// signature is honoured, anything else passes through untouched.
    #[default]
    Auto,
    /// Plain input.
    None,
    /// RFC 1952 gzip; multi-member streams are accepted.
    Gzip,
    /// Raw DEFLATE. No detectable header, so explicit selection only.
    Deflate,
    /// RFC 1950 zlib.
    Zlib,
    /// Brotli.
    Brotli,
}

/// Identify a compression container from a stream prefix.
///
/// Returns [`Compression::None`] when no container is recognized. Raw
/// DEFLATE is never sniffed.
#[must_use]
pub fn sniff(prefix: &[u8]) -> Compression {
    if prefix.starts_with(&[0x1F, 0x8B]) {
        return Compression::Gzip;
    }
    if prefix.len() >= 2 && prefix[0] == 0x78 && matches!(prefix[1], 0x01 | 0x5E | 0x9C | 0xDA) {
        return Compression::Zlib;
    }
    if prefix.starts_with(&BROTLI_MAGIC) {
        return Compression::Brotli;
    }
    Compression::None
}

/// Wrap `input` in a decompressor according to `compression`.
///
/// With [`Compression::Auto`] the stream prefix is peeked (never consumed
/// from the downstream reader's point of view) and the detected container
/// decides the decoder. A non-zero `max_decompressed_size` bounds the total
/// decompressed output; overflow surfaces as
/// [`StreamError::DecompressionBomb`] from the returned reader.
pub fn open_stream(
    input: Box<dyn Read + Send>,
    compression: Compression,
    max_decompressed_size: u64,
) -> Result<Box<dyn Read + Send>, StreamError> {
    let (kind, source) = match compression {
        Compression::Auto => {
            let mut peek = PeekReader::new(input);
            let detected = sniff(peek.fill_prefix(SNIFF_LEN)?);
            tracing::debug!(?detected, "compression probe");
            if detected == Compression::Brotli {
                // The framed signature is not part of the brotli stream.
                peek.discard_prefix(BROTLI_MAGIC.len());
            }
            (detected, Box::new(peek) as Box<dyn Read + Send>)
        }
        explicit => (explicit, input),
    };

    let decoded: Box<dyn Read + Send> = match kind {
        Compression::Auto | Compression::None => return Ok(source),
        Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(source)),
        Compression::Deflate => Box::new(flate2::read::DeflateDecoder::new(source)),
        Compression::Zlib => Box::new(flate2::read::ZlibDecoder::new(source)),
        Compression::Brotli => Box::new(brotli::Decompressor::new(source, 8 * 1024)),
    };

    if max_decompressed_size == 0 {
        Ok(decoded)
    } else {
        Ok(Box::new(BoundedReader::new(decoded, max_decompressed_size)))
    }
}

/// Marker carried through the io error channel when the decompression
/// budget is exceeded; unwrapped by `StreamError::from`.
#[derive(Debug, Error)]
#[error("decompressed size exceeds the configured limit of {limit} bytes")]
pub(crate) struct BombSignal {
    pub(crate) limit: u64,
}

/// Reader that replays a sniffed prefix before the wrapped stream.
struct PeekReader {
    inner: Box<dyn Read + Send>,
    prefix: Vec<u8>,
    pos: usize,
}

impl PeekReader {
    fn new(inner: Box<dyn Read + Send>) -> Self {
        Self {
            inner,
            prefix: Vec::new(),
            pos: 0,
        }
    }

    /// Buffer up to `want` bytes from the head of the stream.
    ///
    /// Short streams buffer whatever is available; the buffered bytes are
    /// replayed by subsequent `read` calls.
    fn fill_prefix(&mut self, want: usize) -> io::Result<&[u8]> {
        while self.prefix.len() < want {
            let mut chunk = [0u8; SNIFF_LEN];
            let free = want - self.prefix.len();
            let n = self.inner.read(&mut chunk[..free])?;
            if n == 0 {
                break;
            }
            self.prefix.extend_from_slice(&chunk[..n]);
        }
        Ok(&self.prefix)
    }

    /// Permanently drop the first `n` buffered bytes.
    fn discard_prefix(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.prefix.len());
    }
}

impl Read for PeekReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.prefix.len() {
            let n = (self.prefix.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.prefix[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

/// Reader that counts bytes handed out and fails once a budget is exceeded.
struct BoundedReader<R> {
    inner: R,
    limit: u64,
    total: u64,
}

impl<R> BoundedReader<R> {
    fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            total: 0,
        }
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.total += n as u64;
        if n > 0 && self.total > self.limit {
            return Err(io::Error::other(BombSignal { limit: self.limit }));
        }
        Ok(n)
    }
}
