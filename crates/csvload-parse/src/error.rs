//! Stream-layer error types.

use thiserror::Error;

/// Errors raised by the byte and character layers of the engine.
///
/// Every variant here is fatal to the owning reader: the stream is closed
/// and pooled resources are released before the error surfaces.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    /// Undecodable bytes under the configured encoding.
    #[error("invalid byte sequence for encoding {encoding}")]
    Encoding {
        /// Name of the encoding that rejected the input.
        encoding: &'static str,
    },

    /// The configured encoding label is not recognized.
    #[error("unsupported encoding label: {0}")]
    UnsupportedEncoding(String),

    /// Decompressed output exceeded the configured budget.
    #[error("decompressed size exceeds the configured limit of {limit} bytes")]
    DecompressionBomb {
        /// The configured budget in bytes.
        limit: u64,
    },

    /// A quoted field ran past the configured length cap.
    #[error("quoted field exceeds the configured maximum of {limit} characters")]
    QuotedFieldTooLong {
        /// The configured cap in characters.
        limit: usize,
    },
}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        // The bounded decompressor reports budget overflow through the io
        // channel; restore the typed variant here.
        if let Some(sig) = e
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<crate::compression::BombSignal>())
        {
            return StreamError::DecompressionBomb { limit: sig.limit };
        }
        StreamError::Io(e)
    }
}
