//! Streaming text decoding with BOM detection.

use encoding_rs::{CoderResult, Decoder, Encoding};

use crate::error::StreamError;

/// Incremental byte-to-text decoder.
///
/// The first bytes of the stream are probed for a byte-order mark; a BOM
/// always wins over the configured encoding. Input that is malformed under
/// the chosen encoding is a fatal [`StreamError::Encoding`].
pub struct TextDecoder {
    configured: &'static Encoding,
    decoder: Option<Decoder>,
    pending: Vec<u8>,
}

impl TextDecoder {
    /// Create a decoder for a known encoding.
    #[must_use]
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            configured: encoding,
            decoder: None,
            pending: Vec::new(),
        }
    }

    /// Create a decoder from a WHATWG encoding label such as `"utf-8"`,
    /// `"windows-1252"` or `"utf-16le"`.
    pub fn for_label(label: &str) -> Result<Self, StreamError> {
        Encoding::for_label(label.as_bytes())
            .map(Self::new)
            .ok_or_else(|| StreamError::UnsupportedEncoding(label.to_string()))
    }

    /// The encoding this decoder resolved to, once the BOM probe has run.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.decoder
            .as_ref()
            .map(Decoder::encoding)
            .unwrap_or(self.configured)
    }

    /// Decode `input`, appending to `out`. Pass `last = true` exactly once
    /// at end of stream to flush any partial sequence.
    pub fn decode(&mut self, input: &[u8], last: bool, out: &mut String) -> Result<(), StreamError> {
        if self.decoder.is_none() {
            self.pending.extend_from_slice(input);
            // The longest BOM is three bytes; wait for that much unless the
            // stream ends first.
            if self.pending.len() < 3 && !last {
                return Ok(());
            }
            let encoding = match Encoding::for_bom(&self.pending) {
                Some((encoding, bom_len)) => {
                    self.pending.drain(..bom_len);
                    encoding
                }
                None => self.configured,
            };
            tracing::debug!(encoding = encoding.name(), "text decoder resolved");
            self.decoder = Some(encoding.new_decoder_without_bom_handling());
            let held = std::mem::take(&mut self.pending);
            return self.feed(&held, last, out);
        }
        self.feed(input, last, out)
    }

    fn feed(&mut self, input: &[u8], last: bool, out: &mut String) -> Result<(), StreamError> {
        let Some(decoder) = self.decoder.as_mut() else {
            return Ok(());
        };
        let name = decoder.encoding().name();
        let mut src = input;
        loop {
            let needed = decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() * 4 + 4);
            out.reserve(needed);
            let (result, read, had_errors) = decoder.decode_to_string(src, out, last);
            if had_errors {
                return Err(StreamError::Encoding { encoding: name });
            }
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => return Ok(()),
                CoderResult::OutputFull => {}
            }
        }
    }
}

impl std::fmt::Debug for TextDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextDecoder")
            .field("encoding", &self.encoding().name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn decode_all(decoder: &mut TextDecoder, chunks: &[&[u8]]) -> Result<String, StreamError> {
        let mut out = String::new();
        for chunk in chunks {
            decoder.decode(chunk, false, &mut out)?;
        }
        decoder.decode(&[], true, &mut out)?;
        Ok(out)
    }

    #[test]
    fn utf8_without_bom() {
        let mut d = TextDecoder::for_label("utf-8").unwrap();
        assert_eq!(decode_all(&mut d, &[b"a,b\nc"]).unwrap(), "a,b\nc");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut d = TextDecoder::for_label("utf-8").unwrap();
        assert_eq!(decode_all(&mut d, &[b"\xEF\xBB\xBFName"]).unwrap(), "Name");
    }

    #[test]
    fn utf16_bom_overrides_configured_encoding() {
        let mut d = TextDecoder::for_label("utf-8").unwrap();
        // UTF-16LE BOM followed by "hi"
        let bytes: &[u8] = &[0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(decode_all(&mut d, &[bytes]).unwrap(), "hi");
        assert_eq!(d.encoding().name(), "UTF-16LE");
    }

    #[test]
    fn multibyte_sequence_split_across_chunks() {
        let mut d = TextDecoder::for_label("utf-8").unwrap();
        let euro = "€".as_bytes();
        let out = decode_all(&mut d, &[&euro[..1], &euro[1..]]).unwrap();
        assert_eq!(out, "€");
    }

    #[test]
    fn windows_1252_label() {
        let mut d = TextDecoder::for_label("windows-1252").unwrap();
        assert_eq!(decode_all(&mut d, &[&[0xE9u8][..]]).unwrap(), "é");
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let mut d = TextDecoder::for_label("utf-8").unwrap();
        let err = decode_all(&mut d, &[&[b'a', 0xFF, b'b'][..]]).unwrap_err();
        assert!(matches!(err, StreamError::Encoding { encoding: "UTF-8" }));
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(matches!(
            TextDecoder::for_label("no-such-encoding"),
            Err(StreamError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn tiny_stream_shorter_than_a_bom() {
        let mut d = TextDecoder::for_label("utf-8").unwrap();
        assert_eq!(decode_all(&mut d, &[b"x"]).unwrap(), "x");
    }
}
