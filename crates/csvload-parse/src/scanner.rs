//! Logical-line scanning.
//!
//! A *logical line* is the unit the field splitter consumes: physical line
//! breaks inside an open quoted field are data, not terminators. The scanner
//! tracks quote state by toggling on each unescaped quote character, counts
//! physical lines for error reporting, and enforces the quoted-field length
//! cap.

use std::io::Read;

use crate::error::StreamError;
use crate::pool::{BufferLease, BufferPool};
use crate::text::TextDecoder;

/// Scanner configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Quote character toggling in/out of quoted state.
    pub quote: char,
    /// Escape character; when distinct from `quote` it suppresses the quote
    /// meaning of the following character.
    pub escape: char,
    /// Whether a quoted field may span physical lines.
    pub allow_multiline_fields: bool,
    /// Cap on characters accumulated inside one open quote (0 = no cap).
    pub max_quoted_field_length: usize,
    /// Read buffer size in bytes.
    pub buffer_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            quote: '"',
            escape: '"',
            allow_multiline_fields: true,
            max_quoted_field_length: 0,
            buffer_size: 4096,
        }
    }
}

/// One logical line together with the physical line it ended on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Line content, physical terminators inside quoted fields included.
    pub text: String,
    /// 1-based physical line number on which this logical line ended.
    pub end_line: u64,
}

/// Streaming producer of logical lines.
pub struct LineScanner {
    input: Box<dyn Read + Send>,
    decoder: TextDecoder,
    opts: ScanOptions,
    lease: Option<BufferLease>,
    text: String,
    pos: usize,
    eof: bool,
    flushed: bool,
    skip_lf: bool,
    line_no: u64,
    closed: bool,
}

impl LineScanner {
    /// Create a scanner over a decoded byte stream, leasing its read buffer
    /// from `pool`.
    #[must_use]
    pub fn new(
        input: Box<dyn Read + Send>,
        decoder: TextDecoder,
        opts: ScanOptions,
        pool: &BufferPool,
    ) -> Self {
        let lease = pool.lease(opts.buffer_size.max(128));
        Self {
            input,
            decoder,
            opts,
            lease: Some(lease),
            text: String::new(),
            pos: 0,
            eof: false,
            flushed: false,
            skip_lf: false,
            line_no: 1,
            closed: false,
        }
    }

    /// 1-based number of the physical line currently being read.
    #[must_use]
    pub fn physical_line(&self) -> u64 {
        self.line_no
    }

    /// Release the pooled buffer. Subsequent calls yield no more lines.
    pub fn close(&mut self) {
        self.lease = None;
        self.closed = true;
    }

    /// Produce the next logical line, or `None` at end of stream.
    pub fn next_line(&mut self) -> Result<Option<LogicalLine>, StreamError> {
        if self.closed {
            return Ok(None);
        }
        let mut line = String::new();
        let mut in_quotes = false;
        let mut escape_next = false;
        let mut quoted_len: usize = 0;
        // Set while the CR of a CRLF pair inside a quoted field has already
        // been counted as a physical line.
        let mut crlf_pending = false;

        loop {
            if self.pos >= self.text.len() {
                if !self.refill()? {
                    break;
                }
                continue;
            }
            let Some(ch) = self.text[self.pos..].chars().next() else {
                break;
            };
            self.pos += ch.len_utf8();

            if self.skip_lf {
                self.skip_lf = false;
                if ch == '\n' {
                    continue;
                }
            }

            if in_quotes {
                quoted_len += 1;
                if self.opts.max_quoted_field_length > 0
                    && quoted_len > self.opts.max_quoted_field_length
                {
                    return Err(StreamError::QuotedFieldTooLong {
                        limit: self.opts.max_quoted_field_length,
                    });
                }
                if escape_next {
                    escape_next = false;
                    crlf_pending = false;
                    line.push(ch);
                    continue;
                }
                if ch == self.opts.escape && self.opts.escape != self.opts.quote {
                    escape_next = true;
                    crlf_pending = false;
                    line.push(ch);
                    continue;
                }
                if ch == self.opts.quote {
                    in_quotes = false;
                    crlf_pending = false;
                    line.push(ch);
                    continue;
                }
                if ch == '\r' || ch == '\n' {
                    if self.opts.allow_multiline_fields {
                        if ch == '\r' {
                            self.line_no += 1;
                            crlf_pending = true;
                        } else if crlf_pending {
                            crlf_pending = false;
                        } else {
                            self.line_no += 1;
                        }
                        line.push(ch);
                        continue;
                    }
                    // Multiline disabled: the terminator wins and quote
                    // state is discarded with the line.
                    let end = self.line_no;
                    self.line_no += 1;
                    self.skip_lf = ch == '\r';
                    return Ok(Some(LogicalLine {
                        text: line,
                        end_line: end,
                    }));
                }
                crlf_pending = false;
                line.push(ch);
            } else {
                if ch == self.opts.quote {
                    in_quotes = true;
                    quoted_len = 0;
                    line.push(ch);
                    continue;
                }
                if ch == '\r' || ch == '\n' {
                    let end = self.line_no;
                    self.line_no += 1;
                    self.skip_lf = ch == '\r';
                    return Ok(Some(LogicalLine {
                        text: line,
                        end_line: end,
                    }));
                }
                line.push(ch);
            }
        }

        // A file not ending in a terminator still yields its trailing
        // content as a final logical line.
        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(LogicalLine {
                text: line,
                end_line: self.line_no,
            }))
        }
    }

    /// Pull more decoded text into the carry buffer; false at true EOF.
    fn refill(&mut self) -> Result<bool, StreamError> {
        if self.pos > 0 {
            self.text.drain(..self.pos);
            self.pos = 0;
        }
        loop {
            if self.flushed {
                return Ok(!self.text.is_empty());
            }
            if self.eof {
                self.decoder.decode(&[], true, &mut self.text)?;
                self.flushed = true;
            } else {
                let Some(lease) = self.lease.as_mut() else {
                    return Ok(false);
                };
                let n = self.input.read(&mut lease[..])?;
                if n == 0 {
                    self.eof = true;
                    continue;
                }
                self.decoder.decode(&lease[..n], false, &mut self.text)?;
            }
            if !self.text.is_empty() {
                return Ok(true);
            }
        }
    }
}

impl std::fmt::Debug for LineScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineScanner")
            .field("line", &self.line_no)
            .field("eof", &self.eof)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn scan(input: &str, opts: ScanOptions) -> Vec<LogicalLine> {
        let pool = BufferPool::new();
        let decoder = TextDecoder::for_label("utf-8").unwrap();
        let mut scanner = LineScanner::new(
            Box::new(std::io::Cursor::new(input.as_bytes().to_vec())),
            decoder,
            opts,
            &pool,
        );
        let mut lines = Vec::new();
        while let Some(line) = scanner.next_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    fn texts(lines: &[LogicalLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn lf_terminated_lines() {
        let lines = scan("a\nb\nc\n", ScanOptions::default());
        assert_eq!(texts(&lines), ["a", "b", "c"]);
        assert_eq!(lines[2].end_line, 3);
    }

    #[test]
    fn crlf_does_not_produce_spurious_empty_lines() {
        let lines = scan("a\r\nb\r\n", ScanOptions::default());
        assert_eq!(texts(&lines), ["a", "b"]);
        assert_eq!(lines[1].end_line, 2);
    }

    #[test]
    fn bare_cr_is_a_terminator() {
        let lines = scan("a\rb\rc", ScanOptions::default());
        assert_eq!(texts(&lines), ["a", "b", "c"]);
    }

    #[test]
    fn mixed_terminators() {
        let lines = scan("a\r\nb\nc\rd", ScanOptions::default());
        assert_eq!(texts(&lines), ["a", "b", "c", "d"]);
    }

    #[test]
    fn trailing_content_without_terminator() {
        let lines = scan("a\nb", ScanOptions::default());
        assert_eq!(texts(&lines), ["a", "b"]);
        assert_eq!(lines[1].end_line, 2);
    }

    #[test]
    fn quoted_field_spans_physical_lines() {
        let lines = scan("x,\"one\ntwo\",y\nnext\n", ScanOptions::default());
        assert_eq!(texts(&lines), ["x,\"one\ntwo\",y", "next"]);
        assert_eq!(lines[0].end_line, 2);
        assert_eq!(lines[1].end_line, 3);
    }

    #[test]
    fn quoted_crlf_counts_one_physical_line() {
        let lines = scan("\"a\r\nb\"\ntail\n", ScanOptions::default());
        assert_eq!(lines[0].text, "\"a\r\nb\"");
        assert_eq!(lines[0].end_line, 2);
        assert_eq!(lines[1].end_line, 3);
    }

    #[test]
    fn multiline_disabled_breaks_open_quotes() {
        let opts = ScanOptions {
            allow_multiline_fields: false,
            ..ScanOptions::default()
        };
        let lines = scan("\"open\nrest\n", opts);
        assert_eq!(texts(&lines), ["\"open", "rest"]);
    }

    #[test]
    fn doubled_quotes_keep_quote_state_balanced() {
        // "" toggles out and back in, so the newline stays inside the field.
        let lines = scan("\"he said \"\"hi\"\"\nbye\"\n", ScanOptions::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "\"he said \"\"hi\"\"\nbye\"");
    }

    #[test]
    fn backslash_escape_keeps_quote_open() {
        let opts = ScanOptions {
            escape: '\\',
            ..ScanOptions::default()
        };
        let lines = scan("\"a\\\"b\nc\"\n", opts);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "\"a\\\"b\nc\"");
    }

    #[test]
    fn quoted_field_cap_is_enforced() {
        let pool = BufferPool::new();
        let decoder = TextDecoder::for_label("utf-8").unwrap();
        let opts = ScanOptions {
            max_quoted_field_length: 8,
            ..ScanOptions::default()
        };
        let input = "\"0123456789abcdef\"\n";
        let mut scanner = LineScanner::new(
            Box::new(std::io::Cursor::new(input.as_bytes().to_vec())),
            decoder,
            opts,
            &pool,
        );
        let err = scanner.next_line().unwrap_err();
        assert!(matches!(err, StreamError::QuotedFieldTooLong { limit: 8 }));
    }

    #[test]
    fn close_returns_the_pooled_buffer() {
        let pool = BufferPool::new();
        let decoder = TextDecoder::for_label("utf-8").unwrap();
        let mut scanner = LineScanner::new(
            Box::new(std::io::Cursor::new(b"a\n".to_vec())),
            decoder,
            ScanOptions::default(),
            &pool,
        );
        assert_eq!(pool.available(), 0);
        scanner.close();
        assert_eq!(pool.available(), 1);
        assert!(scanner.next_line().unwrap().is_none());
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(scan("", ScanOptions::default()).is_empty());
    }

    #[test]
    fn small_buffer_still_assembles_lines() {
        let opts = ScanOptions {
            buffer_size: 128,
            ..ScanOptions::default()
        };
        let long = "x".repeat(1000);
        let input = format!("{long}\n{long}\n");
        let lines = scan(&input, opts);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, long);
    }
}
