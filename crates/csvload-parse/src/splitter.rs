//! Field splitting over one logical line.
//!
//! Splitting runs under a configurable delimiter (one or more characters),
//! quote character, escape character and quote mode. The delimiter never
//! matches inside a quoted field; a trailing delimiter produces a trailing
//! empty field; an empty line produces no fields at all.

use std::borrow::Cow;

use smallvec::SmallVec;

/// Quote interpretation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// RFC 4180 reading: a leading quote always opens a quoted field.
    #[default]
    Strict,
    /// A leading quote opens a quoted field only when a syntactically valid
    /// closing quote exists later in the line (doubled quotes and
    /// backslash-escaped quotes are not closers); otherwise it is literal.
    Lenient,
}

/// Splitting configuration.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Field separator, one or more characters.
    pub delimiter: String,
    /// Quote character.
    pub quote: char,
    /// Escape character for quotes inside a quoted field.
    pub escape: char,
    /// Quote interpretation mode.
    pub mode: QuoteMode,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            quote: '"',
            escape: '"',
            mode: QuoteMode::Strict,
        }
    }
}

/// One split field with its quoting provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field text, quotes stripped and escapes resolved.
    pub value: String,
    /// True iff the field was syntactically enclosed by the quote character.
    pub was_quoted: bool,
}

impl Field {
    fn unquoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            was_quoted: false,
        }
    }
}

/// Result of splitting one logical line.
#[derive(Debug, Clone, Default)]
pub struct SplitResult {
    /// Fields in source order.
    pub fields: SmallVec<[Field; 8]>,
    /// True when a strict-mode quoted field never closed; the accumulated
    /// value is the final field.
    pub unterminated: bool,
}

/// Rewrite curly/smart quotes (U+2018/2019/201C/201D) to their ASCII
/// counterparts. Applied by callers before splitting when quote
/// normalization is enabled.
#[must_use]
pub fn normalize_smart_quotes(line: &str) -> Cow<'_, str> {
    if !line
        .chars()
        .any(|c| matches!(c, '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'))
    {
        return Cow::Borrowed(line);
    }
    Cow::Owned(
        line.chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                other => other,
            })
            .collect(),
    )
}

/// Split one logical line into fields.
#[must_use]
pub fn split_line(line: &str, opts: &SplitOptions) -> SplitResult {
    let mut out = SplitResult::default();
    if line.is_empty() {
        return out;
    }
    let mut pos = 0usize;
    loop {
        let starts_quoted = line[pos..].starts_with(opts.quote);
        let parsed = if starts_quoted {
            match opts.mode {
                QuoteMode::Strict => Some(parse_quoted(line, pos, opts, false)),
                QuoteMode::Lenient => find_lenient_close(line, pos, opts)
                    .map(|_| parse_quoted(line, pos, opts, true)),
            }
        } else {
            None
        };
        let (field, next, delim_followed) = match parsed {
            Some(quoted) => {
                if quoted.unterminated {
                    out.fields.push(quoted.field);
                    out.unterminated = true;
                    return out;
                }
                (quoted.field, quoted.next, quoted.delim_followed)
            }
            None => parse_unquoted(line, pos, opts),
        };
        out.fields.push(field);
        if !delim_followed {
            return out;
        }
        pos = next;
        if pos >= line.len() {
            // Trailing delimiter: one final empty field.
            out.fields.push(Field::unquoted(""));
            return out;
        }
    }
}

struct ParsedQuoted {
    field: Field,
    next: usize,
    delim_followed: bool,
    unterminated: bool,
}

fn parse_unquoted(line: &str, pos: usize, opts: &SplitOptions) -> (Field, usize, bool) {
    let rest = &line[pos..];
    let idx = match single_char(&opts.delimiter) {
        Some(c) => rest.find(c),
        None => rest.find(opts.delimiter.as_str()),
    };
    match idx {
        Some(i) => (
            Field::unquoted(&rest[..i]),
            pos + i + opts.delimiter.len(),
            true,
        ),
        None => (Field::unquoted(rest), line.len(), false),
    }
}

fn parse_quoted(line: &str, start: usize, opts: &SplitOptions, lenient: bool) -> ParsedQuoted {
    let qlen = opts.quote.len_utf8();
    let mut value = String::new();
    let mut i = start + qlen;

    while i < line.len() {
        let Some(ch) = line[i..].chars().next() else {
            break;
        };
        let chlen = ch.len_utf8();

        if ch == opts.escape && opts.escape != opts.quote {
            if let Some(next) = line[i + chlen..].chars().next() {
                value.push(next);
                i += chlen + next.len_utf8();
            } else {
                value.push(ch);
                i += chlen;
            }
            continue;
        }
        if lenient && ch == '\\' && opts.escape != '\\' {
            if let Some(next) = line[i + 1..].chars().next() {
                value.push(next);
                i += 1 + next.len_utf8();
                continue;
            }
        }
        if ch == opts.quote {
            if line[i + qlen..].starts_with(opts.quote) {
                // Doubled quote is a literal quote.
                value.push(opts.quote);
                i += qlen * 2;
                continue;
            }
            let after = i + qlen;
            if lenient {
                // The look-ahead already proved this quote is the close;
                // anything before the next delimiter is discarded.
                return close_at(value, line, after, opts);
            }
            if after >= line.len() {
                return ParsedQuoted {
                    field: Field {
                        value,
                        was_quoted: true,
                    },
                    next: line.len(),
                    delim_followed: false,
                    unterminated: false,
                };
            }
            if let Some(next) = delimiter_at(line, after, opts) {
                return ParsedQuoted {
                    field: Field {
                        value,
                        was_quoted: true,
                    },
                    next,
                    delim_followed: true,
                    unterminated: false,
                };
            }
            let blank_end = skip_blanks(line, after);
            if blank_end > after {
                if blank_end >= line.len() {
                    return ParsedQuoted {
                        field: Field {
                            value,
                            was_quoted: true,
                        },
                        next: line.len(),
                        delim_followed: false,
                        unterminated: false,
                    };
                }
                if let Some(next) = delimiter_at(line, blank_end, opts) {
                    return ParsedQuoted {
                        field: Field {
                            value,
                            was_quoted: true,
                        },
                        next,
                        delim_followed: true,
                        unterminated: false,
                    };
                }
            }
            // Not a syntactic close: the quote is data.
            value.push(ch);
            i = after;
            continue;
        }
        value.push(ch);
        i += chlen;
    }

    ParsedQuoted {
        field: Field {
            value,
            was_quoted: true,
        },
        next: line.len(),
        delim_followed: false,
        unterminated: true,
    }
}

/// Terminate a lenient quoted field at `after` (just past the closing
/// quote), discarding any junk before the next delimiter.
fn close_at(value: String, line: &str, after: usize, opts: &SplitOptions) -> ParsedQuoted {
    let rest = &line[after..];
    let idx = match single_char(&opts.delimiter) {
        Some(c) => rest.find(c),
        None => rest.find(opts.delimiter.as_str()),
    };
    let field = Field {
        value,
        was_quoted: true,
    };
    match idx {
        Some(i) => ParsedQuoted {
            field,
            next: after + i + opts.delimiter.len(),
            delim_followed: true,
            unterminated: false,
        },
        None => ParsedQuoted {
            field,
            next: line.len(),
            delim_followed: false,
            unterminated: false,
        },
    }
}

/// Locate the first syntactically valid closing quote for a lenient field
/// opening at `start`, honouring doubled quotes and backslash escapes.
fn find_lenient_close(line: &str, start: usize, opts: &SplitOptions) -> Option<usize> {
    let qlen = opts.quote.len_utf8();
    let mut i = start + qlen;
    while i < line.len() {
        let ch = line[i..].chars().next()?;
        let chlen = ch.len_utf8();
        if (ch == opts.escape && opts.escape != opts.quote) || ch == '\\' {
            let skip = line[i + chlen..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(0);
            i += chlen + skip;
            continue;
        }
        if ch == opts.quote {
            if line[i + qlen..].starts_with(opts.quote) {
                i += qlen * 2;
                continue;
            }
            return Some(i);
        }
        i += chlen;
    }
    None
}

fn delimiter_at(line: &str, idx: usize, opts: &SplitOptions) -> Option<usize> {
    line[idx..]
        .starts_with(opts.delimiter.as_str())
        .then(|| idx + opts.delimiter.len())
}

fn skip_blanks(line: &str, mut idx: usize) -> usize {
    while idx < line.len() {
        let Some(ch) = line[idx..].chars().next() else {
            break;
        };
        if ch != ' ' && ch != '\t' {
            break;
        }
        idx += ch.len_utf8();
    }
    idx
}

fn single_char(delimiter: &str) -> Option<char> {
    let mut chars = delimiter.chars();
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}
