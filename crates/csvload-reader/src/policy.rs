//! Row-level error policy.
//!
//! Row errors never unwind the parser. Each one is built into a
//! [`ParseError`] value and handed here; the policy collects it when
//! collection is on, trips the ceiling, and decides whether the row is
//! skipped or the read aborted.

use crate::config::ParseErrorAction;
use crate::error::{Error, ParseError};

/// Handler invoked for each row error under [`ParseErrorAction::RaiseEvent`];
/// its return value governs that error only.
pub type ErrorHandler = Box<dyn FnMut(&ParseError) -> ParseErrorAction + Send>;

/// What the read loop should do after a row error.
pub(crate) enum Disposition {
    /// Drop the row and read the next line.
    SkipRow,
    /// Abort the read with this error.
    Fatal(Error),
}

pub(crate) struct ParseErrorPolicy {
    action: ParseErrorAction,
    collect: bool,
    max_errors: u32,
    errors: Vec<ParseError>,
    handler: Option<ErrorHandler>,
}

impl ParseErrorPolicy {
    pub(crate) fn new(action: ParseErrorAction, collect: bool, max_errors: u32) -> Self {
        Self {
            action,
            collect,
            max_errors,
            errors: Vec::new(),
            handler: None,
        }
    }

    pub(crate) fn set_handler(&mut self, handler: ErrorHandler) {
        self.handler = Some(handler);
    }

    pub(crate) fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub(crate) fn handle(&mut self, error: ParseError) -> Disposition {
        tracing::warn!(%error, "row-level parse error");
        if self.collect {
            self.errors.push(error.clone());
            if self.max_errors > 0 && self.errors.len() as u32 >= self.max_errors {
                // The ceiling wins over every action.
                return Disposition::Fatal(Error::MaxErrorsExceeded {
                    limit: self.max_errors,
                });
            }
        }
        let action = match self.action {
            ParseErrorAction::RaiseEvent => match self.handler.as_mut() {
                Some(handler) => handler(&error),
                // An unobserved error must not vanish.
                None => ParseErrorAction::Throw,
            },
            other => other,
        };
        match action {
            ParseErrorAction::Throw => Disposition::Fatal(Error::Parse(error)),
            // A handler answering RaiseEvent has consumed the error.
            ParseErrorAction::SkipRow | ParseErrorAction::RaiseEvent => Disposition::SkipRow,
        }
    }
}
