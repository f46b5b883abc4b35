//! Parser error types.

use std::ops::Range;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Error type for manifest and descriptor parsing failures.
#[derive(Debug, Error, Diagnostic)]
#[error("Parse error: {message}")]
#[diagnostic(code(overlay::manifest::parse))]
pub struct ParseError {
    pub message: String,

    #[source_code]
    pub src: String,

    #[label("here")]
    pub span: SourceSpan,
}

impl ParseError {
    /// Creates an error pointing at a byte range of the source.
    pub fn at(message: impl Into<String>, src: &str, range: Range<usize>) -> Self {
        let end = range.end.max(range.start + 1).min(src.len().max(range.start + 1));
        Self {
            message: message.into(),
            src: src.to_string(),
            span: SourceSpan::from(range.start..end),
        }
    }

    /// Creates an error from a 1-based line and column, as reported by
    /// `serde_json` and `roxmltree`.
    pub fn at_line_col(message: impl Into<String>, src: &str, line: usize, column: usize) -> Self {
        let offset = offset_of(src, line, column);
        Self::at(message, src, offset..offset + 1)
    }

    /// 1-based line and column of the start of the span.
    pub fn line_col(&self) -> (usize, usize) {
        let (mut line, mut column) = (1, 1);
        for (index, c) in self.src.char_indices() {
            if index >= self.span.offset() {
                break;
            }
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    /// The message followed by where in the source it applies.
    pub fn located_message(&self) -> String {
        let (line, column) = self.line_col();
        format!("{} (line {}, column {})", self.message, line, column)
    }
}

/// Converts a 1-based line/column pair into a byte offset, clamped to the source.
fn offset_of(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();

    (line_start + column.saturating_sub(1)).min(src.len().saturating_sub(1))
}
