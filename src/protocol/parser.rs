//! Command Frame Parser
//!
//! This module decodes one request frame (an array of bulk strings) into a
//! [`Command`]. The wire layout is line oriented:
//!
//! ```text
//! *3\r\n          <- array header: element count
//! $3\r\n          <- bulk header: declared length
//! SET\r\n         <- bulk content
//! $4\r\n
//! name\r\n
//! $4\r\n
//! Ariz\r\n
//! ```
//!
//! ## How the Parser Works
//!
//! The parser reads from a buffer and returns either:
//! - `Ok(Some((command, consumed)))` - a full frame was decoded from `consumed` bytes
//! - `Ok(None)` - the frame is incomplete, more data is needed
//! - `Err(ParseError)` - the frame is malformed
//!
//! Both header kinds share one line primitive ([`parse_length_line`]) but are
//! decoded at separate call sites so each can be validated on its own.
//!
//! ## Framing Modes
//!
//! In [`FramingMode::Lenient`] the header type byte is skipped without being
//! checked and the declared bulk length is parsed but otherwise ignored: the
//! content is whatever the next line holds. [`FramingMode::Strict`] requires
//! the `*` and `$` markers and a content line whose byte length matches the
//! header.

use crate::protocol::types::{prefix, CRLF};
use thiserror::Error;

/// Errors that can occur while decoding a command frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A header line had nothing in it, not even a type byte
    #[error("empty header line")]
    EmptyHeader,

    /// A header length could not be parsed as a decimal integer
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Array element count is negative
    #[error("invalid array length: {0}")]
    InvalidArrayLength(i64),

    /// Bulk string length is negative (strict mode only)
    #[error("invalid bulk string length: {0}")]
    InvalidBulkLength(i64),

    /// The frame declared zero elements, so there is no command name
    #[error("empty command")]
    EmptyCommand,

    /// Content or header bytes are not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// A header started with the wrong type byte (strict mode only)
    #[error("expected type prefix {expected:?}, found {found:?}")]
    UnexpectedPrefix { expected: char, found: char },

    /// Content length differs from the bulk header (strict mode only)
    #[error("bulk length mismatch: declared {declared}, got {actual}")]
    LengthMismatch { declared: i64, actual: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Upper bound on the up-front element allocation for one frame.
const MAX_PREALLOCATED_ARGS: usize = 64;

/// A decoded request: the command name followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Element 0 of the frame, exactly as sent (not case-folded)
    pub name: String,
    /// Elements 1..N of the frame, in order
    pub args: Vec<String>,
}

impl Command {
    /// Builds a command from its name and arguments.
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// How strictly frame headers are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingMode {
    /// Header type bytes and declared bulk lengths are not checked.
    #[default]
    Lenient,
    /// `*`/`$` markers and bulk lengths must match the content.
    Strict,
}

/// Decoder for command frames.
///
/// # Example
///
/// ```
/// use respkv::protocol::parser::{FrameParser, FramingMode};
///
/// let parser = FrameParser::new(FramingMode::Lenient);
/// let input = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
///
/// let (command, consumed) = parser.parse(input).unwrap().unwrap();
/// assert_eq!(command.name, "GET");
/// assert_eq!(command.args, vec!["name".to_string()]);
/// assert_eq!(consumed, input.len());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameParser {
    mode: FramingMode,
}

impl FrameParser {
    /// Creates a parser with the given framing mode.
    pub fn new(mode: FramingMode) -> Self {
        Self { mode }
    }

    /// Returns the framing mode this parser validates with.
    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    /// Attempts to decode one command frame from the start of `buf`.
    pub fn parse(&self, buf: &[u8]) -> ParseResult<Option<(Command, usize)>> {
        let (count, mut consumed) = match self.parse_array_header(buf)? {
            Some(header) => header,
            None => return Ok(None),
        };

        if count == 0 {
            return Err(ParseError::EmptyCommand);
        }

        let mut elements = Vec::with_capacity(count.min(MAX_PREALLOCATED_ARGS));

        for _ in 0..count {
            let (declared, header_len) = match self.parse_bulk_header(&buf[consumed..])? {
                Some(header) => header,
                None => return Ok(None),
            };
            consumed += header_len;

            let (content, content_len) = match self.parse_bulk_content(&buf[consumed..], declared)? {
                Some(content) => content,
                None => return Ok(None),
            };
            consumed += content_len;

            elements.push(content);
        }

        let mut elements = elements.into_iter();
        let name = elements.next().ok_or(ParseError::EmptyCommand)?;
        Ok(Some((Command::new(name, elements.collect()), consumed)))
    }

    /// Parses the array header: `*<count>\r\n`
    fn parse_array_header(&self, buf: &[u8]) -> ParseResult<Option<(usize, usize)>> {
        let (line, consumed) = match read_line(buf) {
            Some(line) => line,
            None => return Ok(None),
        };

        if self.mode == FramingMode::Strict {
            expect_prefix(line, prefix::ARRAY)?;
        }

        let count = parse_length_line(line)?;
        if count < 0 {
            return Err(ParseError::InvalidArrayLength(count));
        }

        Ok(Some((count as usize, consumed)))
    }

    /// Parses a bulk header: `$<length>\r\n`
    ///
    /// The declared length is returned as-is; only strict mode acts on it.
    fn parse_bulk_header(&self, buf: &[u8]) -> ParseResult<Option<(i64, usize)>> {
        let (line, consumed) = match read_line(buf) {
            Some(line) => line,
            None => return Ok(None),
        };

        if self.mode == FramingMode::Strict {
            expect_prefix(line, prefix::BULK_STRING)?;
        }

        let length = parse_length_line(line)?;
        if self.mode == FramingMode::Strict && length < 0 {
            return Err(ParseError::InvalidBulkLength(length));
        }

        Ok(Some((length, consumed)))
    }

    /// Reads the content line that follows a bulk header.
    fn parse_bulk_content(
        &self,
        buf: &[u8],
        declared: i64,
    ) -> ParseResult<Option<(String, usize)>> {
        let (line, consumed) = match read_line(buf) {
            Some(line) => line,
            None => return Ok(None),
        };

        if self.mode == FramingMode::Strict && declared as usize != line.len() {
            return Err(ParseError::LengthMismatch {
                declared,
                actual: line.len(),
            });
        }

        let content = std::str::from_utf8(line)
            .map_err(|e| ParseError::InvalidUtf8(e.to_string()))?
            .to_string();

        Ok(Some((content, consumed)))
    }
}

/// Returns the line at the start of `buf` without its CRLF, plus the number
/// of bytes it occupies including the CRLF.
#[inline]
fn read_line(buf: &[u8]) -> Option<(&[u8], usize)> {
    find_crlf(buf).map(|pos| (&buf[..pos], pos + CRLF.len()))
}

/// Parses the integer carried by a header line.
///
/// The first byte is the type marker and is skipped; the rest must be a
/// decimal integer, optionally surrounded by ASCII whitespace.
pub fn parse_length_line(line: &[u8]) -> ParseResult<i64> {
    if line.is_empty() {
        return Err(ParseError::EmptyHeader);
    }

    let digits = std::str::from_utf8(&line[1..])
        .map_err(|e| ParseError::InvalidUtf8(e.to_string()))?
        .trim();

    digits
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidInteger(digits.to_string()))
}

fn expect_prefix(line: &[u8], expected: u8) -> ParseResult<()> {
    match line.first() {
        Some(&found) if found == expected => Ok(()),
        Some(&found) => Err(ParseError::UnexpectedPrefix {
            expected: expected as char,
            found: found as char,
        }),
        None => Err(ParseError::EmptyHeader),
    }
}

/// Finds the position of CRLF in the buffer.
///
/// Returns the position of `\r` if found, or None if CRLF is not present.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|window| window == CRLF)
}

/// Decodes a single frame in lenient mode.
pub fn parse_frame(buf: &[u8]) -> ParseResult<Option<(Command, usize)>> {
    FrameParser::default().parse(buf)
}
