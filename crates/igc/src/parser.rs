//! Record dispatch and the parse entry points.
//!
//! The [`Parser`] feeds each line to the grammar for its leading letter,
//! applies the resulting state changes, checks the line's characters and
//! files the outcome in a [`Document`].

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::document::Document;
use crate::error::{RecordError, Result};
use crate::grammar;
use crate::lines::Lines;
use crate::record::Record;
use crate::state::{AdditionKind, ParserState};

/// Characters the IGC format reserves, never allowed in record content.
const RESERVED_CHARACTERS: &[u8] = b"$*!\\^~";

/// Options controlling a parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Accept bytes outside the IGC character set without reporting them.
    pub allow_invalid_chars: bool,
}

impl ParseOptions {
    /// Set whether invalid characters are accepted.
    #[must_use]
    pub fn with_allow_invalid_chars(mut self, allow: bool) -> Self {
        self.allow_invalid_chars = allow;
        self
    }
}

/// Incremental parser over the lines of one file.
#[derive(Debug)]
pub struct Parser {
    options: ParseOptions,
    state: ParserState,
    document: Document,
}

impl Parser {
    /// Create a parser with fresh state.
    #[must_use]
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            options: *options,
            state: ParserState::new(),
            document: Document::new(),
        }
    }

    /// The state built up so far.
    #[must_use]
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Parse one line. Empty lines are skipped.
    pub fn feed(&mut self, number: usize, line: &[u8]) {
        let Some(&record_type) = line.first() else {
            return;
        };
        trace!(line = number, record_type = %char::from(record_type), "Dispatching line");

        let mut errors = Vec::new();
        let record = dispatch(line, &mut self.state, &mut errors);
        if let Some(record) = &record {
            self.apply(record);
        }
        if !self.options.allow_invalid_chars {
            errors.extend(
                line.iter()
                    .copied()
                    .filter(|&b| !is_allowed(b))
                    .map(RecordError::InvalidCharacter),
            );
        }
        self.document.push(number, record, errors);
    }

    /// Finish parsing and return the document.
    #[must_use]
    pub fn finish(self) -> Document {
        debug!(
            records = self.document.records.len(),
            fixes = self.document.fixes.len(),
            errors = self.document.errors.len(),
            "Parsed document"
        );
        self.document
    }

    fn apply(&mut self, record: &Record) {
        match record {
            Record::DateHeader(date_header) => self.state.set_date(date_header.date),
            Record::FixAdditions(declaration) => self
                .state
                .install(AdditionKind::Fix, declaration.additions.clone()),
            Record::PeriodicAdditions(declaration) => self
                .state
                .install(AdditionKind::Periodic, declaration.additions.clone()),
            Record::NAdditions(declaration) => self
                .state
                .install(AdditionKind::N, declaration.additions.clone()),
            _ => {}
        }
    }
}

fn dispatch(line: &[u8], state: &mut ParserState, errors: &mut Vec<RecordError>) -> Option<Record> {
    match line.first().copied()? {
        b'A' => grammar::manufacturer(line, errors),
        b'B' => grammar::fix(line, state, errors),
        b'C' => grammar::task(line, state, errors),
        b'D' => grammar::gps_qualifier(line, errors),
        b'E' => grammar::event(line, state, errors),
        b'F' => grammar::satellites(line, state, errors),
        b'G' => grammar::security(line, errors),
        b'H' => grammar::header(line, errors),
        b'I' => grammar::addition_declaration(line, AdditionKind::Fix, errors),
        b'J' => grammar::addition_declaration(line, AdditionKind::Periodic, errors),
        b'K' => grammar::periodic(line, AdditionKind::Periodic, state, errors),
        b'L' => Some(grammar::log_message(line)),
        b'M' => grammar::addition_declaration(line, AdditionKind::N, errors),
        b'N' => grammar::periodic(line, AdditionKind::N, state, errors),
        other => {
            errors.push(RecordError::UnknownRecordType(other));
            None
        }
    }
}

/// Check if `b` may appear in an IGC file.
#[must_use]
pub fn is_allowed(b: u8) -> bool {
    (0x20..=0x7E).contains(&b) && !RESERVED_CHARACTERS.contains(&b)
}

/// Parse an IGC file with default options.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if reading fails. Problems with
/// individual lines are reported in [`Document::errors`] instead.
pub fn parse(reader: impl BufRead) -> Result<Document> {
    parse_with(reader, &ParseOptions::default())
}

/// Parse an IGC file.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if reading fails.
pub fn parse_with(reader: impl BufRead, options: &ParseOptions) -> Result<Document> {
    let mut parser = Parser::new(options);
    for line in Lines::new(reader) {
        let line = line?;
        parser.feed(line.number, &line.bytes);
    }
    Ok(parser.finish())
}

/// Parse lines that are already split, numbering them from 1.
pub fn parse_lines<I>(lines: I, options: &ParseOptions) -> Document
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut parser = Parser::new(options);
    for (index, line) in lines.into_iter().enumerate() {
        parser.feed(index + 1, line.as_ref());
    }
    parser.finish()
}
