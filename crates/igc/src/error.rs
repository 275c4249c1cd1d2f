//! Error types for igc.
//!
//! Two levels of error live here. [`RecordError`] and [`LineError`] describe
//! problems with individual lines of an IGC file; they are collected in the
//! parsed [`Document`](crate::Document) and never stop a parse. [`Error`] is
//! the crate-level error for everything that does: failing to read the input,
//! loading configuration, or serializing output.

use thiserror::Error;

/// The main error type for igc operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// Reading the underlying input failed. This is the only error that
    /// aborts a parse.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for igc operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error came from reading the input.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// A single problem detected on one line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The line does not match any shape for its record type.
    #[error("invalid {} record", record_letter(.0))]
    InvalidRecord(u8),

    /// A numeric field is not a well-formed signed integer.
    #[error("{text:?}: syntax error")]
    Syntax {
        /// The offending field text.
        text: String,
    },

    /// A declared addition lies beyond the end of the line.
    #[error("missing {tlc} addition")]
    MissingAddition {
        /// Three-letter code of the addition.
        tlc: String,
    },

    /// An addition declaration has non-contiguous or inverted columns.
    #[error("{tlc}: {reason}")]
    InvalidAddition {
        /// Three-letter code of the rejected addition.
        tlc: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The leading character does not name a record type.
    #[error("{}: unknown record type", render_record_type(.0))]
    UnknownRecordType(u8),

    /// A time-bearing record appeared before any date was established.
    #[error("no date")]
    NoDate,

    /// A byte outside the allowed character set (strict mode only).
    #[error("{}: invalid character", render_char(.0))]
    InvalidCharacter(u8),
}

impl RecordError {
    /// Create a syntax error for the given field bytes.
    #[must_use]
    pub fn syntax(text: &[u8]) -> Self {
        Self::Syntax {
            text: String::from_utf8_lossy(text).into_owned(),
        }
    }

    /// Check if this is a structural failure (no shape matched).
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::InvalidRecord(_) | Self::UnknownRecordType(_))
    }
}

fn record_letter(b: &u8) -> char {
    char::from(*b)
}

fn render_record_type(b: &u8) -> String {
    let b = *b;
    if is_printable(b) {
        char::from(b).to_string()
    } else {
        format!("\"\\x{b:02X}\"")
    }
}

fn render_char(b: &u8) -> String {
    let b = *b;
    if is_printable(b) {
        format!("'{}'", char::from(b))
    } else {
        format!("'\\x{b:02X}'")
    }
}

/// Bytes are read as Latin-1. Controls, the no-break space and the soft
/// hyphen are not printable.
fn is_printable(b: u8) -> bool {
    b.is_ascii_graphic() || b == b' ' || (b >= 0xA1 && b != 0xAD)
}

/// All problems found on one line, joined into a single error.
///
/// Renders as `"{line}: "` followed by each cause, separated by newlines, in
/// the order they were detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}: {}", join_causes(.errors))]
pub struct LineError {
    /// One-based line number.
    pub line: usize,
    /// The individual causes, in detection order. Never empty.
    pub errors: Vec<RecordError>,
}

impl LineError {
    /// The individual causes of this error.
    #[must_use]
    pub fn causes(&self) -> &[RecordError] {
        &self.errors
    }

    /// Check if any cause matches the predicate.
    pub fn any(&self, predicate: impl Fn(&RecordError) -> bool) -> bool {
        self.errors.iter().any(predicate)
    }
}

fn join_causes(errors: &[RecordError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl serde::Serialize for LineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let causes: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        let mut state = serializer.serialize_struct("LineError", 2)?;
        state.serialize_field("line", &self.line)?;
        state.serialize_field("causes", &causes)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_record_display() {
        assert_eq!(RecordError::InvalidRecord(b'B').to_string(), "invalid B record");
    }

    #[test]
    fn test_syntax_error_display() {
        assert_eq!(
            RecordError::syntax(b"-1X").to_string(),
            r#""-1X": syntax error"#
        );
        assert_eq!(RecordError::syntax(b"").to_string(), r#""": syntax error"#);
    }

    #[test]
    fn test_addition_errors_display() {
        let err = RecordError::MissingAddition {
            tlc: "SIU".to_string(),
        };
        assert_eq!(err.to_string(), "missing SIU addition");

        let err = RecordError::InvalidAddition {
            tlc: "AAA".to_string(),
            reason: "invalid start column",
        };
        assert_eq!(err.to_string(), "AAA: invalid start column");
    }

    #[test]
    fn test_unknown_record_type_display() {
        assert_eq!(
            RecordError::UnknownRecordType(b'X').to_string(),
            "X: unknown record type"
        );
        assert_eq!(
            RecordError::UnknownRecordType(0x1A).to_string(),
            r#""\x1A": unknown record type"#
        );
    }

    #[test]
    fn test_invalid_character_display() {
        assert_eq!(
            RecordError::InvalidCharacter(b'$').to_string(),
            "'$': invalid character"
        );
        assert_eq!(
            RecordError::InvalidCharacter(0).to_string(),
            r"'\x00': invalid character"
        );
        assert_eq!(
            RecordError::InvalidCharacter(0xE9).to_string(),
            "'é': invalid character"
        );
    }

    #[test]
    fn test_latin1_display() {
        assert_eq!(
            RecordError::UnknownRecordType(0xE9).to_string(),
            "é: unknown record type"
        );
        assert_eq!(
            RecordError::UnknownRecordType(0x85).to_string(),
            r#""\x85": unknown record type"#
        );
        assert_eq!(
            RecordError::InvalidCharacter(0xA0).to_string(),
            r"'\xA0': invalid character"
        );
        assert_eq!(
            RecordError::InvalidCharacter(0xAD).to_string(),
            r"'\xAD': invalid character"
        );
    }

    #[test]
    fn test_no_date_display() {
        assert_eq!(RecordError::NoDate.to_string(), "no date");
    }

    #[test]
    fn test_is_structural() {
        assert!(RecordError::InvalidRecord(b'C').is_structural());
        assert!(RecordError::UnknownRecordType(b'Z').is_structural());
        assert!(!RecordError::NoDate.is_structural());
    }

    #[test]
    fn test_line_error_joins_causes_in_order() {
        let err = LineError {
            line: 1,
            errors: vec![
                RecordError::UnknownRecordType(0),
                RecordError::InvalidCharacter(0),
            ],
        };
        assert_eq!(
            err.to_string(),
            "1: \"\\x00\": unknown record type\n'\\x00': invalid character"
        );
        assert_eq!(err.causes().len(), 2);
        assert!(err.any(|cause| matches!(cause, RecordError::InvalidCharacter(_))));
    }

    #[test]
    fn test_line_error_serialize() {
        let err = LineError {
            line: 3,
            errors: vec![RecordError::MissingAddition {
                tlc: "SIU".to_string(),
            }],
        };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"line":3,"causes":["missing SIU addition"]}"#);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err: Error = io_err.into();
        assert!(err.is_io());
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("pretty requires json output");
        assert_eq!(
            err.to_string(),
            "invalid configuration: pretty requires json output"
        );
        assert!(!err.is_io());
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }
}
