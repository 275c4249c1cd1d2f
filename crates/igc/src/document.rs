//! The parsed form of one IGC file.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{LineError, RecordError};
use crate::record::{FixRecord, ManufacturerRecord, PeriodicRecord, Record};

/// A parsed IGC file.
///
/// Parsing never rejects a whole file: every line that could be decoded is
/// here, and every problem is listed in [`errors`](Self::errors). Callers
/// decide what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// One slot per non-empty line, `None` where no record could be built.
    pub records: Vec<Option<Record>>,
    /// B records, in file order.
    pub fixes: Vec<FixRecord>,
    /// K records, in file order.
    pub periodic: Vec<PeriodicRecord>,
    /// N records, in file order.
    pub n_records: Vec<PeriodicRecord>,
    /// The most recent H record for each three-letter code.
    pub headers: BTreeMap<String, Record>,
    /// Line errors, in line order.
    pub errors: Vec<LineError>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one non-empty line.
    pub(crate) fn push(&mut self, line: usize, record: Option<Record>, errors: Vec<RecordError>) {
        match &record {
            Some(Record::Fix(fix)) => self.fixes.push(fix.clone()),
            Some(Record::Periodic(periodic)) => self.periodic.push(periodic.clone()),
            Some(Record::NRecord(n_record)) => self.n_records.push(n_record.clone()),
            Some(other) => {
                if let Some(tlc) = other.header_tlc() {
                    self.headers.insert(tlc.to_string(), other.clone());
                }
            }
            None => {}
        }
        self.records.push(record);
        if !errors.is_empty() {
            self.errors.push(LineError { line, errors });
        }
    }

    /// The most recent header with the given code.
    #[must_use]
    pub fn header(&self, tlc: &str) -> Option<&Record> {
        self.headers.get(tlc)
    }

    /// The value of the most recent header with the given code.
    #[must_use]
    pub fn header_value(&self, tlc: &str) -> Option<&str> {
        self.header(tlc).and_then(Record::header_value)
    }

    /// The flight date from the most recent valid DTE header.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self.header("DTE") {
            Some(Record::DateHeader(date_header)) => Some(date_header.date),
            _ => None,
        }
    }

    /// The first A record, if any.
    #[must_use]
    pub fn manufacturer(&self) -> Option<&ManufacturerRecord> {
        self.records.iter().flatten().find_map(|record| match record {
            Record::Manufacturer(manufacturer) => Some(manufacturer),
            _ => None,
        })
    }

    /// Check if no line produced an error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of records of each type letter.
    #[must_use]
    pub fn record_counts(&self) -> BTreeMap<char, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records.iter().flatten() {
            *counts.entry(char::from(record.record_type())).or_insert(0) += 1;
        }
        counts
    }
}
