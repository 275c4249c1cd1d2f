//! Cross-line parser state.
//!
//! A [`ParserState`] carries everything one line of an IGC file can depend
//! on from earlier lines: the flight date, the timestamp watermark used to
//! infer midnight rollovers, and the addition tables declared by I, J and M
//! records. Each parse owns exactly one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use tracing::debug;

use crate::error::RecordError;
use crate::grammar;
use crate::record::{Additions, RecordAddition};

/// The three kinds of addition declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionKind {
    /// I record, extending B records.
    Fix,
    /// J record, extending K records.
    Periodic,
    /// M record, extending N records.
    N,
}

impl AdditionKind {
    /// Map a declaration record letter to its kind.
    #[must_use]
    pub fn from_record_type(b: u8) -> Option<Self> {
        match b {
            b'I' => Some(Self::Fix),
            b'J' => Some(Self::Periodic),
            b'M' => Some(Self::N),
            _ => None,
        }
    }

    /// The declaration record letter.
    #[must_use]
    pub fn record_type(self) -> u8 {
        match self {
            Self::Fix => b'I',
            Self::Periodic => b'J',
            Self::N => b'M',
        }
    }

    /// Column at which the first addition must start.
    ///
    /// B records have 35 fixed columns; K and N records have 7.
    #[must_use]
    pub fn first_column(self) -> usize {
        match self {
            Self::Fix => 36,
            Self::Periodic | Self::N => 8,
        }
    }
}

/// An installed set of additions plus the precision factors derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionTable {
    additions: Vec<RecordAddition>,
    lat_digits: u32,
    lon_digits: u32,
    fraction_digits: u32,
}

impl AdditionTable {
    /// Build a table, deriving the LAD, LOD and TDS widths.
    #[must_use]
    pub fn new(additions: Vec<RecordAddition>) -> Self {
        let width_of = |tlc: &str| {
            additions
                .iter()
                .rev()
                .find(|addition| addition.tlc == tlc)
                .map_or(0, |addition| addition.width() as u32)
        };
        let lat_digits = width_of("LAD");
        let lon_digits = width_of("LOD");
        let fraction_digits = width_of("TDS");
        Self {
            additions,
            lat_digits,
            lon_digits,
            fraction_digits,
        }
    }

    /// The declared additions, in declaration order.
    #[must_use]
    pub fn additions(&self) -> &[RecordAddition] {
        &self.additions
    }

    /// Check if no additions are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty()
    }

    /// Width of the extra latitude minute digits, or 0 without LAD.
    #[must_use]
    pub fn lat_digits(&self) -> u32 {
        self.lat_digits
    }

    /// Width of the extra longitude minute digits, or 0 without LOD.
    #[must_use]
    pub fn lon_digits(&self) -> u32 {
        self.lon_digits
    }

    /// Width of the fractional seconds, or 0 without TDS.
    #[must_use]
    pub fn fraction_digits(&self) -> u32 {
        self.fraction_digits
    }

    /// Decode every declared addition from `line`.
    ///
    /// Additions that lie past the end of the line or do not hold a signed
    /// integer are left out of the result and reported in `errors`.
    pub fn decode(&self, line: &[u8], errors: &mut Vec<RecordError>) -> Additions {
        let mut values = Additions::new();
        for addition in &self.additions {
            let start = addition.start_column.saturating_sub(1);
            let Some(slice) = line.get(start..addition.finish_column) else {
                errors.push(RecordError::MissingAddition {
                    tlc: addition.tlc.clone(),
                });
                continue;
            };
            match grammar::atoi(slice) {
                Ok(value) => {
                    values.insert(addition.tlc.clone(), value);
                }
                Err(err) => errors.push(err),
            }
        }
        values
    }
}

/// State threaded through every line of one parse.
#[derive(Debug, Clone, Default)]
pub struct ParserState {
    date: Option<NaiveDate>,
    watermark: Option<NaiveDateTime>,
    fix_additions: AdditionTable,
    periodic_additions: AdditionTable,
    n_additions: AdditionTable,
    seen_c_record: bool,
}

impl ParserState {
    /// Create an empty state: no date, no additions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current flight date, including any inferred rollovers.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// The latest timestamp handed out.
    #[must_use]
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.watermark.map(|watermark| watermark.and_utc())
    }

    /// Set the flight date from a date header.
    ///
    /// The watermark is kept, so times never run backwards even across an
    /// explicit date change.
    pub fn set_date(&mut self, date: NaiveDate) {
        if self.date != Some(date) {
            debug!(%date, previous = ?self.date, "Flight date set");
        }
        self.date = Some(date);
    }

    /// The addition table for a declaration kind.
    #[must_use]
    pub fn table(&self, kind: AdditionKind) -> &AdditionTable {
        match kind {
            AdditionKind::Fix => &self.fix_additions,
            AdditionKind::Periodic => &self.periodic_additions,
            AdditionKind::N => &self.n_additions,
        }
    }

    /// Replace the addition table for a declaration kind.
    pub fn install(&mut self, kind: AdditionKind, additions: Vec<RecordAddition>) {
        let table = AdditionTable::new(additions);
        debug!(
            record_type = %char::from(kind.record_type()),
            additions = table.additions().len(),
            lat_digits = table.lat_digits(),
            lon_digits = table.lon_digits(),
            fraction_digits = table.fraction_digits(),
            "Installed addition table"
        );
        match kind {
            AdditionKind::Fix => self.fix_additions = table,
            AdditionKind::Periodic => self.periodic_additions = table,
            AdditionKind::N => self.n_additions = table,
        }
    }

    /// Returns `true` for the first C record of the file only.
    pub fn first_c_record(&mut self) -> bool {
        !std::mem::replace(&mut self.seen_c_record, true)
    }

    /// Turn a time of day into a full timestamp.
    ///
    /// The date is advanced one day at a time until the result is no earlier
    /// than the previous timestamp. The advanced date is kept for later lines.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NoDate`] if no date has been set.
    pub fn timestamp(
        &mut self,
        hour: i64,
        minute: i64,
        second: i64,
        nanosecond: i64,
    ) -> Result<DateTime<Utc>, RecordError> {
        let mut date = self.date.ok_or(RecordError::NoDate)?;
        let since_midnight = TimeDelta::seconds(hour * 3600 + minute * 60 + second)
            + TimeDelta::nanoseconds(nanosecond);

        let mut candidate = date.and_time(NaiveTime::MIN) + since_midnight;
        while self.watermark.is_some_and(|watermark| candidate < watermark) {
            let Some(next) = date.succ_opt() else {
                break;
            };
            date = next;
            candidate = date.and_time(NaiveTime::MIN) + since_midnight;
        }

        if self.date != Some(date) {
            debug!(%date, "Inferred midnight rollover");
            self.date = Some(date);
        }
        self.watermark = Some(candidate);
        Ok(candidate.and_utc())
    }
}
