//! Typed IGC records.
//!
//! Every non-empty line of an IGC file is one record, identified by its first
//! character. [`Record`] is the closed set of shapes the parser produces,
//! including the lenient fallbacks used for common non-conformant lines.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// Decoded addition values, keyed by three-letter code.
pub type Additions = BTreeMap<String, i64>;

/// An extra fixed-width column range on a B, K or N record.
///
/// Columns are one-based and inclusive, counted on the raw line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordAddition {
    /// Three-letter code.
    pub tlc: String,
    /// First column.
    pub start_column: usize,
    /// Last column.
    pub finish_column: usize,
}

impl RecordAddition {
    /// Create a new addition.
    #[must_use]
    pub fn new(tlc: impl Into<String>, start_column: usize, finish_column: usize) -> Self {
        Self {
            tlc: tlc.into(),
            start_column,
            finish_column,
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.finish_column + 1 - self.start_column
    }
}

/// The data source of an H record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    /// Recorded by the flight recorder itself.
    #[serde(rename = "F")]
    FlightRecorder,
    /// Entered by an official observer.
    #[serde(rename = "O")]
    Other,
    /// Entered by the pilot.
    #[serde(rename = "P")]
    Pilot,
}

impl Source {
    /// Parse a source letter.
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'F' => Some(Self::FlightRecorder),
            b'O' => Some(Self::Other),
            b'P' => Some(Self::Pilot),
            _ => None,
        }
    }
}

/// GPS fix validity of a B record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Validity {
    /// Two-dimensional fix, no GNSS altitude.
    #[serde(rename = "V")]
    TwoD,
    /// Three-dimensional fix.
    #[serde(rename = "A")]
    ThreeD,
}

/// GPS qualifier of a D record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GpsQualifier {
    /// Plain GPS.
    #[serde(rename = "1")]
    Gps,
    /// Differential GPS.
    #[serde(rename = "2")]
    Dgps,
}

/// A record: manufacturer and recorder identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManufacturerRecord {
    /// Three-letter manufacturer code.
    pub manufacturer_id: String,
    /// Recorder serial number.
    pub unique_id: String,
    /// Text after the first `-`, for approved manufacturers only.
    pub additional_data: String,
}

/// B record: a position fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixRecord {
    /// `None` when no date had been established.
    pub time: Option<DateTime<Utc>>,
    /// Latitude in degrees, negative south.
    pub lat: f64,
    /// Longitude in degrees, negative west.
    pub lon: f64,
    /// 2D or 3D fix.
    pub validity: Validity,
    /// Pressure altitude in metres.
    pub alt_barometric: i64,
    /// GNSS altitude in metres.
    pub alt_gnss: i64,
    /// Values of the additions declared by the last I record.
    pub additions: Additions,
}

/// First C record: the task declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDeclarationRecord {
    /// `None` if the declared date is not a calendar date.
    pub declaration_time: Option<NaiveDateTime>,
    /// Intended flight day, or zero.
    pub flight_day: i64,
    /// Intended flight month, or zero.
    pub flight_month: i64,
    /// Intended flight year, two digits, or zero.
    pub flight_year: i64,
    /// Task number of the day.
    pub task_number: i64,
    /// Number of turnpoints, excluding takeoff, start, finish and landing.
    pub turnpoint_count: i64,
    /// Free text, usually the task name.
    pub text: String,
}

/// Subsequent C records: task waypoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaypointRecord {
    /// Latitude in degrees, negative south.
    pub lat: f64,
    /// Longitude in degrees, negative west.
    pub lon: f64,
    /// Waypoint name.
    pub text: String,
}

/// D record: differential GPS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpsQualifierRecord {
    /// GPS or DGPS.
    pub qualifier: GpsQualifier,
    /// DGPS station id.
    pub station_id: i64,
}

/// E record: an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// When the event happened.
    pub time: Option<DateTime<Utc>>,
    /// Three-letter event code, e.g. `PEV`.
    pub tlc: String,
    /// Event data.
    pub text: String,
}

/// E record whose code slot is not a three-letter code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventWithoutCodeRecord {
    /// When the event happened.
    pub time: Option<DateTime<Utc>>,
    /// Everything after the time, verbatim.
    pub text: String,
}

/// F record: satellite constellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SatelliteRecord {
    /// When the constellation changed.
    pub time: Option<DateTime<Utc>>,
    /// Ids of the satellites in use.
    pub satellite_ids: Vec<u8>,
}

/// G record: security data. Not verified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityRecord {
    /// The signature fragment.
    pub text: String,
}

/// H record: a header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRecord {
    /// Who supplied the value.
    pub source: Source,
    /// Three-letter header code.
    pub tlc: String,
    /// Long name between the code and the colon, possibly empty.
    pub long_name: String,
    /// Text after the colon.
    pub value: String,
}

/// HFDTE record: the flight date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateHeaderRecord {
    /// The header as written.
    #[serde(flatten)]
    pub header: HeaderRecord,
    /// The decoded date.
    pub date: NaiveDate,
    /// Flight number of the day, if given.
    pub flight_number: Option<u32>,
}

/// H record with a source letter other than F, O or P.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderWithInvalidSourceRecord {
    /// The unrecognised source character.
    pub source: String,
    /// Three-letter header code.
    pub tlc: String,
    /// Long name, possibly empty.
    pub long_name: String,
    /// Text after the colon.
    pub value: String,
}

/// I, J or M record: declares additions to B, K or N records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AdditionDeclarationRecord {
    /// Accepted additions, in column order.
    pub additions: Vec<RecordAddition>,
}

/// K or N record: data sampled at a fixed interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodicRecord {
    /// Sample time.
    pub time: Option<DateTime<Utc>>,
    /// Values of the additions declared by the last J or M record.
    pub additions: Additions,
}

/// L record: a log message with a source tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMessageRecord {
    /// Three-letter source, usually a manufacturer code.
    pub tag: String,
    /// The message.
    pub text: String,
}

/// L record without a three-letter source tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMessageWithoutTagRecord {
    /// Everything after the `L`.
    pub text: String,
}

/// A parsed IGC record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// A: manufacturer and recorder.
    Manufacturer(ManufacturerRecord),
    /// B: a fix.
    Fix(FixRecord),
    /// First C: task declaration.
    TaskDeclaration(TaskDeclarationRecord),
    /// Other C: a task waypoint.
    Waypoint(WaypointRecord),
    /// D: differential GPS.
    GpsQualifier(GpsQualifierRecord),
    /// E: an event.
    Event(EventRecord),
    /// E without a code. Invalid.
    EventWithoutCode(EventWithoutCodeRecord),
    /// F: satellites in use.
    Satellites(SatelliteRecord),
    /// G: security.
    Security(SecurityRecord),
    /// H: a header.
    Header(HeaderRecord),
    /// H: the flight date.
    DateHeader(DateHeaderRecord),
    /// H with an unknown source. Invalid.
    HeaderWithInvalidSource(HeaderWithInvalidSourceRecord),
    /// I: B record additions.
    FixAdditions(AdditionDeclarationRecord),
    /// J: K record additions.
    PeriodicAdditions(AdditionDeclarationRecord),
    /// K: periodic data.
    Periodic(PeriodicRecord),
    /// L: a tagged log message.
    LogMessage(LogMessageRecord),
    /// L without a tag. Invalid.
    LogMessageWithoutTag(LogMessageWithoutTagRecord),
    /// M: N record additions.
    NAdditions(AdditionDeclarationRecord),
    /// N: periodic data using the M table.
    NRecord(PeriodicRecord),
}

impl Record {
    /// The record type letter this record was parsed from.
    #[must_use]
    pub fn record_type(&self) -> u8 {
        match self {
            Self::Manufacturer(_) => b'A',
            Self::Fix(_) => b'B',
            Self::TaskDeclaration(_) | Self::Waypoint(_) => b'C',
            Self::GpsQualifier(_) => b'D',
            Self::Event(_) | Self::EventWithoutCode(_) => b'E',
            Self::Satellites(_) => b'F',
            Self::Security(_) => b'G',
            Self::Header(_) | Self::DateHeader(_) | Self::HeaderWithInvalidSource(_) => b'H',
            Self::FixAdditions(_) => b'I',
            Self::PeriodicAdditions(_) => b'J',
            Self::Periodic(_) => b'K',
            Self::LogMessage(_) | Self::LogMessageWithoutTag(_) => b'L',
            Self::NAdditions(_) => b'M',
            Self::NRecord(_) => b'N',
        }
    }

    /// Check if the record conforms to the IGC specification.
    ///
    /// Only the lenient fallbacks are invalid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(
            self,
            Self::EventWithoutCode(_)
                | Self::HeaderWithInvalidSource(_)
                | Self::LogMessageWithoutTag(_)
        )
    }

    /// The header code, for H-family records.
    #[must_use]
    pub fn header_tlc(&self) -> Option<&str> {
        match self {
            Self::Header(header) => Some(&header.tlc),
            Self::DateHeader(date) => Some(&date.header.tlc),
            Self::HeaderWithInvalidSource(header) => Some(&header.tlc),
            _ => None,
        }
    }

    /// The header value, for H-family records.
    #[must_use]
    pub fn header_value(&self) -> Option<&str> {
        match self {
            Self::Header(header) => Some(&header.value),
            Self::DateHeader(date) => Some(&date.header.value),
            Self::HeaderWithInvalidSource(header) => Some(&header.value),
            _ => None,
        }
    }

    /// The reconstructed timestamp, for time-bearing records.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Fix(fix) => fix.time,
            Self::Event(event) => event.time,
            Self::EventWithoutCode(event) => event.time,
            Self::Satellites(satellites) => satellites.time,
            Self::Periodic(periodic) | Self::NRecord(periodic) => periodic.time,
            Self::Manufacturer(_)
            | Self::TaskDeclaration(_)
            | Self::Waypoint(_)
            | Self::GpsQualifier(_)
            | Self::Security(_)
            | Self::Header(_)
            | Self::DateHeader(_)
            | Self::HeaderWithInvalidSource(_)
            | Self::FixAdditions(_)
            | Self::PeriodicAdditions(_)
            | Self::LogMessage(_)
            | Self::LogMessageWithoutTag(_)
            | Self::NAdditions(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_variant() -> Vec<Record> {
        let periodic = PeriodicRecord {
            time: None,
            additions: Additions::new(),
        };
        let header = HeaderRecord {
            source: Source::FlightRecorder,
            tlc: "DTE".to_string(),
            long_name: String::new(),
            value: "020508".to_string(),
        };
        vec![
            Record::Manufacturer(ManufacturerRecord {
                manufacturer_id: "FLY".to_string(),
                unique_id: "05094".to_string(),
                additional_data: String::new(),
            }),
            Record::Fix(FixRecord {
                time: None,
                lat: 0.0,
                lon: 0.0,
                validity: Validity::ThreeD,
                alt_barometric: 0,
                alt_gnss: 0,
                additions: Additions::new(),
            }),
            Record::TaskDeclaration(TaskDeclarationRecord {
                declaration_time: None,
                flight_day: 0,
                flight_month: 0,
                flight_year: 0,
                task_number: 0,
                turnpoint_count: 0,
                text: String::new(),
            }),
            Record::Waypoint(WaypointRecord {
                lat: 0.0,
                lon: 0.0,
                text: String::new(),
            }),
            Record::GpsQualifier(GpsQualifierRecord {
                qualifier: GpsQualifier::Gps,
                station_id: 0,
            }),
            Record::Event(EventRecord {
                time: None,
                tlc: "PEV".to_string(),
                text: String::new(),
            }),
            Record::EventWithoutCode(EventWithoutCodeRecord {
                time: None,
                text: String::new(),
            }),
            Record::Satellites(SatelliteRecord {
                time: None,
                satellite_ids: Vec::new(),
            }),
            Record::Security(SecurityRecord {
                text: String::new(),
            }),
            Record::Header(header.clone()),
            Record::DateHeader(DateHeaderRecord {
                header,
                date: NaiveDate::from_ymd_opt(2008, 5, 2).unwrap(),
                flight_number: None,
            }),
            Record::HeaderWithInvalidSource(HeaderWithInvalidSourceRecord {
                source: "S".to_string(),
                tlc: "CCL".to_string(),
                long_name: String::new(),
                value: String::new(),
            }),
            Record::FixAdditions(AdditionDeclarationRecord::default()),
            Record::PeriodicAdditions(AdditionDeclarationRecord::default()),
            Record::Periodic(periodic.clone()),
            Record::LogMessage(LogMessageRecord {
                tag: "XNA".to_string(),
                text: String::new(),
            }),
            Record::LogMessageWithoutTag(LogMessageWithoutTagRecord {
                text: String::new(),
            }),
            Record::NAdditions(AdditionDeclarationRecord::default()),
            Record::NRecord(periodic),
        ]
    }

    #[test]
    fn test_record_types() {
        let letters: Vec<u8> = every_variant().iter().map(Record::record_type).collect();
        assert_eq!(letters, b"ABCCDEEFGHHHIJKLLMN".to_vec());
    }

    #[test]
    fn test_only_fallbacks_are_invalid() {
        let invalid: Vec<u8> = every_variant()
            .iter()
            .filter(|record| !record.is_valid())
            .map(Record::record_type)
            .collect();
        assert_eq!(invalid, b"EHL".to_vec());
    }

    #[test]
    fn test_header_accessors() {
        let records = every_variant();
        let tlcs: Vec<&str> = records.iter().filter_map(Record::header_tlc).collect();
        assert_eq!(tlcs, vec!["DTE", "DTE", "CCL"]);
        assert_eq!(records[10].header_value(), Some("020508"));
        assert_eq!(records[0].header_value(), None);
    }

    #[test]
    fn test_addition_width() {
        assert_eq!(RecordAddition::new("FXA", 36, 38).width(), 3);
        assert_eq!(RecordAddition::new("TDS", 41, 41).width(), 1);
    }

    #[test]
    fn test_source_from_byte() {
        assert_eq!(Source::from_byte(b'F'), Some(Source::FlightRecorder));
        assert_eq!(Source::from_byte(b'O'), Some(Source::Other));
        assert_eq!(Source::from_byte(b'P'), Some(Source::Pilot));
        assert_eq!(Source::from_byte(b'S'), None);
    }

    #[test]
    fn test_record_serialization() {
        let record = Record::Header(HeaderRecord {
            source: Source::Pilot,
            tlc: "PLT".to_string(),
            long_name: "PILOTINCHARGE".to_string(),
            value: "Tom Payne".to_string(),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "header");
        assert_eq!(json["source"], "P");
        assert_eq!(json["value"], "Tom Payne");
    }

    #[test]
    fn test_date_header_serialization_is_flat() {
        let records = every_variant();
        let json = serde_json::to_value(&records[10]).unwrap();
        assert_eq!(json["kind"], "date_header");
        assert_eq!(json["tlc"], "DTE");
        assert_eq!(json["date"], "2008-05-02");
    }
}
