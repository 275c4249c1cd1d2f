//! Record grammars.
//!
//! One function per record letter. Each takes the raw bytes of a single line,
//! pushes every problem it finds onto `errors` and returns the record it could
//! build, if any. Shapes are anchored byte regexes matching the whole line.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::bytes::{Captures, Regex};

use crate::error::RecordError;
use crate::manufacturer;
use crate::record::{
    AdditionDeclarationRecord, DateHeaderRecord, EventRecord, EventWithoutCodeRecord, FixRecord,
    GpsQualifier, GpsQualifierRecord, HeaderRecord, HeaderWithInvalidSourceRecord,
    LogMessageRecord, LogMessageWithoutTagRecord, ManufacturerRecord, PeriodicRecord, Record,
    RecordAddition, SatelliteRecord, SecurityRecord, Source, TaskDeclarationRecord, Validity,
    WaypointRecord,
};
use crate::state::{AdditionKind, ParserState};

/// Minutes are written as MMmmm, thousandths of a minute.
const MINUTE_DENOMINATOR: i64 = 60_000;

/// Compile a grammar that must match the whole line.
///
/// # Panics
///
/// Panics if the pattern is invalid.
fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!(r"(?s-u)\A{pattern}\z")).expect("Invalid record grammar")
}

static A_RECORD: LazyLock<Regex> = LazyLock::new(|| anchored(r"A([A-Z]{3})(.*)"));

static B_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    anchored(
        r"B(\d{2})(\d{2})(\d{2})(\d{2})(\d{5})([NS])(\d{3})(\d{5})([EW])([AV])([0-9\-]\d{4})([0-9\-]\d{4})(.*)",
    )
});

static C_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    anchored(
        r"C(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})(\d{4})([0-9\-]\d)(.*)",
    )
});

static C_WAYPOINT: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"C(\d{2})(\d{5})([NS])(\d{3})(\d{5})([EW])(.*)"));

static D_RECORD: LazyLock<Regex> = LazyLock::new(|| anchored(r"D([12])(\d{4})"));

static E_RECORD: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"E(\d{2})(\d{2})(\d{2})([A-Z]{3})(.*)"));

static E_RECORD_WITHOUT_CODE: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"E(\d{2})(\d{2})(\d{2})(.*)"));

static F_RECORD: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"F(\d{2})(\d{2})(\d{2})((?:\d{2})*)"));

static G_RECORD: LazyLock<Regex> = LazyLock::new(|| anchored(r"G(.*)"));

static H_LEGACY_DATE: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"HFDTE(\d{2})(\d{2})(\d{2})"));

static H_LEGACY_FIX_ACCURACY: LazyLock<Regex> = LazyLock::new(|| anchored(r"HFFXA(\d+)"));

static H_RECORD: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"H(.)([0-9A-Z]{3})([ 0-9A-Za-z]*)(?::(.*))?"));

// Only anchored at the end: some recorders put text before the date.
static H_DATE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)(\d{2})(\d{2})(\d{2})(?:,(\d{2}))?\z").expect("Invalid record grammar")
});

static ADDITION_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"[IJM](\d{2})((?:\d{4}[A-Z]{3})*)"));

static PERIODIC_RECORD: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"[KN](\d{2})(\d{2})(\d{2})(.*)"));

/// Parse a signed decimal integer, `-?[0-9]+`.
///
/// # Errors
///
/// Returns [`RecordError::Syntax`] for anything else, including values that
/// do not fit in an `i64`.
pub fn atoi(data: &[u8]) -> Result<i64, RecordError> {
    let (negative, digits) = match data.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, data),
    };
    if digits.is_empty() {
        return Err(RecordError::syntax(data));
    }
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(RecordError::syntax(data));
        }
        value = value
            .checked_mul(10)
            .and_then(|value| value.checked_add(i64::from(b - b'0')))
            .ok_or_else(|| RecordError::syntax(data))?;
    }
    Ok(if negative { -value } else { value })
}

/// Expand a two-digit year. The IGC format dates from 1993.
#[must_use]
pub fn make_year(two_digit_year: i64) -> i32 {
    let year = if two_digit_year >= 93 {
        1900 + two_digit_year
    } else {
        2000 + two_digit_year
    };
    year as i32
}

fn group<'h>(caps: &Captures<'h>, i: usize) -> &'h [u8] {
    caps.get(i).map_or(&[], |m| m.as_bytes())
}

fn number(caps: &Captures<'_>, i: usize) -> i64 {
    atoi(group(caps, i)).unwrap_or(0)
}

fn text(caps: &Captures<'_>, i: usize) -> String {
    lossy(group(caps, i))
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn date(day: i64, month: i64, two_digit_year: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(make_year(two_digit_year), month as u32, day as u32)
}

/// Degrees plus minutes, with optional extra minute digits.
fn coordinate(degrees: i64, minutes: i64, extra: Option<i64>, digits: u32, negative: bool) -> f64 {
    let (minutes, denominator) = extra
        .and_then(|extra| {
            let scale = 10_i64.checked_pow(digits)?;
            let minutes = minutes.checked_mul(scale)?.checked_add(extra)?;
            Some((minutes, MINUTE_DENOMINATOR.checked_mul(scale)?))
        })
        .unwrap_or((minutes, MINUTE_DENOMINATOR));
    let value = degrees as f64 + minutes as f64 / denominator as f64;
    if negative {
        -value
    } else {
        value
    }
}

/// Scale a fractional-second value of `digits` digits to nanoseconds.
fn nanoseconds(fraction: i64, digits: u32) -> i64 {
    if digits <= 9 {
        10_i64
            .checked_pow(9 - digits)
            .and_then(|scale| fraction.checked_mul(scale))
            .unwrap_or(0)
    } else {
        10_i64
            .checked_pow(digits - 9)
            .map_or(0, |scale| fraction / scale)
    }
}

fn timestamp(
    caps: &Captures<'_>,
    nanosecond: i64,
    state: &mut ParserState,
    errors: &mut Vec<RecordError>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    state
        .timestamp(number(caps, 1), number(caps, 2), number(caps, 3), nanosecond)
        .map_err(|err| errors.push(err))
        .ok()
}

/// A: manufacturer and recorder id.
pub fn manufacturer(line: &[u8], errors: &mut Vec<RecordError>) -> Option<Record> {
    let Some(caps) = A_RECORD.captures(line) else {
        errors.push(RecordError::InvalidRecord(b'A'));
        return None;
    };
    let manufacturer_id = text(&caps, 1);
    let rest = group(&caps, 2);
    let (unique_id, additional_data): (&[u8], &[u8]) = if manufacturer::is_approved(&manufacturer_id)
    {
        match rest.iter().position(|&b| b == b'-') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, &[]),
        }
    } else {
        (rest, &[])
    };
    Some(Record::Manufacturer(ManufacturerRecord {
        manufacturer_id,
        unique_id: lossy(unique_id),
        additional_data: lossy(additional_data),
    }))
}

/// B: a fix.
///
/// Errors are reported structural first, then time, then additions.
pub fn fix(line: &[u8], state: &mut ParserState, errors: &mut Vec<RecordError>) -> Option<Record> {
    let Some(caps) = B_RECORD.captures(line) else {
        errors.push(RecordError::InvalidRecord(b'B'));
        return None;
    };

    let table = state.table(AdditionKind::Fix);
    let mut addition_errors = Vec::new();
    let additions = table.decode(line, &mut addition_errors);
    let (lat_digits, lon_digits, fraction_digits) = (
        table.lat_digits(),
        table.lon_digits(),
        table.fraction_digits(),
    );

    let nanosecond = additions
        .get("TDS")
        .map_or(0, |&fraction| nanoseconds(fraction, fraction_digits));
    let time = timestamp(&caps, nanosecond, state, errors);
    errors.extend(addition_errors);

    let lat = coordinate(
        number(&caps, 4),
        number(&caps, 5),
        additions.get("LAD").copied(),
        lat_digits,
        group(&caps, 6) == b"S",
    );
    let lon = coordinate(
        number(&caps, 7),
        number(&caps, 8),
        additions.get("LOD").copied(),
        lon_digits,
        group(&caps, 9) == b"W",
    );
    let validity = if group(&caps, 10) == b"A" {
        Validity::ThreeD
    } else {
        Validity::TwoD
    };

    Some(Record::Fix(FixRecord {
        time,
        lat,
        lon,
        validity,
        alt_barometric: number(&caps, 11),
        alt_gnss: number(&caps, 12),
        additions,
    }))
}

/// C: the task declaration on the first C line, waypoints otherwise.
pub fn task(line: &[u8], state: &mut ParserState, errors: &mut Vec<RecordError>) -> Option<Record> {
    if state.first_c_record() {
        if let Some(caps) = C_DECLARATION.captures(line) {
            let declaration_time = date(number(&caps, 1), number(&caps, 2), number(&caps, 3))
                .and_then(|date| {
                    date.and_hms_opt(
                        number(&caps, 4) as u32,
                        number(&caps, 5) as u32,
                        number(&caps, 6) as u32,
                    )
                });
            return Some(Record::TaskDeclaration(TaskDeclarationRecord {
                declaration_time,
                flight_day: number(&caps, 7),
                flight_month: number(&caps, 8),
                flight_year: number(&caps, 9),
                task_number: number(&caps, 10),
                turnpoint_count: number(&caps, 11),
                text: text(&caps, 12),
            }));
        }
    }

    let Some(caps) = C_WAYPOINT.captures(line) else {
        errors.push(RecordError::InvalidRecord(b'C'));
        return None;
    };
    Some(Record::Waypoint(WaypointRecord {
        lat: coordinate(
            number(&caps, 1),
            number(&caps, 2),
            None,
            0,
            group(&caps, 3) == b"S",
        ),
        lon: coordinate(
            number(&caps, 4),
            number(&caps, 5),
            None,
            0,
            group(&caps, 6) == b"W",
        ),
        text: text(&caps, 7),
    }))
}

/// D: differential GPS.
pub fn gps_qualifier(line: &[u8], errors: &mut Vec<RecordError>) -> Option<Record> {
    let Some(caps) = D_RECORD.captures(line) else {
        errors.push(RecordError::InvalidRecord(b'D'));
        return None;
    };
    let qualifier = if group(&caps, 1) == b"2" {
        GpsQualifier::Dgps
    } else {
        GpsQualifier::Gps
    };
    Some(Record::GpsQualifier(GpsQualifierRecord {
        qualifier,
        station_id: number(&caps, 2),
    }))
}

/// E: an event, with or without a three-letter code.
pub fn event(line: &[u8], state: &mut ParserState, errors: &mut Vec<RecordError>) -> Option<Record> {
    if let Some(caps) = E_RECORD.captures(line) {
        let time = timestamp(&caps, 0, state, errors);
        return Some(Record::Event(EventRecord {
            time,
            tlc: text(&caps, 4),
            text: text(&caps, 5),
        }));
    }
    let Some(caps) = E_RECORD_WITHOUT_CODE.captures(line) else {
        errors.push(RecordError::InvalidRecord(b'E'));
        return None;
    };
    let time = timestamp(&caps, 0, state, errors);
    Some(Record::EventWithoutCode(EventWithoutCodeRecord {
        time,
        text: text(&caps, 4),
    }))
}

/// F: satellites in use.
pub fn satellites(
    line: &[u8],
    state: &mut ParserState,
    errors: &mut Vec<RecordError>,
) -> Option<Record> {
    let Some(caps) = F_RECORD.captures(line) else {
        errors.push(RecordError::InvalidRecord(b'F'));
        return None;
    };
    let time = timestamp(&caps, 0, state, errors);
    let satellite_ids = group(&caps, 4)
        .chunks_exact(2)
        .map(|pair| (pair[0] - b'0') * 10 + (pair[1] - b'0'))
        .collect();
    Some(Record::Satellites(SatelliteRecord {
        time,
        satellite_ids,
    }))
}

/// G: security data, kept verbatim.
pub fn security(line: &[u8], errors: &mut Vec<RecordError>) -> Option<Record> {
    let Some(caps) = G_RECORD.captures(line) else {
        errors.push(RecordError::InvalidRecord(b'G'));
        return None;
    };
    Some(Record::Security(SecurityRecord {
        text: text(&caps, 1),
    }))
}

/// H: a header field.
///
/// Date headers are recognised in both the legacy `HFDTEddmmyy` form and the
/// `HFDTEDATE:ddmmyy,nn` form. A DTE header whose value is not a valid date is
/// kept as a plain header and reported.
pub fn header(line: &[u8], errors: &mut Vec<RecordError>) -> Option<Record> {
    if let Some(caps) = H_LEGACY_DATE.captures(line) {
        let header = HeaderRecord {
            source: Source::FlightRecorder,
            tlc: "DTE".to_string(),
            long_name: String::new(),
            value: lossy(&line[5..]),
        };
        return Some(
            match date(number(&caps, 1), number(&caps, 2), number(&caps, 3)) {
                Some(date) => Record::DateHeader(DateHeaderRecord {
                    header,
                    date,
                    flight_number: None,
                }),
                None => {
                    errors.push(RecordError::InvalidRecord(b'H'));
                    Record::Header(header)
                }
            },
        );
    }

    if let Some(caps) = H_LEGACY_FIX_ACCURACY.captures(line) {
        return Some(Record::Header(HeaderRecord {
            source: Source::FlightRecorder,
            tlc: "FXA".to_string(),
            long_name: String::new(),
            value: text(&caps, 1),
        }));
    }

    let Some(caps) = H_RECORD.captures(line) else {
        errors.push(RecordError::InvalidRecord(b'H'));
        return None;
    };
    let tlc = text(&caps, 2);
    let long_name = text(&caps, 3);
    let value = group(&caps, 4);

    let Some(source) = group(&caps, 1).first().copied().and_then(Source::from_byte) else {
        return Some(Record::HeaderWithInvalidSource(
            HeaderWithInvalidSourceRecord {
                source: text(&caps, 1),
                tlc,
                long_name,
                value: lossy(value),
            },
        ));
    };

    let header = HeaderRecord {
        source,
        tlc,
        long_name,
        value: lossy(value),
    };
    if header.tlc != "DTE" {
        return Some(Record::Header(header));
    }

    let parsed = H_DATE_VALUE.captures(value).and_then(|caps| {
        let date = date(number(&caps, 1), number(&caps, 2), number(&caps, 3))?;
        let flight_number = caps
            .get(4)
            .and_then(|m| atoi(m.as_bytes()).ok())
            .map(|n| n as u32);
        Some((date, flight_number))
    });
    Some(match parsed {
        Some((date, flight_number)) => Record::DateHeader(DateHeaderRecord {
            header,
            date,
            flight_number,
        }),
        None => {
            errors.push(RecordError::InvalidRecord(b'H'));
            Record::Header(header)
        }
    })
}

/// I, J or M: declare additions.
///
/// Each triple must start where the previous accepted one finished. Rejected
/// triples are reported and left out; the record keeps the rest.
pub fn addition_declaration(
    line: &[u8],
    kind: AdditionKind,
    errors: &mut Vec<RecordError>,
) -> Option<Record> {
    let record_type = kind.record_type();
    let Some(caps) = ADDITION_DECLARATION.captures(line) else {
        errors.push(RecordError::InvalidRecord(record_type));
        return None;
    };
    let count = number(&caps, 1) as usize;
    let triples = group(&caps, 2);
    if triples.len() != 7 * count {
        errors.push(RecordError::InvalidRecord(record_type));
        return None;
    }

    let mut expected_start = kind.first_column();
    let mut additions = Vec::with_capacity(count);
    for triple in triples.chunks_exact(7) {
        let start_column = atoi(&triple[..2]).unwrap_or(0) as usize;
        let finish_column = atoi(&triple[2..4]).unwrap_or(0) as usize;
        let tlc = lossy(&triple[4..]);
        let reason = if start_column != expected_start {
            Some("invalid start column")
        } else if finish_column < start_column {
            Some("invalid finish column")
        } else {
            None
        };
        match reason {
            Some(reason) => errors.push(RecordError::InvalidAddition { tlc, reason }),
            None => {
                expected_start = finish_column + 1;
                additions.push(RecordAddition::new(tlc, start_column, finish_column));
            }
        }
    }

    let declaration = AdditionDeclarationRecord { additions };
    Some(match kind {
        AdditionKind::Fix => Record::FixAdditions(declaration),
        AdditionKind::Periodic => Record::PeriodicAdditions(declaration),
        AdditionKind::N => Record::NAdditions(declaration),
    })
}

/// K or N: periodic data decoded with the J or M table.
pub fn periodic(
    line: &[u8],
    kind: AdditionKind,
    state: &mut ParserState,
    errors: &mut Vec<RecordError>,
) -> Option<Record> {
    let Some(caps) = PERIODIC_RECORD.captures(line) else {
        errors.push(RecordError::InvalidRecord(match kind {
            AdditionKind::N => b'N',
            AdditionKind::Fix | AdditionKind::Periodic => b'K',
        }));
        return None;
    };
    let mut addition_errors = Vec::new();
    let additions = state.table(kind).decode(line, &mut addition_errors);
    let time = timestamp(&caps, 0, state, errors);
    errors.extend(addition_errors);

    let record = PeriodicRecord { time, additions };
    Some(match kind {
        AdditionKind::N => Record::NRecord(record),
        AdditionKind::Fix | AdditionKind::Periodic => Record::Periodic(record),
    })
}

/// L: a log message. Never invalid.
#[must_use]
pub fn log_message(line: &[u8]) -> Record {
    match line.get(1..4) {
        Some(tag) if tag.iter().all(u8::is_ascii_uppercase) => {
            Record::LogMessage(LogMessageRecord {
                tag: lossy(tag),
                text: lossy(&line[4..]),
            })
        }
        _ => Record::LogMessageWithoutTag(LogMessageWithoutTagRecord {
            text: lossy(line.get(1..).unwrap_or_default()),
        }),
    }
}
