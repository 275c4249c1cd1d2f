//! End-to-end parsing of whole IGC documents.

use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use igc::record::{GpsQualifier, Source, Validity};
use igc::{manufacturer, parse, parse_lines, parse_with, Document, ParseOptions, Record};

const FIX: &str = "B1501444708879N00832146EA0092900941";

fn lines(lines: &[&str]) -> Document {
    parse_lines(lines, &ParseOptions::default())
}

fn errors(document: &Document) -> Vec<String> {
    document.errors.iter().map(ToString::to_string).collect()
}

#[test]
fn test_fix_additions_example() {
    let document = lines(&[
        "HFDTEDATE:040624,01",
        "I023638FXA3940SIU",
        "B1501444708879N00832146EA009290094100612",
    ]);

    assert!(document.is_clean(), "{:?}", errors(&document));
    assert_eq!(document.fixes.len(), 1);

    let fix = &document.fixes[0];
    assert_eq!(fix.additions.len(), 2);
    assert_eq!(fix.additions["FXA"], 6);
    assert_eq!(fix.additions["SIU"], 12);
    assert_eq!(fix.lat, 47.0 + 8879.0 / 60000.0);
    assert_eq!(fix.lon, 8.0 + 32146.0 / 60000.0);
    assert_eq!(fix.validity, Validity::ThreeD);
    assert_eq!(fix.alt_barometric, 929);
    assert_eq!(fix.alt_gnss, 941);
    assert_eq!(
        fix.time,
        Some(Utc.with_ymd_and_hms(2024, 6, 4, 15, 1, 44).unwrap())
    );
}

#[test]
fn test_short_line_omits_unreachable_additions() {
    let document = lines(&[
        "HFDTEDATE:040624,01",
        "I023638FXA3940SIU",
        &format!("{FIX}006"),
    ]);

    assert_eq!(errors(&document), vec!["3: missing SIU addition"]);
    let fix = &document.fixes[0];
    assert_eq!(fix.additions.len(), 1);
    assert_eq!(fix.additions["FXA"], 6);
}

#[test]
fn test_syntax_error_in_addition() {
    let document = lines(&[
        "HFDTEDATE:040624,01",
        "I023638FXA3940SIU",
        &format!("{FIX}-1X12"),
    ]);

    assert_eq!(errors(&document), vec![r#"3: "-1X": syntax error"#]);
    let fix = &document.fixes[0];
    assert!(!fix.additions.contains_key("FXA"));
    assert_eq!(fix.additions["SIU"], 12);
}

#[test]
fn test_high_resolution_coordinates() {
    let document = lines(&["HFDTE040624", "I023636LAD3737LOD", &format!("{FIX}57")]);

    assert!(document.is_clean(), "{:?}", errors(&document));
    let fix = &document.fixes[0];
    assert!((fix.lat - (47.0 + 88795.0 / 600_000.0)).abs() < 1e-12);
    assert!((fix.lon - (8.0 + 321_467.0 / 600_000.0)).abs() < 1e-12);
}

#[test]
fn test_fractional_seconds() {
    let document = lines(&["HFDTE040624", "I013638TDS", &format!("{FIX}400")]);

    assert!(document.is_clean(), "{:?}", errors(&document));
    assert_eq!(
        document.fixes[0].time,
        Some(
            Utc.with_ymd_and_hms(2024, 6, 4, 15, 1, 44).unwrap() + TimeDelta::milliseconds(400)
        )
    );
}

#[test]
fn test_latest_declaration_replaces_table() {
    let document = lines(&[
        "HFDTE040624",
        "I023638FXA3940SIU",
        "I013638ENL",
        &format!("{FIX}00612"),
    ]);

    let additions = &document.fixes[0].additions;
    assert_eq!(additions.len(), 1);
    assert_eq!(additions["ENL"], 6);
}

#[test]
fn test_rejected_declaration_keeps_valid_triples() {
    let document = lines(&[
        "HFDTE040624",
        "I023638FXA4041SIU",
        &format!("{FIX}00612"),
    ]);

    assert_eq!(errors(&document), vec!["2: SIU: invalid start column"]);
    let additions = &document.fixes[0].additions;
    assert_eq!(additions.len(), 1);
    assert_eq!(additions["FXA"], 6);
}

#[test]
fn test_midnight_rollover() {
    let document = lines(&[
        "HFDTEDATE:040624,01",
        "B2359594708879N00832146EA0092900941",
        "B0000014708879N00832146EA0092900941",
    ]);

    assert!(document.is_clean());
    let times: Vec<_> = document.fixes.iter().map(|fix| fix.time).collect();
    assert_eq!(
        times,
        vec![
            Some(Utc.with_ymd_and_hms(2024, 6, 4, 23, 59, 59).unwrap()),
            Some(Utc.with_ymd_and_hms(2024, 6, 5, 0, 0, 1).unwrap()),
        ]
    );
}

#[test]
fn test_explicit_date_does_not_reset_watermark() {
    let document = lines(&[
        "HFDTE050624",
        "B2300004708879N00832146EA0092900941",
        "HFDTE040624",
        "B0100004708879N00832146EA0092900941",
    ]);

    assert!(document.is_clean());
    assert_eq!(
        document.fixes[1].time,
        Some(Utc.with_ymd_and_hms(2024, 6, 6, 1, 0, 0).unwrap())
    );
}

#[test]
fn test_fix_before_date() {
    let document = lines(&[FIX, "HFDTE040624", FIX]);

    assert_eq!(errors(&document), vec!["1: no date"]);
    assert_eq!(document.fixes.len(), 2);
    assert_eq!(document.fixes[0].time, None);
    assert_eq!(document.fixes[0].alt_gnss, 941);
    assert!(document.fixes[1].time.is_some());
}

#[test]
fn test_unknown_record_type() {
    let document = lines(&["X"]);

    assert_eq!(document.records, vec![None]);
    assert_eq!(errors(&document), vec!["1: X: unknown record type"]);
}

#[test]
fn test_empty_lines_are_skipped() {
    let document = parse(&b"\r\n\nX\r\n\n"[..]).unwrap();

    assert_eq!(document.records.len(), 1);
    assert_eq!(errors(&document), vec!["3: X: unknown record type"]);
}

#[test]
fn test_crlf_input() {
    let input = b"AXCTabc123\r\nHFDTEDATE:040624,01\r\r\nI023638FXA3940SIU\r\nB1501444708879N00832146EA009290094100612";
    let document = parse(&input[..]).unwrap();

    assert!(document.is_clean(), "{:?}", errors(&document));
    assert_eq!(document.records.len(), 4);
    assert_eq!(document.fixes[0].additions["SIU"], 12);
    assert_eq!(document.date(), NaiveDate::from_ymd_opt(2024, 6, 4));
}

#[test]
fn test_invalid_characters() {
    let strict = parse(&b"LXNA$*\n"[..]).unwrap();
    assert_eq!(
        errors(&strict),
        vec!["1: '$': invalid character\n'*': invalid character"]
    );
    assert_eq!(strict.records.len(), 1);
    assert!(strict.records[0].is_some());

    let options = ParseOptions::default().with_allow_invalid_chars(true);
    let lenient = parse_with(&b"LXNA$*\n"[..], &options).unwrap();
    assert!(lenient.is_clean());
}

#[test]
fn test_periodic_records() {
    let document = lines(&[
        "HFDTE040624",
        "J010812HDT",
        "K15014400090",
        "M010810ABC",
        "N150145123",
    ]);

    assert!(document.is_clean(), "{:?}", errors(&document));
    assert_eq!(document.periodic.len(), 1);
    assert_eq!(document.periodic[0].additions["HDT"], 90);
    assert_eq!(document.n_records.len(), 1);
    assert_eq!(document.n_records[0].additions["ABC"], 123);
    assert_eq!(
        document.n_records[0].time,
        Some(Utc.with_ymd_and_hms(2024, 6, 4, 15, 1, 45).unwrap())
    );
}

#[test]
fn test_task_declaration_then_waypoints() {
    let document = lines(&[
        "C040624150144040624000102task",
        "C4708879N00832146ETakeoff",
        "C040624150144040624000102task",
    ]);

    assert_eq!(errors(&document), vec!["3: invalid C record"]);
    let Some(Record::TaskDeclaration(task)) = &document.records[0] else {
        panic!("expected task declaration");
    };
    assert_eq!(task.task_number, 1);
    assert_eq!(task.turnpoint_count, 2);
    assert_eq!(task.text, "task");
    assert_eq!(
        task.declaration_time,
        NaiveDate::from_ymd_opt(2024, 6, 4).and_then(|d| d.and_hms_opt(15, 1, 44))
    );

    let Some(Record::Waypoint(waypoint)) = &document.records[1] else {
        panic!("expected waypoint");
    };
    assert_eq!(waypoint.text, "Takeoff");

    // Only the first C line can be a declaration.
    assert_eq!(document.records[2], None);
}

#[test]
fn test_lenient_fallbacks() {
    let document = lines(&[
        "HFDTE040624",
        "HXFTYFRTYPE:Brand",
        "E150144 pressed",
        "Lplain text",
        "LXCTsome text",
        "D20123",
    ]);

    assert!(document.is_clean(), "{:?}", errors(&document));
    let valid: Vec<bool> = document
        .records
        .iter()
        .map(|record| record.as_ref().is_some_and(Record::is_valid))
        .collect();
    assert_eq!(valid, vec![true, false, false, false, true, true]);
    assert_eq!(document.header_value("FTY"), Some("Brand"));

    let Some(Record::GpsQualifier(d)) = &document.records[5] else {
        panic!("expected GPS qualifier");
    };
    assert_eq!(d.qualifier, GpsQualifier::Dgps);
    assert_eq!(d.station_id, 123);
}

#[test]
fn test_latest_header_wins() {
    let document = lines(&["HFPLTPILOTINCHARGE:Alice", "HPPLTPILOT:Bob"]);

    let Some(Record::Header(header)) = document.header("PLT") else {
        panic!("expected header");
    };
    assert_eq!(header.source, Source::Pilot);
    assert_eq!(header.value, "Bob");
}

#[test]
fn test_manufacturer_records() {
    let document = lines(&["ALXVabc-FLIGHT:1", "AXCTabc-def"]);

    let ids: Vec<_> = document
        .records
        .iter()
        .filter_map(|record| match record {
            Some(Record::Manufacturer(a)) => {
                Some((a.unique_id.as_str(), a.additional_data.as_str()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![("abc", "FLIGHT:1"), ("abc-def", "")]);
    assert_eq!(
        document.manufacturer().map(|a| a.manufacturer_id.as_str()),
        Some("LXV")
    );
}

#[test]
fn test_manufacturer_approval() {
    let lxnav = manufacturer::lookup("LXV").unwrap();
    assert!(lxnav.approved());
    assert_eq!(lxnav.name, "LXNAV d.o.o.");

    let xc_tracer = manufacturer::lookup("XTR").unwrap();
    assert!(!xc_tracer.approved());
    assert!(!manufacturer::is_approved("XTR"));
    assert!(!manufacturer::is_approved("QQQ"));
}

#[test]
fn test_deterministic() {
    let input = "AXTR1234\nHFDTE040624\nI023638FXA3940SIU\nB1501444708879N00832146EA00929009410061\nX\n";

    let first = parse(input.as_bytes()).unwrap();
    let second = parse(input.as_bytes()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_serialize_document() {
    let document = lines(&["HFDTE040624", "I013638FXA", &format!("{FIX}006"), "X"]);
    let value = serde_json::to_value(&document).unwrap();

    assert_eq!(value["records"][0]["kind"], "date_header");
    assert_eq!(value["records"][2]["kind"], "fix");
    assert_eq!(value["records"][2]["additions"]["FXA"], 6);
    assert!(value["records"][3].is_null());
    assert_eq!(
        value["errors"][0],
        serde_json::json!({"line": 4, "causes": ["X: unknown record type"]})
    );
}

#[test]
fn test_document_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Document>();
}
