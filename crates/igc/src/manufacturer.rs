//! Flight recorder manufacturer registry.
//!
//! IGC-approved manufacturers are assigned a three-letter code (and usually a
//! single-character code) by the FAI. Unofficial loggers conventionally use
//! codes starting with `X`; a few of the common ones are listed here too so
//! that their names can be displayed.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Serialize;

/// A flight recorder manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Manufacturer {
    /// Three-letter code.
    pub tlc: &'static str,
    /// Single-character code, if one was assigned.
    pub scc: Option<char>,
    /// Display name.
    pub name: &'static str,
}

impl Manufacturer {
    const fn new(tlc: &'static str, scc: Option<char>, name: &'static str) -> Self {
        Self { tlc, scc, name }
    }

    /// Check if this manufacturer is IGC-approved.
    ///
    /// Codes starting with `X` are reserved for non-approved recorders.
    #[must_use]
    pub fn approved(&self) -> bool {
        !self.tlc.starts_with('X')
    }
}

/// Manufacturers with IGC approval.
pub static APPROVED_MANUFACTURERS: &[Manufacturer] = &[
    Manufacturer::new("ACT", Some('I'), "Aircotec"),
    Manufacturer::new("AVX", None, "Avionix"),
    Manufacturer::new("CAM", Some('C'), "Cambridge Aero Instruments"),
    Manufacturer::new("CNI", None, "ClearNav Instruments"),
    Manufacturer::new("DSX", Some('D'), "Data Swan/DSX"),
    Manufacturer::new("EWA", Some('E'), "EW Avionics"),
    Manufacturer::new("FIL", Some('F'), "Filser"),
    Manufacturer::new("FLA", Some('G'), "Flarm (Flight Alarm)"),
    Manufacturer::new("FLY", None, "Flytech"),
    Manufacturer::new("GCS", Some('A'), "Garrecht"),
    Manufacturer::new("IMI", Some('M'), "IMI Gliding Equipment"),
    Manufacturer::new("LGS", None, "Logstream"),
    Manufacturer::new("LXN", Some('L'), "LX Navigation"),
    Manufacturer::new("LXV", Some('V'), "LXNAV d.o.o."),
    Manufacturer::new("NAV", None, "Naviter"),
    Manufacturer::new("NTE", Some('N'), "New Technologies s.r.l."),
    Manufacturer::new("NKL", Some('K'), "Nielsen Kellerman"),
    Manufacturer::new("PES", Some('P'), "Peschges"),
    Manufacturer::new("PFE", None, "PressFinish Electronics"),
    Manufacturer::new("PRT", Some('R'), "Print Technik"),
    Manufacturer::new("RCE", None, "RC Electronics"),
    Manufacturer::new("SCH", Some('H'), "Scheffel"),
    Manufacturer::new("SDI", Some('S'), "Streamline Data Instruments"),
    Manufacturer::new("TRI", Some('T'), "Triadis Engineering GmbH"),
    Manufacturer::new("ZAN", Some('Z'), "Zander"),
];

/// Commonly seen loggers without IGC approval.
pub static NON_APPROVED_MANUFACTURERS: &[Manufacturer] = &[
    Manufacturer::new("XAH", Some('X'), "Ascent"),
    Manufacturer::new("XBM", Some('X'), "Burnair"),
    Manufacturer::new("XCM", Some('X'), "Naviter"),
    Manufacturer::new("XCS", Some('X'), "XCSoar"),
    Manufacturer::new("XCT", Some('X'), "XC Track"),
    Manufacturer::new("XGD", Some('X'), "GpsDump"),
    Manufacturer::new("XFH", Some('X'), "Flyskyhy"),
    Manufacturer::new("XFL", Some('X'), "FlyMe"),
    Manufacturer::new("XFM", Some('X'), "Flymaster"),
    Manufacturer::new("XLK", Some('X'), "LK8000"),
    Manufacturer::new("XNA", Some('X'), "Naviter"),
    Manufacturer::new("XSD", Some('X'), "Stodeus"),
    Manufacturer::new("XSE", Some('X'), "Syride"),
    Manufacturer::new("XSR", Some('X'), "Syride"),
    Manufacturer::new("XSX", Some('X'), "Skytraxx"),
    Manufacturer::new("XTR", Some('X'), "XC Tracer"),
    Manufacturer::new("XTT", Some('X'), "LiveTrack24"),
    Manufacturer::new("XVB", Some('X'), "VairBration"),
];

static BY_TLC: LazyLock<BTreeMap<&'static str, &'static Manufacturer>> = LazyLock::new(|| {
    APPROVED_MANUFACTURERS
        .iter()
        .chain(NON_APPROVED_MANUFACTURERS)
        .map(|manufacturer| (manufacturer.tlc, manufacturer))
        .collect()
});

/// Look up a manufacturer by three-letter code.
#[must_use]
pub fn lookup(tlc: &str) -> Option<&'static Manufacturer> {
    BY_TLC.get(tlc).copied()
}

/// Check if `tlc` belongs to an IGC-approved manufacturer.
#[must_use]
pub fn is_approved(tlc: &str) -> bool {
    lookup(tlc).is_some_and(Manufacturer::approved)
}

/// All known manufacturers, approved first.
pub fn all() -> impl Iterator<Item = &'static Manufacturer> {
    APPROVED_MANUFACTURERS
        .iter()
        .chain(NON_APPROVED_MANUFACTURERS)
}
