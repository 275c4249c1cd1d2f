//! `igc` - A tolerant parser for IGC flight-recorder logs
//!
//! IGC files are the FAI's line-oriented format for glider and paraglider
//! flight logs. This library turns one into a typed [`Document`], recovering
//! from malformed lines instead of rejecting the file: every line that can be
//! decoded is kept, and every problem is reported with its line number.
//!
//! ```
//! let input = b"HFDTEDATE:040624,01\r\nI023638FXA3940SIU\r\nB1501444708879N00832146EA009290094100612\r\n";
//! let document = igc::parse(&input[..]).unwrap();
//!
//! assert!(document.is_clean());
//! assert_eq!(document.fixes[0].additions["SIU"], 12);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod grammar;
pub mod lines;
pub mod logging;
pub mod manufacturer;
pub mod parser;
pub mod record;
pub mod state;

pub use config::Config;
pub use document::Document;
pub use error::{Error, LineError, RecordError, Result};
pub use logging::init_logging;
pub use manufacturer::Manufacturer;
pub use parser::{parse, parse_lines, parse_with, ParseOptions, Parser};
pub use record::{Record, RecordAddition};
pub use state::ParserState;
