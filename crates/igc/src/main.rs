//! `igcparse` - CLI for igc
//!
//! This binary parses IGC flight logs named on the command line and reports
//! their contents and errors.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use igc::cli::{CheckCommand, Cli, Command, ConfigCommand, DumpCommand, HeadersCommand};
use igc::config::OutputFormat;
use igc::manufacturer;
use igc::{init_logging, parse_with, Config, Document, Record};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration only for commands that use it
    let config = if cli.needs_config() {
        Config::load_from(cli.config.clone())?
    } else {
        Config::default()
    };

    match cli.command {
        Command::Check(check_cmd) => handle_check(&config, &check_cmd),
        Command::Dump(dump_cmd) => handle_dump(&config, &dump_cmd).map(|()| ExitCode::SUCCESS),
        Command::Headers(headers_cmd) => {
            handle_headers(&config, &headers_cmd).map(|()| ExitCode::SUCCESS)
        }
        Command::Manufacturers(manufacturers_cmd) => {
            handle_manufacturers(manufacturers_cmd.approved);
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(config_cmd) => {
            handle_config(&config, config_cmd).map(|()| ExitCode::SUCCESS)
        }
    }
}

/// Open a named file, or standard input for `-`.
fn open(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn read_document(config: &Config, path: &Path) -> anyhow::Result<Document> {
    let reader = open(path)?;
    parse_with(reader, &config.parse_options())
        .with_context(|| format!("failed to read {}", path.display()))
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<ExitCode> {
    let mut options = config.parse_options();
    if cmd.allow_invalid_chars {
        options.allow_invalid_chars = true;
    }

    let mut all_ok = true;
    for path in &cmd.files {
        let document = parse_with(open(path)?, &options)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path.display();
        if document.is_clean() {
            println!("{name}: ok");
            continue;
        }

        all_ok = false;
        let limit = config.max_errors().unwrap_or(usize::MAX);
        for line_error in document.errors.iter().take(limit) {
            for cause in line_error.causes() {
                println!("{name}:{}: {cause}", line_error.line);
            }
        }
        if document.errors.len() > limit {
            println!(
                "{name}: {} more lines with errors",
                document.errors.len() - limit
            );
        }
        info!(file = %name, errors = document.errors.len(), "Checked file");
    }

    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_dump(config: &Config, cmd: &DumpCommand) -> anyhow::Result<()> {
    let document = read_document(config, &cmd.file)?;
    match cmd.format.unwrap_or(config.output.format) {
        OutputFormat::Json => print_json(config, &document)?,
        OutputFormat::Plain => {
            for record in &document.records {
                match record {
                    Some(record) => println!("{}", describe(record)),
                    None => println!("-"),
                }
            }
            for line_error in &document.errors {
                eprintln!("{line_error}");
            }
        }
    }
    Ok(())
}

fn handle_headers(config: &Config, cmd: &HeadersCommand) -> anyhow::Result<()> {
    let document = read_document(config, &cmd.file)?;
    if cmd.json {
        let values: BTreeMap<&str, &str> = document
            .headers
            .iter()
            .map(|(tlc, record)| (tlc.as_str(), record.header_value().unwrap_or_default()))
            .collect();
        print_json(config, &values)?;
    } else {
        for (tlc, record) in &document.headers {
            println!("{tlc}  {}", record.header_value().unwrap_or_default());
        }
    }
    Ok(())
}

fn handle_manufacturers(approved_only: bool) {
    for manufacturer in manufacturer::all() {
        if approved_only && !manufacturer.approved() {
            continue;
        }
        println!(
            "{}  {}  {:<9}  {}",
            manufacturer.tlc,
            manufacturer.scc.unwrap_or('-'),
            if manufacturer.approved() {
                "approved"
            } else {
                "-"
            },
            manufacturer.name
        );
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Configuration:");
                println!();
                println!("[parser]");
                println!(
                    "  allow_invalid_chars: {}",
                    config.parser.allow_invalid_chars
                );
                println!();
                println!("[output]");
                println!("  format:     {:?}", config.output.format);
                println!("  pretty:     {}", config.output.pretty);
                println!("  max_errors: {}", config.output.max_errors);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            if path.exists() {
                Config::load_file(&path)?;
                println!("Configuration file is valid: {}", path.display());
            } else {
                println!(
                    "Configuration file not found: {} (using defaults)",
                    path.display()
                );
            }
        }
    }
    Ok(())
}

fn print_json(config: &Config, value: &impl serde::Serialize) -> anyhow::Result<()> {
    let json = if config.output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

/// One-line summary of a record.
fn describe(record: &Record) -> String {
    let letter = char::from(record.record_type());
    let time = || {
        record
            .time()
            .map_or_else(|| "-".to_string(), |time| time.to_rfc3339())
    };
    match record {
        Record::Manufacturer(a) => {
            format!("{letter} {} {} {}", a.manufacturer_id, a.unique_id, a.additional_data)
        }
        Record::Fix(fix) => format!(
            "{letter} {} {:.6} {:.6} {:?} {} {} {}",
            time(),
            fix.lat,
            fix.lon,
            fix.validity,
            fix.alt_barometric,
            fix.alt_gnss,
            additions(&fix.additions)
        ),
        Record::TaskDeclaration(task) => format!(
            "{letter} declared {} task {} turnpoints {} {}",
            task.declaration_time
                .map_or_else(|| "-".to_string(), |time| time.to_string()),
            task.task_number,
            task.turnpoint_count,
            task.text
        ),
        Record::Waypoint(waypoint) => format!(
            "{letter} {:.6} {:.6} {}",
            waypoint.lat, waypoint.lon, waypoint.text
        ),
        Record::GpsQualifier(d) => format!("{letter} {:?} {}", d.qualifier, d.station_id),
        Record::Event(event) => format!("{letter} {} {} {}", time(), event.tlc, event.text),
        Record::EventWithoutCode(event) => format!("{letter} {} {}", time(), event.text),
        Record::Satellites(f) => format!("{letter} {} {:?}", time(), f.satellite_ids),
        Record::Security(g) => format!("{letter} {}", g.text),
        Record::Header(_) | Record::DateHeader(_) | Record::HeaderWithInvalidSource(_) => format!(
            "{letter} {} {}",
            record.header_tlc().unwrap_or_default(),
            record.header_value().unwrap_or_default()
        ),
        Record::FixAdditions(declaration)
        | Record::PeriodicAdditions(declaration)
        | Record::NAdditions(declaration) => {
            let columns: Vec<String> = declaration
                .additions
                .iter()
                .map(|a| format!("{}={}-{}", a.tlc, a.start_column, a.finish_column))
                .collect();
            format!("{letter} {}", columns.join(" "))
        }
        Record::Periodic(periodic) | Record::NRecord(periodic) => {
            format!("{letter} {} {}", time(), additions(&periodic.additions))
        }
        Record::LogMessage(l) => format!("{letter} {} {}", l.tag, l.text),
        Record::LogMessageWithoutTag(l) => format!("{letter} {}", l.text),
    }
}

fn additions(additions: &igc::record::Additions) -> String {
    additions
        .iter()
        .map(|(tlc, value)| format!("{tlc}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
