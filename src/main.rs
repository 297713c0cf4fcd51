//! Iryouhi Converter CLI
//!
//! Reads a medical expense notification CSV and writes the converted rows
//! to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- [--schema schema.json] notice.csv > converted.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `info` to control logging verbosity
//! - `IRYOUHI_SCHEMA`: Path to a schema JSON used when `--schema` is absent

use iryouhi_converter::{line_count, CliError, Converter, Schema, ERROR_PREFIX};
use log::info;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

const SCHEMA_ENV: &str = "IRYOUHI_SCHEMA";

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut schema_path = env::var(SCHEMA_ENV).ok();
    let mut input_path = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--schema" {
            schema_path = Some(iter.next().ok_or(CliError::MissingArgument)?);
        } else {
            input_path = Some(arg);
        }
    }
    let input_path = input_path.ok_or(CliError::MissingArgument)?;

    let schema = match schema_path {
        Some(path) => {
            info!("Loading schema from {}", path);
            Schema::from_json(&fs::read_to_string(path)?)?
        }
        None => Schema::default(),
    };

    let input = fs::read(&input_path)?;
    let output = Converter::with_schema(schema).convert(&input);
    let text = String::from_utf8_lossy(&output);

    if let Some(message) = text.strip_prefix(ERROR_PREFIX) {
        return Err(CliError::Conversion(message.trim().to_string()));
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(&output)?;
    handle.flush()?;

    info!("Converted {} rows from {}", line_count(&text), input_path);
    Ok(())
}
