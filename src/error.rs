//! Error types for the converter.

use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors raised while decoding and validating the source document.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Input is not valid UTF-8
    #[error("input is not valid UTF-8 (invalid byte at offset {offset})")]
    Encoding { offset: usize },

    /// Header row does not match the configured signature
    #[error("header mismatch: expected \"{expected}\", found \"{found}\"")]
    SchemaMismatch { expected: String, found: String },

    /// Data row has the wrong number of fields
    #[error("malformed row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A field could not be interpreted
    #[error("invalid {field} at line {line}: \"{value}\"")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },

    /// Reader-level CSV error not covered above
    #[error("CSV error at line {line}: {message}")]
    Csv { line: u64, message: String },
}

/// Errors raised while aggregating parsed records.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A group total no longer fits the accumulator
    #[error("amount overflow while totalling {key}")]
    Overflow { key: String },
}

/// Any failure of a single conversion call.
///
/// The `Display` output is the text placed after the `ERROR:` marker.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Writing the output document failed
    #[error("failed to write output: {0}")]
    Output(#[from] csv::Error),
}

/// Errors in a schema configuration document.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{table} must have exactly {expected} columns, found {found}")]
    ColumnCount {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("category label for {category} must not be empty")]
    EmptyLabel { category: &'static str },

    #[error("input category label \"{label}\" is used for more than one category")]
    DuplicateLabel { label: String },
}

/// Errors surfaced by the command-line host.
#[derive(Error, Debug)]
pub enum CliError {
    /// Failed to open or read a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema file could not be loaded
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: iryouhi-converter [--schema <schema.json>] <input.csv>")]
    MissingArgument,

    /// Conversion produced an `ERROR:` document
    #[error("{0}")]
    Conversion(String),
}
