//! Conversion entry point.
//!
//! Composes parse, transform and serialize. Failures never cross the
//! boundary as typed errors: [`Converter::convert`] turns them into a
//! single-line document starting with [`ERROR_PREFIX`].

use crate::aggregator::transform;
use crate::error::Result;
use crate::format::write_output;
use crate::parser::parse;
use crate::schema::Schema;
use log::{info, warn};

/// Marker that starts every error document.
pub const ERROR_PREFIX: &str = "ERROR:";

/// Stateless converter bound to one schema.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    schema: Schema,
}

impl Converter {
    /// Creates a converter for the default (version 1) layout.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: Schema) -> Self {
        Converter { schema }
    }

    /// Runs the full pipeline, returning the target document or the first error.
    ///
    /// No partial output is produced: any failing row discards the document.
    pub fn try_convert(&self, input: &[u8]) -> Result<Vec<u8>> {
        let records = parse(input, &self.schema)?;
        let rows = transform(&records)?;

        let mut output = Vec::new();
        write_output(&rows, &self.schema, &mut output)?;

        info!(
            "Converted {} records into {} rows ({} bytes)",
            records.len(),
            rows.len(),
            output.len()
        );
        Ok(output)
    }

    /// Runs the full pipeline, mapping any failure to an `ERROR:` document.
    pub fn convert(&self, input: &[u8]) -> Vec<u8> {
        match self.try_convert(input) {
            Ok(output) => output,
            Err(e) => {
                warn!("Conversion failed: {}", e);
                error_document(&e.to_string())
            }
        }
    }
}

/// Converts `input` with the default schema.
pub fn convert(input: &[u8]) -> Vec<u8> {
    Converter::new().convert(input)
}

/// Builds a one-line error document for `message`.
pub fn error_document(message: &str) -> Vec<u8> {
    let flat: String = message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("{} {}", ERROR_PREFIX, flat).into_bytes()
}

/// Returns `true` if `output` is an error document.
pub fn is_error(output: &[u8]) -> bool {
    output.starts_with(ERROR_PREFIX.as_bytes())
}
