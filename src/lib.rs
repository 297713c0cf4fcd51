//! # Iryouhi Converter
//!
//! Converts a medical expense notification export into the row format
//! accepted by the tax return's medical deduction CSV paste.
//!
//! ## Design Principles
//!
//! - **Exact money**: amounts are `u64` minor units, overflow is an error
//! - **Deterministic output**: rows follow first-seen group order
//! - **All or nothing**: any bad row rejects the whole document
//! - **No I/O**: the engine maps input bytes to output bytes; failures
//!   become a single line starting with `ERROR:`
//! - **Explicit buffer protocol**: [`Arena`] exchanges regions with a host
//!   that cannot address Rust memory directly
//!
//! ## Example
//!
//! ```
//! use iryouhi_converter::Converter;
//!
//! let csv = "recipient_name,provider_name,category,amount_paid,amount_refunded,period\n\
//!            A,ClinicX,medical,1000,200,2023-04\n\
//!            A,ClinicX,medical,500,0,2023-05\n";
//! let output = Converter::new().convert(csv.as_bytes());
//! assert_eq!(output, b"A,ClinicX,medical,1500,200,05/01/2023\n");
//! ```

pub mod aggregator;
pub mod arena;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod format;
pub mod money;
pub mod parser;
pub mod record;
pub mod schema;

pub use aggregator::{transform, Aggregator};
pub use arena::Arena;
pub use engine::{is_error, Converter, ERROR_PREFIX};
pub use error::{CliError, ConvertError, ParseError, Result, SchemaError, TransformError};
pub use format::{line_count, write_output, write_source_document};
pub use money::Amount;
pub use parser::parse;
pub use record::{AggregatedRecord, Category, GroupKey, InputRecord, YearMonth};
pub use schema::{CategoryLabels, Schema};
