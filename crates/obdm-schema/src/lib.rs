//! # obdm-schema
//!
//! JSON Schema validation of the flat parameter record collection. The
//! schema is embedded in the crate, so consumers validate with a single
//! call and no filesystem or network access.

pub mod validate;

pub use validate::{validate_records, SchemaValidationError, ValidationViolations, Violation};
