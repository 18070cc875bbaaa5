//! Schema validation of the flat record collection.
//!
//! Validation is advisory: the caller that owns output policy decides
//! what a failure means. The pipeline's policy is to log violations and
//! fall back to emitting the unvalidated-but-canonicalized output, so
//! a schema drift degrades auditability rather than availability.
//!
//! The schema ships embedded in the crate; there is no directory walk or
//! `$ref` resolution across files, so validation never touches the
//! network or the filesystem.

use std::fmt;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// The embedded schema for the flat parameter record collection.
pub const MATRIX_DATA_SCHEMA: &str = include_str!("../schemas/matrix_data.schema.json");

const SCHEMA_NAME: &str = "matrix_data.schema.json";

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The record collection did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The embedded schema could not be parsed or compiled.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// All violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Validate a serialized record collection against the embedded schema.
///
/// # Errors
///
/// Returns [`SchemaValidationError::ValidationFailed`] with every
/// violation when the instance does not conform, or
/// [`SchemaValidationError::SchemaLoadError`] if the embedded schema
/// itself is broken.
pub fn validate_records(records: &Value) -> Result<(), SchemaValidationError> {
    let validator = build_validator()?;
    let violations: Vec<Violation> = validator
        .iter_errors(records)
        .map(|error| Violation {
            instance_path: error.instance_path.to_string(),
            message: error.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaValidationError::ValidationFailed {
            schema_name: SCHEMA_NAME.to_string(),
            violations: ValidationViolations { violations },
        })
    }
}

fn build_validator() -> Result<Validator, SchemaValidationError> {
    let schema: Value =
        serde_json::from_str(MATRIX_DATA_SCHEMA).map_err(|e| SchemaValidationError::SchemaLoadError {
            schema_name: SCHEMA_NAME.to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
    jsonschema::validator_for(&schema).map_err(|e| SchemaValidationError::SchemaLoadError {
        schema_name: SCHEMA_NAME.to_string(),
        reason: e.to_string(),
    })
}
