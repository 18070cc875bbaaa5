//! # obdm-matrix
//!
//! The pivot stage of the matrix pipeline: turns the complete flat
//! [`ParameterRecord`](obdm_signalset::ParameterRecord) collection into a
//! dense vehicles-by-column matrix plus the sorted column-key schema.
//!
//! Requires the full record collection up front; see [`transform`] for
//! why the pivot cannot run incrementally.

pub mod transform;

pub use transform::{
    concatenated_parameter_id, transform_matrix, ColumnKey, MatrixData, MatrixRow, SignalCell,
};
