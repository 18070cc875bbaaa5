//! # obdm-signalset
//!
//! Signalset document model and flattening. This crate owns the first two
//! stages of the matrix pipeline:
//!
//! - [`document`]: typed serde model of a v3 signalset file.
//! - [`parse`]: flattens a document into [`ParameterRecord`]s, one per
//!   (command, parameter-id, signal) triple, deriving the human-readable
//!   scaling description along the way.
//! - [`groups`]: annotates records with regex-based group memberships.
//!
//! Both stages are pure transformations over already-loaded documents;
//! the only I/O is [`SignalsetDocument::from_path`].

pub mod document;
pub mod error;
pub mod groups;
pub mod parse;

pub use document::{Command, FormatSpec, SignalDefinition, SignalsetDocument};
pub use error::DocumentError;
pub use groups::{annotate_records, GroupMembership, SignalGroupRule};
pub use parse::{parse_signalset, scaling_description, ParameterRecord, ParseOptions};
