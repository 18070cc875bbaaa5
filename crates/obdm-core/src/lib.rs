//! # obdm-core
//!
//! Foundational types for the signalset matrix pipeline. Every other crate
//! in the workspace depends on `obdm-core`; it depends on nothing internal.
//!
//! - [`canonical`] is the sole construction path for the deterministic
//!   bytes the pipeline emits: deep-sorted value trees serialized per
//!   RFC 8785.
//! - [`digest`] computes SHA-256 content digests, accepting only
//!   [`CanonicalBytes`] so no digest can bypass canonicalization.
//! - [`year`] parses the model-year ranges encoded in signalset file
//!   names.
//!
//! Crate policy: no `unsafe`, no `panic!()` or `.unwrap()` outside tests,
//! all public types derive `Debug` and `Clone` and implement
//! `Serialize`/`Deserialize` where they cross a serialization boundary.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod year;

pub use canonical::{canonicalize_value, CanonicalBytes};
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::CanonicalizationError;
pub use year::ModelYearRange;
