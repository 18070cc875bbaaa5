//! Matrix subcommand: flat records to pivoted, canonical output.
//!
//! Reads the flat record collection, validates it against the embedded
//! schema, pivots it into the coverage matrix, and writes the canonical
//! serialized form to `matrix.json`. The SHA-256 digest of the canonical
//! bytes is logged so the orchestration layer can compare it against the
//! previous run.
//!
//! Schema violations are logged and do not stop the run: an
//! out-of-shape-but-canonical output is more useful downstream than no
//! output at all.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use obdm_core::{sha256_digest, CanonicalBytes};
use obdm_matrix::transform_matrix;
use obdm_schema::validate_records;
use obdm_signalset::ParameterRecord;

/// Arguments for the matrix subcommand.
#[derive(Args, Debug)]
pub struct MatrixArgs {
    /// Flat record collection produced by the extract subcommand.
    #[arg(long, default_value = "public/data/matrix_data.json")]
    pub input: PathBuf,

    /// Output directory for the pivoted matrix.
    #[arg(long, default_value = "public/data")]
    pub output: PathBuf,
}

/// Run the pivot: load records, validate, transform, canonicalize, write.
pub fn run_matrix(args: &MatrixArgs) -> anyhow::Result<u8> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let records: Vec<ParameterRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("cannot parse {}", args.input.display()))?;

    let flat = serde_json::to_value(&records)?;
    if let Err(error) = validate_records(&flat) {
        tracing::warn!(%error, "schema validation failed; emitting unvalidated output");
    }

    let matrix = transform_matrix(&records);
    let bytes = CanonicalBytes::new(&matrix)?;
    let digest = sha256_digest(&bytes);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create output directory {}", args.output.display()))?;
    let path = args.output.join("matrix.json");
    fs::write(&path, bytes.as_bytes())
        .with_context(|| format!("cannot write {}", path.display()))?;

    tracing::info!(
        rows = matrix.rows.len(),
        columns = matrix.column_keys.len(),
        %digest,
        path = %path.display(),
        "wrote pivoted matrix"
    );
    Ok(0)
}
