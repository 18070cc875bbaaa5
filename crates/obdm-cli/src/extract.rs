//! Extract subcommand: workspace of vehicle repositories to flat records.
//!
//! Walks every repository directory in the workspace, loads its
//! `signalsets/v3/default.json` plus any year-scoped variants, flattens
//! them into parameter records, annotates signal groups, and writes the
//! combined collection to `matrix_data.json`.
//!
//! A repository whose signalset is missing is skipped quietly; one whose
//! signalset fails to load is skipped with a warning. Neither aborts the
//! batch. An unwritable output directory is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use obdm_core::ModelYearRange;
use obdm_signalset::{
    annotate_records, parse_signalset, ParameterRecord, ParseOptions, SignalsetDocument,
};

/// Arguments for the extract subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Workspace directory holding the cloned vehicle repositories.
    #[arg(long, default_value = "workspace")]
    pub workspace: PathBuf,

    /// Output directory for the flat record collection.
    #[arg(long, default_value = "public/data")]
    pub output: PathBuf,

    /// Emit one record per signal instead of the historical
    /// parameter-id x signal cross-join.
    #[arg(long)]
    pub no_cross_join: bool,
}

/// Run extraction end to end: collect records and write `matrix_data.json`.
pub fn run_extract(args: &ExtractArgs) -> anyhow::Result<u8> {
    let options = ParseOptions {
        cross_join: !args.no_cross_join,
    };
    let records = collect_records(&args.workspace, &options)?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create output directory {}", args.output.display()))?;
    let path = args.output.join("matrix_data.json");
    let rendered = serde_json::to_string_pretty(&records)?;
    fs::write(&path, rendered)
        .with_context(|| format!("cannot write {}", path.display()))?;

    tracing::info!(
        records = records.len(),
        path = %path.display(),
        "wrote flat record collection"
    );
    Ok(0)
}

/// Collect parameter records from every repository in the workspace.
///
/// Repositories are visited in name order so repeated runs over the same
/// workspace produce the records in the same sequence.
pub fn collect_records(
    workspace: &Path,
    options: &ParseOptions,
) -> anyhow::Result<Vec<ParameterRecord>> {
    let mut repos: Vec<PathBuf> = fs::read_dir(workspace)
        .with_context(|| format!("cannot read workspace {}", workspace.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    repos.sort();

    let mut records = Vec::new();
    for repo in &repos {
        let Some(repo_name) = repo.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let (make, model) = split_make_model(repo_name);

        let v3 = repo.join("signalsets").join("v3");
        if !v3.is_dir() {
            tracing::debug!(repo = repo_name, "no signalsets, skipping");
            continue;
        }

        for (file, years) in signalset_files(&v3)? {
            match SignalsetDocument::from_path(&file) {
                Ok(doc) => {
                    let parsed = parse_signalset(&doc, &make, &model, years, options);
                    let annotated = annotate_records(parsed, &doc.signal_groups);
                    tracing::debug!(
                        repo = repo_name,
                        file = %file.display(),
                        records = annotated.len(),
                        "parsed signalset"
                    );
                    records.extend(annotated);
                }
                Err(error) => {
                    tracing::warn!(repo = repo_name, %error, "skipping unreadable signalset");
                }
            }
        }
    }
    Ok(records)
}

/// Enumerate the signalset files of one `signalsets/v3/` directory:
/// `default.json` (no year range) plus year-scoped variants, in name
/// order. Other files are ignored.
fn signalset_files(v3: &Path) -> anyhow::Result<Vec<(PathBuf, Option<ModelYearRange>)>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(v3)
        .with_context(|| format!("cannot read signalset directory {}", v3.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem == "default" {
            files.push((path, None));
        } else if let Some(years) = ModelYearRange::from_file_stem(stem) {
            files.push((path, Some(years)));
        }
    }
    Ok(files)
}

/// Derive (make, model) from a repository directory name: split on the
/// first `-`; a name with no `-` is a make with an empty model.
pub fn split_make_model(name: &str) -> (String, String) {
    match name.split_once('-') {
        Some((make, model)) => (make.to_string(), model.to_string()),
        None => (name.to_string(), String::new()),
    }
}
