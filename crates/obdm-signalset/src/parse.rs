//! Flattening signalset documents into parameter records.
//!
//! One record is emitted per (command, parameter-id, signal) triple, in
//! declaration order on all three axes. A command with N parameter-ids
//! and M signals therefore yields N x M records, each retaining the full
//! original `cmd` map. The parameter-id value never disambiguates
//! signals; downstream pivoting re-derives column identity from the
//! retained map, so records from one command always land in one column.
//!
//! The N x M cross-join reproduces the historical flattening exactly.
//! [`ParseOptions::cross_join`] turns it off for consumers that prefer a
//! one-record-per-signal model; the default keeps compatibility.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use obdm_core::ModelYearRange;

use crate::document::{FormatSpec, SignalsetDocument};
use crate::groups::GroupMembership;

/// Options controlling record emission.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Emit one record per (parameter-id, signal) pair. When disabled,
    /// each signal yields a single record whose `pid` is the
    /// concatenation of the command's parameter-id keys.
    pub cross_join: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { cross_join: true }
    }
}

/// One normalized parameter record: the flat output schema of the
/// pipeline, one JSON object per record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterRecord {
    /// ECU header of the owning command.
    pub hdr: String,
    /// Extended address of the owning command, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eax: Option<String>,
    /// The parameter-id this record was emitted for.
    pub pid: String,
    /// The owning command's full parameter-id map, retained for column
    /// derivation.
    pub cmd: Map<String, Value>,
    /// Signal identifier.
    pub id: String,
    /// Human-readable signal name.
    pub name: String,
    /// Engineering unit.
    pub unit: String,
    /// Suggested metric binding.
    #[serde(rename = "suggestedMetric")]
    pub suggested_metric: String,
    /// Human-readable scaling description derived from the format spec.
    pub scaling: String,
    /// Categorization path.
    pub path: String,
    /// Debug flag of the owning command.
    pub dbg: bool,
    /// Bit offset into the response payload.
    pub bix: u32,
    /// Bit length of the raw value.
    pub len: u32,
    /// Vehicle make.
    pub make: String,
    /// Vehicle model.
    pub model: String,
    /// Model-year range, present only for year-scoped signalset variants.
    #[serde(
        default,
        rename = "modelYears",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_years: Option<ModelYearRange>,
    /// Group memberships, populated by the annotator. Empty when no rule
    /// matched (or none were defined).
    #[serde(default, rename = "signalGroups")]
    pub signal_groups: Vec<GroupMembership>,
}

/// Derive the human-readable scaling description from a format spec.
///
/// Pure: structurally equal specs always yield the identical string.
///
/// - A `map` wins outright: `Mapped values: <compact JSON>`. The linear
///   fields are ignored entirely.
/// - Otherwise `raw` followed by `*mul`, `/div`, `+add` in that fixed
///   order (space-joined, no space after `raw`), then
///   ` clamped to [min, max]` with whichever bounds are present.
pub fn scaling_description(fmt: &FormatSpec) -> String {
    if let Some(map) = &fmt.map {
        let rendered = serde_json::to_string(map).unwrap_or_default();
        return format!("Mapped values: {rendered}");
    }

    let mut components = Vec::new();
    if let Some(mul) = &fmt.mul {
        components.push(format!("*{mul}"));
    }
    if let Some(div) = &fmt.div {
        components.push(format!("/{div}"));
    }
    if let Some(add) = &fmt.add {
        components.push(format!("+{add}"));
    }
    let mut scaling = format!("raw{}", components.join(" "));

    if fmt.min.is_some() || fmt.max.is_some() {
        let mut clamping = Vec::new();
        if let Some(min) = &fmt.min {
            clamping.push(min.to_string());
        }
        if let Some(max) = &fmt.max {
            clamping.push(max.to_string());
        }
        scaling.push_str(&format!(" clamped to [{}]", clamping.join(", ")));
    }
    scaling
}

/// Flatten one signalset document into parameter records.
///
/// Commands, their parameter-ids, and their signals are all walked in
/// declaration order. `model_years` is attached verbatim to every
/// emitted record; it comes from the source file name, not the document.
pub fn parse_signalset(
    doc: &SignalsetDocument,
    make: &str,
    model: &str,
    model_years: Option<ModelYearRange>,
    options: &ParseOptions,
) -> Vec<ParameterRecord> {
    let mut records = Vec::new();
    for command in &doc.commands {
        if options.cross_join {
            for pid in command.cmd.keys() {
                for signal in &command.signals {
                    records.push(build_record(
                        command, pid, signal, make, model, model_years,
                    ));
                }
            }
        } else {
            let joined: String = command.cmd.keys().map(String::as_str).collect();
            for signal in &command.signals {
                records.push(build_record(
                    command, &joined, signal, make, model, model_years,
                ));
            }
        }
    }
    records
}

fn build_record(
    command: &crate::document::Command,
    pid: &str,
    signal: &crate::document::SignalDefinition,
    make: &str,
    model: &str,
    model_years: Option<ModelYearRange>,
) -> ParameterRecord {
    let fmt = &signal.fmt;
    ParameterRecord {
        hdr: command.hdr.clone(),
        eax: command.eax.clone(),
        pid: pid.to_string(),
        cmd: command.cmd.clone(),
        id: signal.id.clone(),
        name: signal.name.clone(),
        unit: fmt.unit.clone().unwrap_or_default(),
        suggested_metric: signal.suggested_metric.clone(),
        scaling: scaling_description(fmt),
        path: signal.path.clone(),
        dbg: command.dbg,
        bix: fmt.bit_offset(),
        len: fmt.bit_length(),
        make: make.to_string(),
        model: model.to_string(),
        model_years,
        signal_groups: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> SignalsetDocument {
        serde_json::from_str(json).unwrap()
    }

    fn fmt(json: &str) -> FormatSpec {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn cross_join_emits_n_times_m_records() {
        let doc = doc(r#"{"commands": [{
            "hdr": "7E0",
            "cmd": {"01": "05", "22": "F190"},
            "signals": [
                {"id": "A", "fmt": {}},
                {"id": "B", "fmt": {}},
                {"id": "C", "fmt": {}}
            ]
        }]}"#);
        let records = parse_signalset(&doc, "Toyota", "Camry", None, &ParseOptions::default());
        assert_eq!(records.len(), 6);
        // Outer loop is parameter-ids in declared order, inner loop signals.
        let pairs: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.pid.as_str(), r.id.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("01", "A"),
                ("01", "B"),
                ("01", "C"),
                ("22", "A"),
                ("22", "B"),
                ("22", "C"),
            ]
        );
        // Every record retains the full parameter-id map.
        for record in &records {
            assert_eq!(record.cmd.len(), 2);
        }
    }

    #[test]
    fn cross_join_disabled_emits_one_record_per_signal() {
        let doc = doc(r#"{"commands": [{
            "hdr": "7E0",
            "cmd": {"01": "05", "22": "F190"},
            "signals": [{"id": "A", "fmt": {}}, {"id": "B", "fmt": {}}]
        }]}"#);
        let options = ParseOptions { cross_join: false };
        let records = parse_signalset(&doc, "Toyota", "Camry", None, &options);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pid, "0122");
    }

    #[test]
    fn command_without_parameter_ids_emits_nothing() {
        let doc = doc(r#"{"commands": [{"hdr": "7E0", "cmd": {}, "signals": [{"id": "A"}]}]}"#);
        let records = parse_signalset(&doc, "Make", "Model", None, &ParseOptions::default());
        assert!(records.is_empty());
    }

    #[test]
    fn record_carries_provenance_and_defaults() {
        let doc = doc(r#"{"commands": [{
            "hdr": "7E0",
            "cmd": {"0105": 1},
            "signals": [{"id": "ENGINE_TEMP", "fmt": {"mul": 1, "add": -40, "unit": "celsius"}}]
        }]}"#);
        let years = ModelYearRange::new(2015, 2019);
        let records =
            parse_signalset(&doc, "Toyota", "Camry", Some(years), &ParseOptions::default());
        let record = &records[0];
        assert_eq!(record.make, "Toyota");
        assert_eq!(record.model, "Camry");
        assert_eq!(record.model_years, Some(years));
        assert_eq!(record.unit, "celsius");
        assert!(!record.dbg);
        assert_eq!(record.bix, 0);
        assert_eq!(record.len, 8);
        assert!(record.signal_groups.is_empty());
    }

    #[test]
    fn scaling_fixed_term_order() {
        assert_eq!(
            scaling_description(&fmt(r#"{"mul": 2, "add": 5, "min": 0}"#)),
            "raw*2 +5 clamped to [0]"
        );
        assert_eq!(
            scaling_description(&fmt(r#"{"mul": 2, "div": 3, "add": 5}"#)),
            "raw*2 /3 +5"
        );
        assert_eq!(scaling_description(&fmt(r#"{}"#)), "raw");
    }

    #[test]
    fn scaling_clamp_bounds() {
        assert_eq!(
            scaling_description(&fmt(r#"{"min": 0, "max": 255}"#)),
            "raw clamped to [0, 255]"
        );
        assert_eq!(
            scaling_description(&fmt(r#"{"max": 100}"#)),
            "raw clamped to [100]"
        );
    }

    #[test]
    fn scaling_preserves_numeric_literals() {
        assert_eq!(
            scaling_description(&fmt(r#"{"mul": 0.25, "add": -40}"#)),
            "raw*0.25 +-40"
        );
        // An integer-valued coefficient written as an integer stays one.
        assert_eq!(scaling_description(&fmt(r#"{"div": 4}"#)), "raw/4");
    }

    #[test]
    fn map_wins_over_linear_fields() {
        let spec = fmt(r#"{"map": {"0": "Off", "1": "On"}, "mul": 2, "min": 0}"#);
        let scaling = scaling_description(&spec);
        assert_eq!(scaling, r#"Mapped values: {"0":"Off","1":"On"}"#);
    }

    #[test]
    fn scaling_is_pure() {
        let spec = fmt(r#"{"mul": 2, "add": 5, "min": 0}"#);
        assert_eq!(scaling_description(&spec), scaling_description(&spec.clone()));
    }

    #[test]
    fn multiple_commands_emit_in_document_order() {
        let doc = doc(r#"{"commands": [
            {"hdr": "7E0", "cmd": {"01": "05"}, "signals": [{"id": "FIRST"}]},
            {"hdr": "7E1", "cmd": {"01": "0C"}, "signals": [{"id": "SECOND"}]}
        ]}"#);
        let records = parse_signalset(&doc, "Make", "Model", None, &ParseOptions::default());
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["FIRST", "SECOND"]);
    }
}
