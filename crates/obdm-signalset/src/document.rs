//! Typed model of a v3 signalset document.
//!
//! A signalset describes the ECU commands a vehicle answers and the
//! signals decodable from each response. The wire format uses the short
//! field names of the v3 schema (`hdr`, `eax`, `dbg`, `cmd`, `fmt`,
//! `bix`, `len`); unknown fields are ignored so documents can carry
//! transport-level keys (receive filters, rates) the pipeline does not
//! model.
//!
//! `cmd` is an ordered map from parameter-id to an opaque value. Only the
//! key set is semantically meaningful downstream, but declaration order
//! matters: it drives both record emission order and the concatenated
//! column identifiers. The workspace enables serde_json's
//! `preserve_order` feature so `serde_json::Map` retains it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DocumentError;
use crate::groups::SignalGroupRule;

/// One signalset document: an ordered list of commands plus optional
/// signal-group rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalsetDocument {
    /// ECU commands in declaration order.
    #[serde(default)]
    pub commands: Vec<Command>,
    /// Regex-based grouping rules, applied in declaration order.
    #[serde(default, rename = "signalGroups", skip_serializing_if = "Vec::is_empty")]
    pub signal_groups: Vec<SignalGroupRule>,
}

impl SignalsetDocument {
    /// Load a signalset document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Read`] if the file cannot be read and
    /// [`DocumentError::Parse`] if it is not a valid signalset document.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let raw = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A single ECU command: header, addressing, parameter-id map, and the
/// signals decodable from the response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Command {
    /// ECU address identifier. May be empty.
    #[serde(default)]
    pub hdr: String,
    /// Extended address, used by makes that address ECUs behind a gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eax: Option<String>,
    /// Debug-only command, excluded from production displays downstream.
    #[serde(default)]
    pub dbg: bool,
    /// Ordered parameter-id map. Values are opaque; only keys and their
    /// declaration order are used.
    #[serde(default)]
    pub cmd: Map<String, Value>,
    /// Signals in declaration order.
    #[serde(default)]
    pub signals: Vec<SignalDefinition>,
}

/// A single named signal extracted from a command response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalDefinition {
    /// Signal identifier, e.g. `TOYOTA_CAMRY_ENGINE_TEMP`.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Categorization hint, e.g. `Engine`.
    #[serde(default)]
    pub path: String,
    /// Suggested metric binding for consumers.
    #[serde(default, rename = "suggestedMetric")]
    pub suggested_metric: String,
    /// Formatting rules for decoding the raw bytes.
    #[serde(default)]
    pub fmt: FormatSpec,
}

/// Formatting rules for a signal: either a value map or a linear scaling
/// with optional clamping and bit-level addressing.
///
/// Numeric coefficients are kept as `serde_json::Number` so the scaling
/// description renders them exactly as written in the source document
/// (`2` stays `2`, `2.5` stays `2.5`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatSpec {
    /// Value-to-label mapping. When present, the linear fields are
    /// ignored for description purposes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Value>,
    /// Multiplicative coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mul: Option<serde_json::Number>,
    /// Divisor coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub div: Option<serde_json::Number>,
    /// Additive offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<serde_json::Number>,
    /// Lower clamp bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Number>,
    /// Upper clamp bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Number>,
    /// Engineering unit, e.g. `celsius`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Bit offset into the response payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bix: Option<u32>,
    /// Bit length of the raw value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub len: Option<u32>,
}

impl FormatSpec {
    /// Bit offset, defaulting to 0 when absent.
    pub fn bit_offset(&self) -> u32 {
        self.bix.unwrap_or(0)
    }

    /// Bit length, defaulting to 8 when absent.
    pub fn bit_length(&self) -> u32 {
        self.len.unwrap_or(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let doc: SignalsetDocument = serde_json::from_str(
            r#"{
                "commands": [{
                    "hdr": "7E0",
                    "cmd": {"01": "05"},
                    "signals": [{"id": "ENGINE_TEMP", "fmt": {"add": -40, "unit": "celsius"}}]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.commands.len(), 1);
        let command = &doc.commands[0];
        assert_eq!(command.hdr, "7E0");
        assert!(!command.dbg);
        assert_eq!(command.cmd.len(), 1);
        assert_eq!(command.signals[0].id, "ENGINE_TEMP");
        assert_eq!(command.signals[0].fmt.unit.as_deref(), Some("celsius"));
    }

    #[test]
    fn cmd_map_preserves_declaration_order() {
        let doc: SignalsetDocument = serde_json::from_str(
            r#"{"commands": [{"cmd": {"22": "F190", "01": "05", "09": "02"}, "signals": []}]}"#,
        )
        .unwrap();
        let keys: Vec<&String> = doc.commands[0].cmd.keys().collect();
        assert_eq!(keys, ["22", "01", "09"]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let doc: SignalsetDocument = serde_json::from_str(
            r#"{"commands": [{"hdr": "7E0", "rax": "7E8", "freq": 1, "cmd": {}, "signals": []}],
                "diagnosticLevel": "03"}"#,
        )
        .unwrap();
        assert_eq!(doc.commands[0].hdr, "7E0");
    }

    #[test]
    fn format_defaults() {
        let fmt = FormatSpec::default();
        assert_eq!(fmt.bit_offset(), 0);
        assert_eq!(fmt.bit_length(), 8);
    }

    #[test]
    fn extended_address_and_debug() {
        let doc: SignalsetDocument = serde_json::from_str(
            r#"{"commands": [{"hdr": "6F1", "eax": "12", "dbg": true, "cmd": {}, "signals": []}]}"#,
        )
        .unwrap();
        assert_eq!(doc.commands[0].eax.as_deref(), Some("12"));
        assert!(doc.commands[0].dbg);
    }

    #[test]
    fn missing_document_is_read_error() {
        let err = SignalsetDocument::from_path(Path::new("/nonexistent/default.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }
}
