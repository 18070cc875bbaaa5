//! Pivoting parameter records into the coverage matrix.
//!
//! The transform needs a global view: both the column-key set and the
//! row-key set span every vehicle, so it must run once over the complete
//! record collection, never incrementally per vehicle.
//!
//! The output is a dense matrix of lists: one row per (make, model) with
//! a field for every column key, holding the matching signal cells or an
//! empty list. The renderer displays each intersection as a clickable
//! cell, so handing it a sparse row-per-record shape would force it to
//! re-pivot client-side.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use obdm_signalset::ParameterRecord;

/// A column identity: ECU header plus the concatenated parameter-id map
/// of the owning command. Serialized as a `[header, parameterId]` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ColumnKey {
    /// ECU header.
    pub hdr: String,
    /// Concatenated `key+value` pairs of the command's parameter-id map,
    /// in declaration order.
    pub parameter_id: String,
}

impl ColumnKey {
    /// The `<hdr>_<parameterId>` field label used in matrix rows.
    pub fn label(&self) -> String {
        format!("{}_{}", self.hdr, self.parameter_id)
    }
}

impl From<(String, String)> for ColumnKey {
    fn from((hdr, parameter_id): (String, String)) -> Self {
        Self { hdr, parameter_id }
    }
}

impl From<ColumnKey> for (String, String) {
    fn from(key: ColumnKey) -> (String, String) {
        (key.hdr, key.parameter_id)
    }
}

/// Projection of a parameter record displayed in a matrix cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCell {
    /// Signal identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Engineering unit.
    pub unit: String,
    /// Suggested metric binding.
    #[serde(rename = "suggestedMetric")]
    pub suggested_metric: String,
    /// Scaling description.
    pub scaling: String,
    /// Categorization path.
    pub path: String,
}

impl From<&ParameterRecord> for SignalCell {
    fn from(record: &ParameterRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            unit: record.unit.clone(),
            suggested_metric: record.suggested_metric.clone(),
            scaling: record.scaling.clone(),
            path: record.path.clone(),
        }
    }
}

/// One matrix row: a vehicle plus a field per column key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixRow {
    /// Vehicle make.
    pub make: String,
    /// Vehicle model.
    pub model: String,
    /// Cells keyed by `<hdr>_<parameterId>` label. Every column key in
    /// the matrix has an entry; vehicles without matching records get an
    /// empty list, not an absent field.
    #[serde(flatten)]
    pub columns: BTreeMap<String, Vec<SignalCell>>,
}

/// The pivoted matrix: sorted rows plus the vehicle-independent column
/// schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixData {
    /// One row per distinct (make, model), sorted ascending.
    pub rows: Vec<MatrixRow>,
    /// Distinct column keys, sorted ascending by (header, parameter-id).
    #[serde(rename = "columnKeys")]
    pub column_keys: Vec<ColumnKey>,
}

/// Concatenate a command's parameter-id map into a single column
/// identifier: every `key+value` pair in declaration order.
///
/// This intentionally uses the record's full retained map, not the single
/// parameter-id the record was emitted for, so all signals of one command
/// share one column.
pub fn concatenated_parameter_id(cmd: &Map<String, Value>) -> String {
    cmd.iter()
        .map(|(k, v)| format!("{k}{}", value_literal(v)))
        .collect()
}

/// Render an opaque parameter-id value for concatenation. Strings render
/// bare (no quotes); everything else uses its JSON rendering.
fn value_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pivot the complete record collection into matrix rows and column keys.
pub fn transform_matrix(records: &[ParameterRecord]) -> MatrixData {
    let mut combos: BTreeSet<ColumnKey> = BTreeSet::new();
    let mut vehicles: BTreeSet<(String, String)> = BTreeSet::new();
    for record in records {
        combos.insert(ColumnKey {
            hdr: record.hdr.clone(),
            parameter_id: concatenated_parameter_id(&record.cmd),
        });
        vehicles.insert((record.make.clone(), record.model.clone()));
    }

    // Cell lists keep record encounter order within each vehicle+column.
    let mut lookup: BTreeMap<(String, String), BTreeMap<ColumnKey, Vec<SignalCell>>> =
        BTreeMap::new();
    for record in records {
        let vehicle = (record.make.clone(), record.model.clone());
        let key = ColumnKey {
            hdr: record.hdr.clone(),
            parameter_id: concatenated_parameter_id(&record.cmd),
        };
        lookup
            .entry(vehicle)
            .or_default()
            .entry(key)
            .or_default()
            .push(SignalCell::from(record));
    }

    let rows = vehicles
        .iter()
        .map(|(make, model)| {
            let by_column = lookup.get(&(make.clone(), model.clone()));
            let columns = combos
                .iter()
                .map(|key| {
                    let cells = by_column
                        .and_then(|m| m.get(key))
                        .cloned()
                        .unwrap_or_default();
                    (key.label(), cells)
                })
                .collect();
            MatrixRow {
                make: make.clone(),
                model: model.clone(),
                columns,
            }
        })
        .collect();

    MatrixData {
        rows,
        column_keys: combos.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obdm_signalset::{parse_signalset, ParseOptions, SignalsetDocument};

    fn vehicle_records(make: &str, model: &str, doc_json: serde_json::Value) -> Vec<ParameterRecord> {
        let doc: SignalsetDocument = serde_json::from_value(doc_json).unwrap();
        parse_signalset(&doc, make, model, None, &ParseOptions::default())
    }

    #[test]
    fn concatenates_full_parameter_id_map() {
        let doc = vehicle_records(
            "Make",
            "Model",
            serde_json::json!({"commands": [{
                "hdr": "7E0",
                "cmd": {"22": "F190", "01": "05"},
                "signals": [{"id": "A"}]
            }]}),
        );
        assert_eq!(concatenated_parameter_id(&doc[0].cmd), "22F1900105");
    }

    #[test]
    fn non_string_values_use_json_rendering() {
        let doc = vehicle_records(
            "Make",
            "Model",
            serde_json::json!({"commands": [{
                "hdr": "7E0",
                "cmd": {"0105": 1},
                "signals": [{"id": "A"}]
            }]}),
        );
        assert_eq!(concatenated_parameter_id(&doc[0].cmd), "01051");
    }

    #[test]
    fn rows_and_columns_are_sorted() {
        let mut records = vehicle_records(
            "B",
            "Y",
            serde_json::json!({"commands": [
                {"hdr": "h1", "cmd": {"p2": ""}, "signals": [{"id": "S2"}]}
            ]}),
        );
        records.extend(vehicle_records(
            "A",
            "X",
            serde_json::json!({"commands": [
                {"hdr": "h1", "cmd": {"p1": ""}, "signals": [{"id": "S1"}]}
            ]}),
        ));
        let matrix = transform_matrix(&records);
        let row_keys: Vec<(&str, &str)> = matrix
            .rows
            .iter()
            .map(|r| (r.make.as_str(), r.model.as_str()))
            .collect();
        assert_eq!(row_keys, [("A", "X"), ("B", "Y")]);
        let columns: Vec<(&str, &str)> = matrix
            .column_keys
            .iter()
            .map(|c| (c.hdr.as_str(), c.parameter_id.as_str()))
            .collect();
        assert_eq!(columns, [("h1", "p1"), ("h1", "p2")]);
    }

    #[test]
    fn missing_intersections_are_empty_lists_not_absent() {
        let mut records = vehicle_records(
            "A",
            "X",
            serde_json::json!({"commands": [
                {"hdr": "h1", "cmd": {"p1": ""}, "signals": [{"id": "S1"}]}
            ]}),
        );
        records.extend(vehicle_records(
            "B",
            "Y",
            serde_json::json!({"commands": [
                {"hdr": "h1", "cmd": {"p2": ""}, "signals": [{"id": "S2"}]}
            ]}),
        ));
        let matrix = transform_matrix(&records);
        for row in &matrix.rows {
            assert_eq!(row.columns.len(), 2);
        }
        let row_a = &matrix.rows[0];
        assert_eq!(row_a.columns["h1_p1"].len(), 1);
        assert!(row_a.columns["h1_p2"].is_empty());
    }

    #[test]
    fn signals_sharing_a_command_land_in_one_column() {
        let records = vehicle_records(
            "Make",
            "Model",
            serde_json::json!({"commands": [{
                "hdr": "7E0",
                "cmd": {"01": "05", "22": "F1"},
                "signals": [{"id": "A"}, {"id": "B"}]
            }]}),
        );
        // Cross-join emitted 4 records, but they all share one column.
        assert_eq!(records.len(), 4);
        let matrix = transform_matrix(&records);
        assert_eq!(matrix.column_keys.len(), 1);
        assert_eq!(matrix.column_keys[0].parameter_id, "010522F1");
        // Cell order is record encounter order.
        let cells = &matrix.rows[0].columns["7E0_010522F1"];
        let ids: Vec<&str> = cells.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "A", "B"]);
    }

    #[test]
    fn end_to_end_two_vehicle_scenario() {
        let mut records = vehicle_records(
            "Make1",
            "Model1",
            serde_json::json!({"commands": [{
                "hdr": "7E0",
                "cmd": {"0105": 1},
                "signals": [{"id": "ENGINE_TEMP", "fmt": {"mul": 1, "add": -40, "unit": "celsius"}}]
            }]}),
        );
        records.extend(vehicle_records(
            "Make2",
            "Model2",
            serde_json::json!({"commands": [{
                "hdr": "7E8",
                "cmd": {"220A": "FE"},
                "signals": [{"id": "OTHER"}]
            }]}),
        ));
        let matrix = transform_matrix(&records);
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.column_keys.len(), 2);
        assert_eq!(matrix.column_keys[0].label(), "7E0_01051");

        let row2 = &matrix.rows[1];
        assert_eq!(row2.make, "Make2");
        assert!(row2.columns["7E0_01051"].is_empty());
        assert_eq!(row2.columns["7E8_220AFE"].len(), 1);

        let cell = &matrix.rows[0].columns["7E0_01051"][0];
        assert_eq!(cell.id, "ENGINE_TEMP");
        assert_eq!(cell.scaling, "raw*1 +-40");
        assert_eq!(cell.unit, "celsius");
    }

    #[test]
    fn empty_input_yields_empty_matrix() {
        let matrix = transform_matrix(&[]);
        assert!(matrix.rows.is_empty());
        assert!(matrix.column_keys.is_empty());
    }

    #[test]
    fn column_key_serializes_as_pair() {
        let key = ColumnKey::from(("7E0".to_string(), "0105".to_string()));
        let v = serde_json::to_value(&key).unwrap();
        assert_eq!(v, serde_json::json!(["7E0", "0105"]));
    }

    #[test]
    fn matrix_row_flattens_column_fields() {
        let records = vehicle_records(
            "Make",
            "Model",
            serde_json::json!({"commands": [{
                "hdr": "7E0", "cmd": {"01": "05"}, "signals": [{"id": "A"}]
            }]}),
        );
        let matrix = transform_matrix(&records);
        let v = serde_json::to_value(&matrix.rows[0]).unwrap();
        assert_eq!(v["make"], "Make");
        assert!(v["7E0_0105"].is_array());
    }
}
