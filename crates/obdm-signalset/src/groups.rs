//! Regex-based signal grouping.
//!
//! Signalset documents may declare named grouping rules; each rule
//! carries a regex that is searched (not anchored) against every record's
//! signal id. A record accumulates one membership per matching rule, in
//! rule declaration order, and a rule with capturing groups also records
//! the captured substrings under 1-indexed `group<N>` keys.
//!
//! A rule whose regex fails to compile is reported with a warning and
//! skipped; it never aborts annotation of the remaining rules or records.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parse::ParameterRecord;

/// A named grouping rule from a signalset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalGroupRule {
    /// Group identifier.
    pub id: String,
    /// Regex searched against each record's signal id.
    #[serde(rename = "matchingRegex")]
    pub matching_regex: String,
    /// Display name. Falls back to `id` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Categorization path for the group.
    #[serde(default)]
    pub path: String,
    /// Suggested metric binding for the group as a whole.
    #[serde(
        default,
        rename = "suggestedMetricGroup",
        skip_serializing_if = "Option::is_none"
    )]
    pub suggested_metric_group: Option<String>,
}

/// A record's membership in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    /// Identifier of the matched group.
    #[serde(rename = "groupId")]
    pub group_id: String,
    /// Display name of the matched group.
    #[serde(rename = "groupName")]
    pub group_name: String,
    /// Categorization path of the matched group.
    #[serde(rename = "groupPath")]
    pub group_path: String,
    /// Suggested metric binding of the matched group.
    #[serde(
        default,
        rename = "suggestedMetricGroup",
        skip_serializing_if = "Option::is_none"
    )]
    pub suggested_metric_group: Option<String>,
    /// 1-indexed `group<N>` capture values, present only when the rule's
    /// regex has capturing groups.
    #[serde(
        default,
        rename = "matchDetails",
        skip_serializing_if = "Option::is_none"
    )]
    pub match_details: Option<BTreeMap<String, String>>,
}

/// Annotate records with their group memberships.
///
/// Every record's membership list is reset first, so annotation is
/// idempotent for a fixed rule order. With no rules this is a
/// pass-through (after the reset).
pub fn annotate_records(
    mut records: Vec<ParameterRecord>,
    rules: &[SignalGroupRule],
) -> Vec<ParameterRecord> {
    for record in &mut records {
        record.signal_groups.clear();
    }

    for rule in rules {
        let regex = match Regex::new(&rule.matching_regex) {
            Ok(regex) => regex,
            Err(error) => {
                tracing::warn!(
                    group = %rule.id,
                    pattern = %rule.matching_regex,
                    %error,
                    "skipping signal group with invalid regex"
                );
                continue;
            }
        };

        for record in &mut records {
            let Some(caps) = regex.captures(&record.id) else {
                continue;
            };
            let match_details = (regex.captures_len() > 1).then(|| {
                (1..regex.captures_len())
                    .filter_map(|i| {
                        caps.get(i)
                            .map(|m| (format!("group{i}"), m.as_str().to_string()))
                    })
                    .collect()
            });
            record.signal_groups.push(GroupMembership {
                group_id: rule.id.clone(),
                group_name: rule.name.clone().unwrap_or_else(|| rule.id.clone()),
                group_path: rule.path.clone(),
                suggested_metric_group: rule.suggested_metric_group.clone(),
                match_details,
            });
        }
    }
    records
}
