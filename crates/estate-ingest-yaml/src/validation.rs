//! Field checks over one raw community mapping.
//!
//! Every check runs; none short-circuits another. The validator never fails,
//! it only reports.

use crate::error::{IssueKind, ValidationIssue};
use estate_model::AreaRange;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date regex"))
}

/// `YYYY-MM-DD` by shape only; `2024-13-45` passes.
pub fn matches_date_pattern(text: &str) -> bool {
    date_regex().is_match(text)
}

/// JavaScript-style truthiness of a parsed YAML value.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Sequence(_)) | Some(Value::Mapping(_)) | Some(Value::Tagged(_)) => true,
    }
}

/// Check one raw record. Issues are tagged with `file_name`.
pub fn validate_community(file_name: &str, raw: &Mapping) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for field in ["id", "name_zh"] {
        let value = raw.get(field);
        if !is_truthy(value) {
            issues.push(ValidationIssue::new(file_name, field, IssueKind::Required, value));
        }
    }

    let tags = raw.get("tags");
    if !matches!(tags, Some(Value::Sequence(_))) {
        issues.push(ValidationIssue::new(file_name, "tags", IssueKind::MustBeArray, tags));
    }

    let updated_at = raw.get("updated_at");
    let date_ok = match updated_at {
        Some(Value::String(s)) => matches_date_pattern(s),
        _ => false,
    };
    if !date_ok {
        issues.push(ValidationIssue::new(
            file_name,
            "updated_at",
            IssueKind::DatePattern,
            updated_at,
        ));
    }

    for (type_index, building_type) in building_types(raw).iter().enumerate() {
        for (layout_index, layout) in layouts(building_type).iter().enumerate() {
            let area_range = layout.as_mapping().and_then(|l| l.get("area_sqm_range"));
            let allowed = match area_range {
                Some(Value::String(s)) => s.parse::<AreaRange>().is_ok(),
                _ => false,
            };
            if !allowed {
                issues.push(ValidationIssue::new(
                    file_name,
                    format!(
                        "housing_stock.building_types[{type_index}].layouts[{layout_index}].area_sqm_range"
                    ),
                    IssueKind::AreaRangeNotAllowed,
                    area_range,
                ));
            }
        }
    }

    issues
}

fn building_types(raw: &Mapping) -> &[Value] {
    raw.get("housing_stock")
        .and_then(Value::as_mapping)
        .and_then(|h| h.get("building_types"))
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn layouts(building_type: &Value) -> &[Value] {
    building_type
        .as_mapping()
        .and_then(|b| b.get("layouts"))
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
