//! Directory load pass.
//!
//! One pass reads every data file in the directory (sorted by file name),
//! validates and normalizes each, and collects all issues before deciding
//! whether the pass succeeded. A file whose root is not a mapping is dropped
//! with a single issue; a file with field issues still yields a record, but
//! any issue at all fails the pass as a whole.

use crate::config::RepositoryConfig;
use crate::error::{IssueKind, LoadError, ValidationIssue, ValidationReport};
use crate::normalize::normalize_community;
use crate::validation::{is_truthy, validate_community};
use estate_model::CommunityRecord;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Everything one pass over a data directory produced.
#[derive(Debug, Clone, Default)]
pub struct LoadPass {
    /// Normalized records, in file-name order. Includes records with field issues.
    pub records: Vec<CommunityRecord>,
    pub report: ValidationReport,
    pub files_read: usize,
}

impl LoadPass {
    /// Records when the pass is clean, the aggregate failure otherwise.
    pub fn into_result(self) -> Result<Vec<CommunityRecord>, LoadError> {
        if self.report.is_empty() {
            Ok(self.records)
        } else {
            Err(LoadError::Validation(self.report))
        }
    }
}

/// Parse one file's text into its root mapping.
///
/// Structural problems (bad YAML, non-mapping root) come back as the one issue
/// recorded for that file.
/// A leading byte-order mark is ignored.
pub fn parse_community_file(file_name: &str, text: &str) -> Result<Mapping, ValidationIssue> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let value: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(text).map_err(|e| {
            ValidationIssue::new(
                file_name,
                "root",
                IssueKind::InvalidYaml {
                    message: e.to_string(),
                },
                None,
            )
        })?
    };

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(ValidationIssue::new(
            file_name,
            "root",
            IssueKind::RootNotObject,
            Some(&other),
        )),
    }
}

/// Run a full pass without deciding success.
///
/// Only I/O failures are errors here; content problems land in `report`.
/// A missing directory is an empty pass; a path that is not a directory is an error.
pub fn scan_directory(dir: &Path, config: &RepositoryConfig) -> Result<LoadPass, LoadError> {
    let mut pass = LoadPass::default();

    if !dir.exists() {
        warn!(dir = %dir.display(), "community data directory not found; treating as empty");
        return Ok(pass);
    }
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut duplicates = DuplicateTracker::default();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = match entry.file_name().to_str() {
            Some(name) if config.is_data_file(name) => name.to_string(),
            _ => continue,
        };

        let bytes = std::fs::read(entry.path()).map_err(|source| LoadError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        pass.files_read += 1;

        // Invalid UTF-8 is replaced, not fatal; the file is still checked.
        let text = String::from_utf8_lossy(&bytes);
        if matches!(text, Cow::Owned(_)) {
            warn!(file = %file_name, "data file is not valid UTF-8; decoding lossily");
        }

        let raw = match parse_community_file(&file_name, &text) {
            Ok(raw) => raw,
            Err(issue) => {
                debug!(file = %file_name, "skipping structurally invalid file");
                pass.report.push(issue);
                continue;
            }
        };

        let issues = validate_community(&file_name, &raw);
        debug!(file = %file_name, issues = issues.len(), "validated community file");
        pass.report.extend(issues);

        let record = normalize_community(&file_name, &raw);
        if let Some(issue) = duplicates.check(&record, is_truthy(raw.get("id"))) {
            pass.report.push(issue);
        }
        pass.records.push(record);
    }

    Ok(pass)
}

/// Run a pass and fail it atomically when any issue was found.
pub fn load_directory(
    dir: &Path,
    config: &RepositoryConfig,
) -> Result<Vec<CommunityRecord>, LoadError> {
    let pass = scan_directory(dir, config)?;
    let files_read = pass.files_read;
    match pass.into_result() {
        Ok(records) => {
            info!(
                dir = %dir.display(),
                files = files_read,
                records = records.len(),
                "loaded communities"
            );
            Ok(records)
        }
        Err(err) => {
            if let Some(report) = err.report() {
                warn!(dir = %dir.display(), issues = report.len(), "community validation failed");
            }
            Err(err)
        }
    }
}

/// First-seen owner of each id and route key.
#[derive(Debug, Default)]
struct DuplicateTracker {
    ids: HashMap<String, String>,
    route_keys: HashMap<String, String>,
}

impl DuplicateTracker {
    /// Record `record`'s keys; report a clash with an earlier file.
    ///
    /// Ids that already failed the `required` check are not tracked.
    fn check(&mut self, record: &CommunityRecord, id_present: bool) -> Option<ValidationIssue> {
        if id_present {
            if let Some(first) = self.ids.get(&record.id) {
                return Some(ValidationIssue::new(
                    record.source_file.as_str(),
                    "id",
                    IssueKind::DuplicateId {
                        first_file: first.clone(),
                    },
                    Some(&Value::String(record.id.clone())),
                ));
            }
            self.ids
                .insert(record.id.clone(), record.source_file.clone());
        }

        if record.slug.is_none() && !id_present {
            return None;
        }
        if let Some(first) = self.route_keys.get(&record.route_key) {
            let field = if record.slug.is_some() { "slug" } else { "id" };
            return Some(ValidationIssue::new(
                record.source_file.as_str(),
                field,
                IssueKind::DuplicateRouteKey {
                    first_file: first.clone(),
                },
                Some(&Value::String(record.route_key.clone())),
            ));
        }
        self.route_keys
            .insert(record.route_key.clone(), record.source_file.clone());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_root_is_one_structural_issue() {
        let issue = parse_community_file("bad.yml", "- a\n- b\n").unwrap_err();
        assert_eq!(issue.kind, IssueKind::RootNotObject);
        assert_eq!(issue.to_string(), r#"[bad.yml] root: must be object; value=["a","b"]"#);
    }

    #[test]
    fn empty_file_is_a_null_root() {
        let issue = parse_community_file("empty.yml", "\n").unwrap_err();
        assert_eq!(issue.to_string(), "[empty.yml] root: must be object; value=null");
    }

    #[test]
    fn scalar_root_is_rejected() {
        let issue = parse_community_file("s.yml", "just text\n").unwrap_err();
        assert_eq!(issue.to_string(), "[s.yml] root: must be object; value=just text");
    }

    #[test]
    fn broken_yaml_is_reported_not_raised() {
        let issue = parse_community_file("broken.yml", "id: [unclosed\n").unwrap_err();
        assert!(matches!(issue.kind, IssueKind::InvalidYaml { .. }));
        assert!(issue.kind.is_structural());
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let raw = parse_community_file("bom.yml", "\u{feff}id: g\nname_zh: G\n").unwrap();
        assert_eq!(raw.get("id"), Some(&Value::from("g")));
    }

    #[test]
    fn missing_directory_is_an_empty_pass() {
        let config = RepositoryConfig::default();
        let pass = scan_directory(Path::new("/definitely/not/here/communities"), &config).unwrap();
        assert!(pass.records.is_empty());
        assert!(pass.report.is_empty());
        assert_eq!(pass.files_read, 0);
    }
}
