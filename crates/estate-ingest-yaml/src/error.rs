//! Load errors and validation issues.
//!
//! Issues stay structured (file, field path, kind, offending value) until they
//! are rendered. The rendered line shape is
//! `[<file>] <field_path>: <reason>; value=<printable>`.

use estate_model::AreaRange;
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Header line of an aggregate validation failure.
pub const VALIDATION_FAILED_HEADER: &str = "Community YAML validation failed:";

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueKind {
    /// File root parsed, but not to a mapping.
    RootNotObject,
    /// File is not parseable YAML.
    InvalidYaml { message: String },
    Required,
    MustBeArray,
    DatePattern,
    AreaRangeNotAllowed,
    DuplicateId { first_file: String },
    DuplicateRouteKey { first_file: String },
}

impl IssueKind {
    /// Structural issues drop the whole file; field issues do not.
    pub fn is_structural(&self) -> bool {
        matches!(self, IssueKind::RootNotObject | IssueKind::InvalidYaml { .. })
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::RootNotObject => f.write_str("must be object"),
            IssueKind::InvalidYaml { message } => write!(f, "invalid yaml ({message})"),
            IssueKind::Required => f.write_str("required"),
            IssueKind::MustBeArray => f.write_str("must be array"),
            IssueKind::DatePattern => f.write_str("must match YYYY-MM-DD"),
            IssueKind::AreaRangeNotAllowed => {
                write!(f, "must be one of {}", AreaRange::allowed_list())
            }
            IssueKind::DuplicateId { first_file } => write!(f, "duplicate of {first_file}"),
            IssueKind::DuplicateRouteKey { first_file } => {
                write!(f, "route key duplicates {first_file}")
            }
        }
    }
}

/// One problem found in one data file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub file: String,
    pub field_path: String,
    pub kind: IssueKind,
    /// Offending raw value; `None` when the field was absent.
    pub value: Option<Value>,
}

impl ValidationIssue {
    pub fn new(
        file: impl Into<String>,
        field_path: impl Into<String>,
        kind: IssueKind,
        value: Option<&Value>,
    ) -> Self {
        Self {
            file: file.into(),
            field_path: field_path.into(),
            kind,
            value: value.cloned(),
        }
    }

    /// The offending value as shown in messages.
    pub fn printable_value(&self) -> String {
        printable_value(self.value.as_ref())
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let IssueKind::InvalidYaml { .. } = self.kind {
            return write!(f, "[{}] {}: {}", self.file, self.field_path, self.kind);
        }
        write!(
            f,
            "[{}] {}: {}; value={}",
            self.file,
            self.field_path,
            self.kind,
            self.printable_value()
        )
    }
}

/// Strings print raw, absent prints `undefined`, everything else prints as JSON.
pub fn printable_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => match serde_json::to_value(other) {
            Ok(json) => integral_floats_as_ints(json).to_string(),
            Err(_) => format!("{other:?}"),
        },
    }
}

/// Whole-number floats print without a fraction: `1.0` prints as `1`.
fn integral_floats_as_ints(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Json::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Json::from(f as i64),
            _ => Json::Number(n),
        },
        Json::Array(items) => {
            Json::Array(items.into_iter().map(integral_floats_as_ints).collect())
        }
        Json::Object(map) => Json::Object(
            map.into_iter()
                .map(|(k, v)| (k, integral_floats_as_ints(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Every issue found during one load pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Issues attributed to one data file.
    pub fn for_file<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a ValidationIssue> + 'a {
        self.issues.iter().filter(move |i| i.file == file)
    }

    /// One rendered line per issue.
    pub fn lines(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.to_string()).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(VALIDATION_FAILED_HEADER)?;
        for issue in &self.issues {
            write!(f, "\n{issue}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list data directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("data directory {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{0}")]
    Validation(ValidationReport),
}

impl LoadError {
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            LoadError::Validation(report) => Some(report),
            _ => None,
        }
    }
}
