use crate::OutputFormat;
use anyhow::{anyhow, Result};
use colored::Colorize;
use estate_ingest_yaml::{CommunityRepository, LoadError, ValidationIssue, ValidationReport};
use estate_ingest_yaml::error::VALIDATION_FAILED_HEADER;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CheckSummary<'a> {
    ok: bool,
    data_dir: String,
    communities: usize,
    issues: &'a [ValidationIssue],
}

pub fn cmd_check(repo: &CommunityRepository, format: OutputFormat) -> Result<()> {
    let data_dir = repo.data_dir().display().to_string();
    if format == OutputFormat::Text {
        println!("{} {}", "Checking".green().bold(), data_dir);
    }

    let report = match repo.load_all() {
        Ok(records) => {
            match format {
                OutputFormat::Json => {
                    let summary = CheckSummary {
                        ok: true,
                        data_dir,
                        communities: records.len(),
                        issues: &[],
                    };
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                OutputFormat::Text => {
                    println!("  Communities: {}", records.len());
                    println!("{}", "Valid.".green());
                }
            }
            return Ok(());
        }
        Err(LoadError::Validation(report)) => report,
        Err(other) => return Err(other.into()),
    };

    match format {
        OutputFormat::Json => {
            let summary = CheckSummary {
                ok: false,
                data_dir,
                communities: 0,
                issues: &report.issues,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => println!("{}", render_report_text(&report)),
    }

    Err(anyhow!("validation found {} issue(s)", report.len()))
}

fn render_report_text(report: &ValidationReport) -> String {
    let mut out = VALIDATION_FAILED_HEADER.red().bold().to_string();
    for issue in &report.issues {
        let marker = if issue.kind.is_structural() {
            "✗".red()
        } else {
            "•".yellow()
        };
        out.push_str(&format!("\n  {marker} {issue}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_ingest_yaml::IssueKind;

    #[test]
    fn text_report_has_one_line_per_issue() {
        colored::control::set_override(false);
        let mut report = ValidationReport::default();
        report.push(ValidationIssue::new("a.yml", "root", IssueKind::RootNotObject, None));
        report.push(ValidationIssue::new("b.yml", "id", IssueKind::Required, None));

        let text = render_report_text(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Community YAML validation failed:");
        assert!(lines[2].ends_with("[b.yml] id: required; value=undefined"));
    }
}
