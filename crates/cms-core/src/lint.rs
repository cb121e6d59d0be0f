//! Conformance lint for content documents.
//!
//! Documents are not shape-checked while editing; this pass reports where
//! a stored document drifts from its section schema. It never modifies
//! the document.

use crate::catalog::{SCHEDULE_FIELD, WEEKLY_SCHEDULE};
use crate::content::Content;
use crate::path::Path;
use crate::schema::{FieldKind, FieldSchema, SectionSchema};
use crate::time_range::TimeRange;
use serde::Serialize;
use std::fmt;

// ─── Diagnostic types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Likely to render wrongly.
    Warning,
    /// Harmless drift.
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintDiagnostic {
    pub path: Path,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "unknown-key", "bad-option").
    pub rule: &'static str,
}

impl fmt::Display for LintDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        write!(f, "{level}[{}] {}: {}", self.rule, self.path, self.message)
    }
}

/// Extra rule run on whole documents of one section.
type SectionCheck = fn(&Content, &mut Vec<LintDiagnostic>);

/// Section-specific rules, by section key.
const SECTION_CHECKS: &[(&str, SectionCheck)] = &[(WEEKLY_SCHEDULE, lint_schedule_times)];

// ─── Public API ──────────────────────────────────────────────────────────

/// Check `doc` against `section` and return every finding.
#[must_use]
pub fn lint_content(section: &SectionSchema, doc: &Content) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    match doc {
        Content::Object(_) => lint_fields(&section.fields, doc, &Path::root(), &mut diags),
        Content::Null => {}
        other => diags.push(LintDiagnostic {
            path: Path::root(),
            message: format!("expected an object, found {}", other.kind_name()),
            severity: LintSeverity::Warning,
            rule: "kind-mismatch",
        }),
    }
    for (key, check) in SECTION_CHECKS {
        if section.key.as_str() == *key {
            check(doc, &mut diags);
        }
    }
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_fields(
    fields: &[FieldSchema],
    container: &Content,
    at: &Path,
    diags: &mut Vec<LintDiagnostic>,
) {
    let Some(map) = container.as_object() else {
        return;
    };
    for key in map.keys() {
        if !fields.iter().any(|f| &f.key == key) {
            diags.push(LintDiagnostic {
                path: at.join_key(key),
                message: format!("`{key}` is not part of the schema"),
                severity: LintSeverity::Info,
                rule: "unknown-key",
            });
        }
    }
    for field in fields {
        if let Some(value) = map.get(&field.key) {
            lint_value(field, value, &at.join_key(&field.key), diags);
        }
    }
}

fn lint_value(field: &FieldSchema, value: &Content, at: &Path, diags: &mut Vec<LintDiagnostic>) {
    if value.is_null() {
        return;
    }
    match &field.kind {
        FieldKind::Object(children) => match value {
            Content::Object(_) => lint_fields(children, value, at, diags),
            other => diags.push(mismatch(at, "object", other)),
        },
        FieldKind::Array(children) => match value.as_array() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    let item_path = at.join_index(index);
                    match item {
                        Content::Object(_) => lint_fields(children, item, &item_path, diags),
                        other => diags.push(mismatch(&item_path, "object", other)),
                    }
                }
            }
            None => diags.push(mismatch(at, "array", value)),
        },
        FieldKind::Select(options) => match value.as_str() {
            Some("") => {}
            Some(s) if options.iter().any(|o| o.value == s) => {}
            Some(s) => diags.push(LintDiagnostic {
                path: at.clone(),
                message: format!("`{s}` is not one of the options of `{}`", field.key),
                severity: LintSeverity::Warning,
                rule: "bad-option",
            }),
            None => diags.push(mismatch(at, "string", value)),
        },
        _ => {
            if matches!(value, Content::Array(_) | Content::Object(_)) {
                diags.push(mismatch(at, "scalar", value));
            }
        }
    }
}

fn mismatch(at: &Path, expected: &str, found: &Content) -> LintDiagnostic {
    LintDiagnostic {
        path: at.clone(),
        message: format!("expected {expected}, found {}", found.kind_name()),
        severity: LintSeverity::Warning,
        rule: "kind-mismatch",
    }
}

/// Report schedule times that editors would silently reset to the default.
fn lint_schedule_times(doc: &Content, diags: &mut Vec<LintDiagnostic>) {
    let Some(days) = doc.get(SCHEDULE_FIELD).and_then(Content::as_array) else {
        return;
    };
    for (day_index, day) in days.iter().enumerate() {
        let Some(classes) = day.get("classes").and_then(Content::as_array) else {
            continue;
        };
        for (class_index, class) in classes.iter().enumerate() {
            let time = class.get("time").and_then(Content::as_str).unwrap_or("");
            if TimeRange::parse(time).is_err() {
                diags.push(LintDiagnostic {
                    path: Path::root()
                        .join_key(SCHEDULE_FIELD)
                        .join_index(day_index)
                        .join_key("classes")
                        .join_index(class_index)
                        .join_key("time"),
                    message: format!("`{time}` is not a time range; editors will reset it"),
                    severity: LintSeverity::Info,
                    rule: "bad-time-range",
                });
            }
        }
    }
}
