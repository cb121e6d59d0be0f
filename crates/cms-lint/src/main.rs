use std::fs;
use std::io::{self, Read};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use cms_core::{LintDiagnostic, LintSeverity, catalog, lint_content};
use cms_editor::{PersistedSection, SectionId, SectionListing};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "cms-lint", about = "Studio CMS content utilities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check exported section records against the catalog
    Check(Check),
    /// Print the page and section catalog as JSON
    Catalog,
}

#[derive(Args)]
struct Check {
    /// Path to a JSON export (flat list or grouped listing); `-` reads stdin
    file: Option<String>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Treat warnings as failures
    #[arg(long)]
    deny_warnings: bool,
    /// Skip inactive records
    #[arg(long)]
    active_only: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct RecordReport {
    id: SectionId,
    section_key: String,
    diagnostics: Vec<LintDiagnostic>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => {
            let failed = run_check(&args)?;
            if failed {
                std::process::exit(1);
            }
        }
        Commands::Catalog => {
            catalog().validate()?;
            println!("{}", serde_json::to_string_pretty(catalog().pages())?);
        }
    }
    Ok(())
}

fn read_input(file: Option<&str>) -> anyhow::Result<String> {
    match file {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {path}")),
    }
}

/// Records in an export, in `(order, id)` order within each section.
fn parse_export(source: &str) -> anyhow::Result<Vec<PersistedSection>> {
    let listing: SectionListing = serde_json::from_str(source)
        .context("export is neither a record list nor a grouped listing")?;
    Ok(listing.into_grouped().into_values().flatten().collect())
}

fn check_records(records: &[PersistedSection], active_only: bool) -> Vec<RecordReport> {
    records
        .iter()
        .filter(|r| !active_only || r.is_active)
        .map(|record| {
            let diagnostics = match catalog().section(record.section_key) {
                Some(section) => lint_content(section, &record.content),
                None => {
                    log::warn!("record {} has unknown section `{}`", record.id, record.section_key);
                    vec![LintDiagnostic {
                        path: cms_core::Path::root(),
                        message: format!("section `{}` is not in the catalog", record.section_key),
                        severity: LintSeverity::Warning,
                        rule: "unknown-section",
                    }]
                }
            };
            RecordReport {
                id: record.id,
                section_key: record.section_key.to_string(),
                diagnostics,
            }
        })
        .collect()
}

/// Returns whether the run should fail.
fn run_check(args: &Check) -> anyhow::Result<bool> {
    let source = read_input(args.file.as_deref())?;
    let records = parse_export(&source)?;
    if records.is_empty() {
        bail!("export contains no records");
    }
    log::debug!("checking {} records", records.len());
    let reports = check_records(&records, args.active_only);

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        Format::Text => {
            for report in &reports {
                for diag in &report.diagnostics {
                    println!("{} #{}: {diag}", report.section_key, report.id);
                }
            }
        }
    }

    let all = reports.iter().flat_map(|r| &r.diagnostics);
    let warnings = all
        .clone()
        .filter(|d| d.severity == LintSeverity::Warning)
        .count();
    let total = all.count();
    eprintln!("{} records, {total} findings, {warnings} warnings", reports.len());
    Ok(args.deny_warnings && warnings > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXPORT: &str = r#"[
        { "id": 1, "section_key": "hero", "content": { "title": "Hi", "cta_primary": "oops" },
          "order": 0, "is_active": true,
          "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z" },
        { "id": 2, "section_key": "pricing", "content": {},
          "order": 1, "is_active": false,
          "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z" }
    ]"#;

    #[test]
    fn flat_export_is_checked() {
        let records = parse_export(EXPORT).unwrap();
        assert_eq!(records.len(), 2);
        let reports = check_records(&records, false);
        let rules: Vec<(&str, &str)> = reports
            .iter()
            .flat_map(|r| r.diagnostics.iter().map(move |d| (r.section_key.as_str(), d.rule)))
            .collect();
        assert_eq!(rules, [("hero", "kind-mismatch"), ("pricing", "unknown-section")]);
    }

    #[test]
    fn active_only_skips_inactive() {
        let records = parse_export(EXPORT).unwrap();
        let reports = check_records(&records, true);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, SectionId(1));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_export(r#"{"hero": 3}"#).is_err());
    }
}
