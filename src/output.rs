//! Output rendering for scan, contrast, and token listings.
//!
//! Supports `human` (default) and `json` outputs. JSON is the serialized
//! report itself, so two runs over the same tree print identical bytes.

use crate::contrast::ContrastPair;
use crate::fix::AppliedFix;
use crate::models::report::{ComplianceReport, Violation};
use crate::models::token::Category;
use crate::models::Severity;
use crate::registry::Registry;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Human,
}

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn badge(sev: Severity, color: bool) -> String {
    let text = format!("⟦{}⟧", sev.as_str());
    if !color {
        return text;
    }
    match sev {
        Severity::Critical => text.red().bold().to_string(),
        Severity::High => text.red().to_string(),
        Severity::Medium => text.yellow().bold().to_string(),
        Severity::Low => text.blue().bold().to_string(),
    }
}

fn icon(sev: Severity, color: bool) -> String {
    let (glyph, c) = match sev {
        Severity::Critical | Severity::High => ("✖", 0),
        Severity::Medium => ("▲", 1),
        Severity::Low => ("◆", 2),
    };
    match (color, c) {
        (false, _) => glyph.to_string(),
        (true, 0) => glyph.red().to_string(),
        (true, 1) => glyph.yellow().to_string(),
        _ => glyph.blue().to_string(),
    }
}

fn pct(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Render a report. JSON output is the pretty-printed report.
pub fn emit(report: &ComplianceReport, format: Format) -> serde_json::Result<String> {
    match format {
        Format::Json => serde_json::to_string_pretty(report),
        Format::Human => Ok(render_human(report, false)),
    }
}

/// Files ordered by highest severity, then violation count (descending), then path.
fn ordered_files(report: &ComplianceReport) -> Vec<(&String, &Vec<Violation>, Severity)> {
    let mut files: Vec<_> = report
        .violations_by_file
        .iter()
        .map(|(f, vs)| {
            let worst = vs.iter().map(|v| v.severity).min().unwrap_or(Severity::Low);
            (f, vs, worst)
        })
        .collect();
    files.sort_by(|a, b| {
        a.2.cmp(&b.2)
            .then_with(|| b.1.len().cmp(&a.1.len()))
            .then_with(|| a.0.cmp(b.0))
    });
    files
}

fn violation_line(v: &Violation, color: bool) -> String {
    let loc = format!("{}:{}", v.line, v.column);
    let reason = format!("❲{}❳", v.reason.as_str());
    let mut line = if color {
        format!(
            "    {} {} {}: {} {}",
            badge(v.severity, true),
            loc.bright_black(),
            v.property,
            v.raw_value.bold(),
            reason.bright_black()
        )
    } else {
        format!(
            "    {} {} {}: {} {}",
            badge(v.severity, false),
            loc,
            v.property,
            v.raw_value,
            reason
        )
    };
    if let (Some(name), Some(value)) = (&v.suggested_token, &v.suggested_value) {
        let hint = format!("→ --{} ({})", name, value);
        if color {
            line.push_str(&format!(" {}", hint.green()));
        } else {
            line.push(' ');
            line.push_str(&hint);
        }
    }
    if v.fix.is_some() {
        line.push_str(" [fixable]");
    }
    line
}

/// Human-readable report, grouped by file.
pub fn render_human(report: &ComplianceReport, color: bool) -> String {
    let mut out = String::new();
    for (file, vs, worst) in ordered_files(report) {
        let name = if color {
            file.bold().to_string()
        } else {
            file.clone()
        };
        out.push_str(&format!(
            "{} {} {} ({} violation{})\n",
            icon(worst, color),
            badge(worst, color),
            name,
            vs.len(),
            if vs.len() == 1 { "" } else { "s" }
        ));
        for v in vs {
            out.push_str(&violation_line(v, color));
            out.push('\n');
        }
    }
    let sev = &report.violations_by_severity;
    let summary = format!(
        "— Summary — files={} with_violations={} violations={} compliance={} critical={} high={} medium={} low={}",
        report.total_files_scanned,
        report.files_with_violations,
        report.total_violations,
        pct(report.compliance_rate),
        sev.critical,
        sev.high,
        sev.medium,
        sev.low
    );
    if color {
        out.push_str(&summary.bold().to_string());
    } else {
        out.push_str(&summary);
    }
    out.push('\n');
    let cats: Vec<String> = report
        .by_category
        .iter()
        .map(|(k, s)| format!("{} {} ({}/{})", k, pct(s.compliance_rate), s.violations, s.declarations))
        .collect();
    if !cats.is_empty() {
        out.push_str(&format!("  by category: {}\n", cats.join("  ")));
    }
    out.push_str(&format!(
        "  declarations={} unparsable={} dangling={} fixable={} skipped={}\n",
        report.total_declarations,
        report.unparsable_declarations,
        report.dangling_references,
        report.fixable_violations,
        report.files_skipped
    ));
    for s in &report.skipped {
        out.push_str(&format!("  ⏭️  skipped: {} ({})\n", s.file, s.reason));
    }
    out
}

/// Compose scan JSON (report plus applied fixes) for stdout.
pub fn compose_scan_json(report: &ComplianceReport, fixes: &[AppliedFix]) -> JsonVal {
    let mut v = serde_json::to_value(report).unwrap_or(JsonVal::Null);
    if let Some(obj) = v.as_object_mut() {
        obj.insert(
            "fixes_applied".into(),
            serde_json::to_value(fixes).unwrap_or_else(|_| json!([])),
        );
    }
    v
}

/// Print scan results in the requested format.
pub fn print_report(report: &ComplianceReport, fixes: &[AppliedFix], output: &str) {
    match output {
        "json" => match serde_json::to_string_pretty(&compose_scan_json(report, fixes)) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
        },
        _ => {
            let color = use_colors(output);
            print!("{}", render_human(report, color));
            for f in fixes {
                if color {
                    println!(
                        "{} {}:{} {} → {}",
                        "✏️  fixed:".green().bold(),
                        f.file.bold(),
                        f.line,
                        f.from,
                        f.to
                    );
                } else {
                    println!("✏️  fixed: {}:{} {} → {}", f.file, f.line, f.from, f.to);
                }
            }
        }
    }
}

/// Write the JSON report to `path`, creating parent directories.
pub fn write_json(report: &ComplianceReport, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body = emit(report, Format::Json).map_err(std::io::Error::other)?;
    fs::write(path, body + "\n")
}

pub fn compose_contrast_json(pairs: &[ContrastPair]) -> JsonVal {
    json!({
        "pairs": pairs,
        "summary": {
            "total": pairs.len(),
            "failing": pairs.iter().filter(|p| !p.passes_aa).count(),
        }
    })
}

pub fn print_contrast(pairs: &[ContrastPair], output: &str) {
    match output {
        "json" => match serde_json::to_string_pretty(&compose_contrast_json(pairs)) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
        },
        _ => {
            let color = use_colors(output);
            for p in pairs {
                let verdict = match (p.passes_aa, color) {
                    (true, true) => "✔ pass".green().bold().to_string(),
                    (true, false) => "✔ pass".to_string(),
                    (false, true) => "✖ fail".red().bold().to_string(),
                    (false, false) => "✖ fail".to_string(),
                };
                println!(
                    "{} {} on {}: {:.2}:1 (needs {:.1}:1, {:?})",
                    verdict, p.foreground, p.background, p.ratio, p.required, p.kind
                );
            }
        }
    }
}

pub fn compose_tokens_json(registry: &Registry, category: Option<Category>) -> JsonVal {
    let mut groups = serde_json::Map::new();
    for cat in Category::ALL {
        if category.is_some_and(|c| c != cat) {
            continue;
        }
        let tokens: Vec<_> = registry.all_of_category(cat).collect();
        if !tokens.is_empty() {
            groups.insert(cat.as_str().to_string(), json!(tokens));
        }
    }
    JsonVal::Object(groups)
}

/// List registry tokens grouped by category.
pub fn print_tokens(registry: &Registry, category: Option<Category>, output: &str) {
    match output {
        "json" => match serde_json::to_string_pretty(&compose_tokens_json(registry, category)) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
        },
        _ => {
            let color = use_colors(output);
            for cat in Category::ALL {
                if category.is_some_and(|c| c != cat) {
                    continue;
                }
                let tokens: Vec<_> = registry.all_of_category(cat).collect();
                if tokens.is_empty() {
                    continue;
                }
                let head = format!("{} ({})", cat, tokens.len());
                if color {
                    println!("{}", head.bold());
                } else {
                    println!("{}", head);
                }
                for t in tokens {
                    println!("  --{}: {}", t.name, t.raw_value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{CategoryStats, SeverityCounts};
    use crate::models::{SyntaxKind, ViolationReason};
    use std::collections::BTreeMap;

    fn violation(line: usize, severity: Severity) -> Violation {
        Violation {
            line,
            column: 5,
            category: Category::Color,
            property: "color".into(),
            raw_value: "#fff".into(),
            syntax_kind: SyntaxKind::CssDeclaration,
            severity,
            reason: ViolationReason::HardcodedValue,
            suggested_token: Some("text-primary".into()),
            suggested_value: Some("#ffffff".into()),
            fix: None,
            context: "color: #fff;".into(),
        }
    }

    fn report() -> ComplianceReport {
        let mut by_file = BTreeMap::new();
        by_file.insert("a.css".to_string(), vec![violation(1, Severity::Medium), violation(2, Severity::Medium)]);
        by_file.insert("b.tsx".to_string(), vec![violation(3, Severity::Critical)]);
        by_file.insert("c.css".to_string(), vec![violation(1, Severity::Medium)]);
        let mut by_category = BTreeMap::new();
        by_category.insert(
            "color".to_string(),
            CategoryStats {
                declarations: 10,
                violations: 4,
                files_with_violations: 3,
                compliance_rate: 0.6,
            },
        );
        ComplianceReport {
            categories: vec![Category::Color],
            total_files_scanned: 4,
            files_with_violations: 3,
            total_violations: 4,
            total_declarations: 10,
            compliance_rate: 0.25,
            unparsable_declarations: 0,
            dangling_references: 0,
            fixable_violations: 0,
            files_skipped: 0,
            violations_by_severity: SeverityCounts {
                critical: 1,
                high: 0,
                medium: 3,
                low: 0,
            },
            by_category,
            violations_by_file: by_file,
            skipped: vec![],
        }
    }

    #[test]
    fn test_human_orders_by_severity_then_count() {
        let text = render_human(&report(), false);
        let b = text.find("b.tsx").unwrap();
        let a = text.find("a.css").unwrap();
        let c = text.find("c.css").unwrap();
        assert!(b < a && a < c, "{}", text);
        assert!(text.contains("⟦critical⟧ b.tsx (1 violation)"));
        assert!(text.contains("→ --text-primary (#ffffff)"));
        assert!(text.contains("compliance=25.0%"));
    }

    #[test]
    fn test_json_emit_is_the_report() {
        let r = report();
        let s = emit(&r, Format::Json).unwrap();
        let v: JsonVal = serde_json::from_str(&s).unwrap();
        assert_eq!(v["total_violations"], 4);
        assert_eq!(v["violations_by_file"]["b.tsx"][0]["severity"], "critical");
        assert_eq!(v["violations_by_file"]["b.tsx"][0]["reason"], "hardcoded-value");
        assert_eq!(s, emit(&r, Format::Json).unwrap());
    }

    #[test]
    fn test_compose_scan_json_adds_fixes() {
        let fixes = vec![AppliedFix {
            file: "a.css".into(),
            line: 1,
            from: "12px".into(),
            to: "var(--space-3)".into(),
        }];
        let v = compose_scan_json(&report(), &fixes);
        assert_eq!(v["fixes_applied"][0]["to"], "var(--space-3)");
    }

    #[test]
    fn test_write_json_creates_parents() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("reports/tokens.json");
        write_json(&report(), &path).unwrap();
        let body = fs::read_to_string(path).unwrap();
        assert!(body.contains("\"compliance_rate\": 0.25"));
    }
}
