use droidl10n::{CheckOptions, CheckReport, LanguageReport, ResDir};
use serde_json::json;

/// Issues printed per language when checking everything.
const ISSUE_PREVIEW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutput {
    Text,
    Summary,
    Json,
}

pub fn run_check_command(
    res: &ResDir,
    language: Option<&str>,
    options: &CheckOptions,
    output: CheckOutput,
    strict: bool,
) -> Result<(), String> {
    let report = res.check(language, options).map_err(|e| e.to_string())?;

    match output {
        CheckOutput::Json => print_json(&report)?,
        CheckOutput::Summary => print_summary(&report),
        CheckOutput::Text => {
            print_header(&report, language, options);
            print_issues(&report, language.is_some());
            print_summary(&report);
        }
    }

    if strict && report.has_critical() {
        return Err(format!(
            "{} critical placeholder mismatch(es) found",
            report.total_critical()
        ));
    }
    Ok(())
}

fn print_json(report: &CheckReport) -> Result<(), String> {
    let value = json!({
        "mode": report.mode,
        "summary": report.summary(),
        "languages": report.languages,
    });
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| format!("Failed to serialize report: {}", e))?;
    println!("{}", text);
    Ok(())
}

fn print_header(report: &CheckReport, language: Option<&str>, options: &CheckOptions) {
    let count = report.languages.len();
    match language {
        Some(language) => println!("Checking {} (showing all issues)", language),
        None => println!(
            "Checking {} {}",
            count,
            if count == 1 { "language" } else { "languages" }
        ),
    }
    if options.near_threshold > 0 {
        println!("Including near matches (≤{} char difference)", options.near_threshold);
    }
    println!();
    println!("{}", "=".repeat(80));
    println!("TRANSLATION QUALITY CHECK");
    println!("{}", "=".repeat(80));
}

fn print_language(language: &LanguageReport, show_all: bool) {
    let critical = language.critical_count();
    if critical > 0 {
        println!(
            "\n{} ({} issues, {} CRITICAL):",
            language.language,
            language.issues.len(),
            critical
        );
    } else {
        println!("\n{} ({} issues):", language.language, language.issues.len());
    }

    let shown = if show_all {
        language.issues.len()
    } else {
        ISSUE_PREVIEW.min(language.issues.len())
    };
    for issue in &language.issues[..shown] {
        println!("  {}", issue);
    }
    if shown < language.issues.len() {
        println!("  ... and {} more issues", language.issues.len() - shown);
    }
}

fn print_issues(report: &CheckReport, show_all: bool) {
    if report.languages.iter().all(LanguageReport::is_clean) {
        println!("\n✅ No translation quality issues detected!");
        return;
    }
    println!("\nPotential translation issues found:");
    for language in report.languages.iter().filter(|l| !l.is_clean()) {
        print_language(language, show_all);
    }
}

fn print_summary(report: &CheckReport) {
    let summary = report.summary();
    println!("\n{}", "=".repeat(80));
    println!("SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Languages checked: {}", summary.languages_checked);
    println!("Languages with potential issues: {}", summary.languages_with_issues);
    println!("Languages with clean translations: {}", summary.clean_languages);
    if summary.critical_issues > 0 {
        println!(
            "\n*** CRITICAL ISSUES FOUND: {} placeholder mismatches that WILL cause crashes! ***",
            summary.critical_issues
        );
    }
    println!("{}", "=".repeat(80));
}
