use droidl10n::{AddScope, BatchReport, EscapeMode, OutcomeStatus, PluralQuantity, ResDir};

use crate::validation::{parse_id_pairs, parse_quantity_pairs, validate_id, validate_language};

fn rule() -> String {
    "=".repeat(80)
}

fn print_banner(title: &str) {
    println!("{}", rule());
    println!("{}", title);
    println!("{}", rule());
}

fn display_name(target: &str) -> &str {
    if droidl10n::resdir::is_source(target) {
        "values"
    } else {
        target
    }
}

/// Prints one `[OK]`/`[SKIP]`/`[ERROR]` line per outcome, then the counts.
fn print_batch(report: &BatchReport, verb: &str) {
    for outcome in &report.outcomes {
        let name = display_name(&outcome.target);
        match &outcome.status {
            OutcomeStatus::Applied => println!("[OK] {} {}", verb, name),
            OutcomeStatus::Skipped(reason) => println!("[SKIP] {}: {}", name, reason),
            OutcomeStatus::Failed(reason) => println!("[ERROR] {}: {}", name, reason),
        }
    }
    println!("\n{}", rule());
    println!("SUMMARY");
    println!("{}", rule());
    println!("Successful: {}", report.applied());
    println!("Skipped: {}", report.skipped());
    println!("Errors: {}", report.failed());
    println!("{}", rule());
}

fn batch_result(report: &BatchReport) -> Result<(), String> {
    if report.has_failures() {
        Err(format!("{} operation(s) failed", report.failed()))
    } else {
        Ok(())
    }
}

fn scope(source_only: bool) -> AddScope {
    if source_only {
        AddScope::SourceOnly
    } else {
        AddScope::All
    }
}

pub fn run_get_command(res: &ResDir, lang: &str, id: &str, raw: bool) -> Result<(), String> {
    validate_language(lang)?;
    let value = res.get(lang, id, raw).map_err(|e| e.to_string())?;
    println!("{}:{}", lang, id);
    println!("  {}", value);
    Ok(())
}

pub fn run_get_plurals_command(res: &ResDir, lang: &str, id: &str) -> Result<(), String> {
    validate_language(lang)?;
    let plural = res.get_plurals(lang, id).map_err(|e| e.to_string())?;
    println!("{}:{}", lang, id);
    if plural.forms.is_empty() {
        println!("  (no items)");
    }
    for (quantity, value) in &plural.forms {
        println!("  {}: {}", quantity, value);
    }
    Ok(())
}

pub fn run_set_command(
    res: &ResDir,
    lang: &str,
    pairs: &[String],
    raw: bool,
    create: bool,
) -> Result<(), String> {
    validate_language(lang)?;
    let pairs = parse_id_pairs(pairs)?;
    let mode = EscapeMode::from_raw_flag(raw);

    if pairs.len() == 1 {
        let id = &pairs[0].0;
        let report = res
            .set_batch(lang, &pairs, mode, create)
            .map_err(|e| e.to_string())?;
        return match report.status_of(id) {
            Some(OutcomeStatus::Failed(failure)) if failure.is_not_found() => Err(format!(
                "{}\n  Use `l10n add {} \"value\"` to add new strings to all languages",
                failure, id
            )),
            Some(OutcomeStatus::Failed(failure)) => Err(failure.to_string()),
            _ => {
                let stored = res.get(lang, id, true).map_err(|e| e.to_string())?;
                println!("[OK] Successfully updated {}:{}", lang, id);
                println!("  New value: {}", stored);
                Ok(())
            }
        };
    }

    print_banner(&format!("BATCH UPDATE: {}", lang));
    println!("Updating {} strings...\n", pairs.len());
    let report = res
        .set_batch(lang, &pairs, mode, create)
        .map_err(|e| e.to_string())?;
    print_batch(&report, "Updated");
    batch_result(&report)
}

pub fn run_set_plurals_command(
    res: &ResDir,
    lang: &str,
    id: &str,
    pairs: &[String],
    raw: bool,
) -> Result<(), String> {
    validate_language(lang)?;
    let pairs = parse_quantity_pairs(pairs)?;
    println!("Updating plurals: {}", id);
    println!("Setting {} quantities...\n", pairs.len());
    res.set_plurals(lang, id, &pairs, EscapeMode::from_raw_flag(raw))
        .map_err(|e| e.to_string())?;
    for (quantity, _) in &pairs {
        println!("[OK] Updated quantity '{}'", quantity);
    }
    println!("\n[OK] Successfully updated {}:{}", lang, id);
    Ok(())
}

pub fn run_add_command(
    res: &ResDir,
    id: &str,
    value: &str,
    raw: bool,
    source_only: bool,
) -> Result<(), String> {
    validate_id(id)?;
    print_banner(&format!("ADDING STRING: {}", id));
    println!("Value: {}\n", value);
    let report = res
        .add_string(id, value, EscapeMode::from_raw_flag(raw), scope(source_only))
        .map_err(|e| e.to_string())?;
    print_batch(&report, "Added to");
    batch_result(&report)
}

pub fn run_add_plural_command(
    res: &ResDir,
    id: &str,
    pairs: &[String],
    raw: bool,
    source_only: bool,
) -> Result<(), String> {
    validate_id(id)?;
    let pairs: Vec<(PluralQuantity, String)> = parse_quantity_pairs(pairs)?;
    print_banner(&format!("ADDING PLURAL: {}", id));
    for (quantity, value) in &pairs {
        println!("  {}: {}", quantity, value);
    }
    println!();
    let report = res
        .add_plural(id, &pairs, EscapeMode::from_raw_flag(raw), scope(source_only))
        .map_err(|e| e.to_string())?;
    print_batch(&report, "Added to");
    batch_result(&report)
}

pub fn run_remove_command(res: &ResDir, ids: &[String]) -> Result<(), String> {
    let mut failed = 0;
    for id in ids {
        print_banner(&format!("REMOVING STRING: {}", id));
        println!();
        let report = res.remove(id).map_err(|e| e.to_string())?;
        print_batch(&report, "Removed from");
        failed += report.failed();
    }
    if failed > 0 {
        return Err(format!("{} operation(s) failed", failed));
    }
    Ok(())
}

pub fn run_sort_command(res: &ResDir, lang: Option<&str>) -> Result<(), String> {
    if let Some(lang) = lang {
        validate_language(lang)?;
    }
    let report = res.sort(lang).map_err(|e| e.to_string())?;
    print_batch(&report, "Sorted");
    batch_result(&report)
}
