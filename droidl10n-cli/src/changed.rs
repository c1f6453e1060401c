use droidl10n::{ChangeReport, ResDir, detect_changes};

use crate::validation::validate_language;

pub fn changes_against(res: &ResDir, variant: &str) -> Result<ChangeReport, String> {
    validate_language(variant)?;
    let source = res.load_source().map_err(|e| e.to_string())?.resource("source");
    let reference = res
        .load(variant)
        .map_err(|e| e.to_string())?
        .resource(variant);
    Ok(detect_changes(&source, &reference))
}

pub fn run_changed_command(res: &ResDir, variant: &str, json: bool) -> Result<(), String> {
    let report = changes_against(res, variant)?;

    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    if report.in_sync() {
        println!("✅ values/strings.xml and values-{} are in sync", variant);
        return Ok(());
    }

    if !report.changed.is_empty() {
        println!("Changed since values-{} was synced ({}):", variant, report.changed.len());
        for change in &report.changed {
            println!("  {}", change.id);
            println!("    source:  '{}'", change.source);
            println!("    {}: '{}'", variant, change.variant);
        }
        println!();
    }
    if !report.new_in_source.is_empty() {
        println!("New in source ({}):", report.new_in_source.len());
        for entry in &report.new_in_source {
            println!("  {} = '{}'", entry.id, entry.value);
        }
        println!();
    }
    if !report.obsolete.is_empty() {
        println!("Only in values-{} ({}):", variant, report.obsolete.len());
        for entry in &report.obsolete {
            println!("  {} = '{}'", entry.id, entry.value);
        }
        println!();
    }
    println!("Review the translations of every changed id.");
    Ok(())
}
