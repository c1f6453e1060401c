use droidl10n::ResDir;

const COLUMNS: usize = 4;

/// Print the available language qualifiers, four per row.
pub fn print_languages(res: &ResDir) -> Result<(), String> {
    let languages = res.languages().map_err(|e| e.to_string())?;

    println!("{}", "=".repeat(80));
    println!("AVAILABLE LANGUAGES ({})", languages.len());
    println!("{}", "=".repeat(80));
    for row in languages.chunks(COLUMNS) {
        let cells: Vec<String> = row.iter().map(|lang| format!("{:12}", lang)).collect();
        println!("  {}", cells.join("  ").trim_end());
    }
    println!("{}", "=".repeat(80));
    Ok(())
}
