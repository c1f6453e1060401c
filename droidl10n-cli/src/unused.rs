use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use droidl10n::ResDir;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STRING_REFERENCE: Regex =
        Regex::new(r#"R\.string\.(\w+)|@string/(\w+)|"pref_key_(\w+)""#).unwrap();
    static ref TRANSLATION_FILE: Regex = Regex::new(r"[/\\]values-[^/\\]+[/\\]strings\.xml$").unwrap();
}

const SOURCE_PATTERNS: [&str; 3] = ["*.kt", "*.java", "*.xml"];

fn source_globs() -> Result<GlobSet, String> {
    let mut builder = GlobSetBuilder::new();
    for pattern in SOURCE_PATTERNS {
        let glob = Glob::new(pattern).map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| format!("Failed to build glob set: {}", e))
}

/// Lists Kotlin, Java and XML files under `root`, leaving out translated `strings.xml`.
pub fn source_files(root: &Path) -> Result<Vec<PathBuf>, String> {
    if !root.is_dir() {
        return Err(format!("Source directory does not exist: {}", root.display()));
    }
    let set = source_globs()?;
    let mut files = Vec::new();
    for dent in WalkBuilder::new(root).hidden(false).build() {
        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = dent.path();
        let matched = path.file_name().is_some_and(|name| set.is_match(name));
        if matched && !TRANSLATION_FILE.is_match(&path.to_string_lossy()) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Collects every string id referenced from `text`.
pub fn collect_references(text: &str, into: &mut HashSet<String>) {
    for caps in STRING_REFERENCE.captures_iter(text) {
        if let Some(id) = caps.iter().skip(1).flatten().next() {
            into.insert(id.as_str().to_string());
        }
    }
}

/// Source string ids never referenced under `src`, sorted.
pub fn find_unused(res: &ResDir, src: &Path) -> Result<Vec<String>, String> {
    let source = res.load_source().map_err(|e| e.to_string())?.resource("source");

    let mut referenced = HashSet::new();
    for file in source_files(src)? {
        match fs::read_to_string(&file) {
            Ok(text) => collect_references(&text, &mut referenced),
            Err(e) => tracing::warn!(file = %file.display(), error = %e, "cannot read file"),
        }
    }

    let mut unused: Vec<String> = source
        .strings()
        .map(|(id, _)| id)
        .filter(|id| !referenced.contains(*id))
        .map(str::to_string)
        .collect();
    unused.sort();
    unused.dedup();
    Ok(unused)
}

pub fn run_unused_command(res: &ResDir, src: &Path) -> Result<(), String> {
    let unused = find_unused(res, src)?;
    if unused.is_empty() {
        println!("✅ No unused strings found");
        return Ok(());
    }
    println!("Found {} unused string(s):", unused.len());
    for id in &unused {
        println!("  {}", id);
    }
    println!("\nTo remove them:");
    println!("  l10n remove {}", unused.join(" "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_collect_references() {
        let mut ids = HashSet::new();
        collect_references(
            indoc! {r#"
                val title = getString(R.string.settings_title)
                <TextView android:text="@string/welcome" />
                findPreference("pref_key_privacy")
            "#},
            &mut ids,
        );
        let mut ids: Vec<_> = ids.into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec!["privacy", "settings_title", "welcome"]);
    }

    #[test]
    fn test_source_files_skip_translations() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        for (dir, name) in [
            ("main/java", "App.kt"),
            ("main/java", "Legacy.java"),
            ("main/java", "notes.txt"),
            ("main/res/layout", "main.xml"),
            ("main/res/values", "strings.xml"),
            ("main/res/values-fr", "strings.xml"),
        ] {
            fs::create_dir_all(root.join(dir)).unwrap();
            fs::write(root.join(dir).join(name), "").unwrap();
        }
        let files: Vec<String> = source_files(root)
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            files,
            vec![
                "main/java/App.kt",
                "main/java/Legacy.java",
                "main/res/layout/main.xml",
                "main/res/values/strings.xml",
            ]
        );
    }

    #[test]
    fn test_find_unused() {
        let tmp = TempDir::new().unwrap();
        let res_root = tmp.path().join("src/main/res");
        fs::create_dir_all(res_root.join("values")).unwrap();
        fs::write(
            res_root.join("values/strings.xml"),
            indoc! {r#"
                <resources>
                    <string name="used">Used</string>
                    <string name="zombie">Zombie</string>
                    <string name="alias">@string/used</string>
                    <string name="abandoned">Abandoned</string>
                </resources>
            "#},
        )
        .unwrap();
        fs::create_dir_all(tmp.path().join("src/main/java")).unwrap();
        fs::write(
            tmp.path().join("src/main/java/Main.kt"),
            "getString(R.string.used)\ngetString(R.string.alias)\n",
        )
        .unwrap();

        let res = ResDir::new(&res_root);
        let unused = find_unused(&res, &tmp.path().join("src")).unwrap();
        assert_eq!(unused, vec!["abandoned", "zombie"]);
    }
}
