use droidl10n::traits::Parser;
use droidl10n::{
    AddScope, CheckOptions, Document, EntryKind, Error, EscapeMode, Issue, OutcomeStatus,
    PluralQuantity, ResDir, detect_changes,
};
use indoc::indoc;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SOURCE: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <resources>
        <string name="app_name" translatable="false">Fulguris</string>
        <string name="welcome">Hello %1$s</string>
        <string name="settings">Settings</string>
        <plurals name="tabs">
            <item quantity="one">%d tab</item>
            <item quantity="other">%d tabs</item>
        </plurals>
    </resources>
"#};

const FRENCH: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <resources>
        <string name="welcome">Bonjour</string>
        <string name="obsolete_str">Vieux</string>
        <string name="settings">Paramètres</string>
    </resources>
"#};

const GERMAN: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n<resources>\r\n    <string name=\"settings\">Einstellungen</string>\r\n    <string name=\"welcome\">Willkommen %1$s</string>\r\n    <plurals name=\"tabs\">\r\n        <item quantity=\"one\">%d Tab</item>\r\n        <item quantity=\"other\">%d Tabs</item>\r\n    </plurals>\r\n</resources>\r\n";

const US: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <resources>
        <string name="welcome">Hello %1$s</string>
        <string name="settings">Preferences</string>
        <string name="obsolete_str">Old</string>
    </resources>
"#};

fn write(root: &Path, dir: &str, content: &str) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("strings.xml"), content).unwrap();
}

fn res_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "values", SOURCE);
    write(tmp.path(), "values-fr-rFR", FRENCH);
    write(tmp.path(), "values-de-rDE", GERMAN);
    write(tmp.path(), "values-en-rUS", US);
    // configuration qualifiers are not languages
    write(tmp.path(), "values-night", "<resources/>\n");
    fs::create_dir_all(tmp.path().join("values-v27")).unwrap();
    tmp
}

fn read(root: &Path, dir: &str) -> String {
    fs::read_to_string(root.join(dir).join("strings.xml")).unwrap()
}

#[test]
fn test_languages_skip_configuration_qualifiers() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    assert_eq!(res.languages().unwrap(), vec!["de-rDE", "en-rUS", "fr-rFR"]);
}

#[test]
fn test_missing_language_is_file_not_found() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    assert!(matches!(res.load("xx-rXX"), Err(Error::FileNotFound(_))));
    assert!(matches!(
        res.check(Some("xx-rXX"), &CheckOptions::default()),
        Err(Error::FileNotFound(_))
    ));
}

#[test]
fn test_check_reports_placeholder_mismatch() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    let report = res.check(Some("fr-rFR"), &CheckOptions::default()).unwrap();
    let fr = &report.languages[0];
    assert!(fr.issues.contains(&Issue::PlaceholderMismatch {
        id: "welcome".to_string(),
        source: vec!["%1$s".to_string()],
        translation: vec![],
    }));
    assert!(fr.issues.contains(&Issue::MissingPlural {
        id: "tabs".to_string()
    }));
    // translatable="false" entries are never missing
    assert!(!fr.issues.iter().any(|i| i.id() == "app_name"));
    assert_eq!(fr.critical_count(), 1);
}

#[test]
fn test_check_all_languages() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    let report = res.check(None, &CheckOptions::full()).unwrap();
    let summary = report.summary();
    assert_eq!(summary.languages_checked, 3);
    assert_eq!(summary.critical_issues, 1);

    let de = report.languages.iter().find(|r| r.language == "de-rDE").unwrap();
    assert!(de.is_clean(), "{:?}", de.issues);

    let us = report.languages.iter().find(|r| r.language == "en-rUS").unwrap();
    assert!(us.issues.iter().any(|i| matches!(i, Issue::DiffersFromSource { id, .. } if id == "settings")));
    assert!(us.issues.iter().any(|i| matches!(i, Issue::Obsolete { id, .. } if id == "obsolete_str")));
}

#[test]
fn test_add_to_every_file_then_skip() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());

    let report = res
        .add_string("new_str", "Hello", EscapeMode::Default, AddScope::All)
        .unwrap();
    assert_eq!(report.applied(), 4);
    for dir in ["values", "values-fr-rFR", "values-de-rDE", "values-en-rUS"] {
        assert!(read(tmp.path(), dir).contains(r#"<string name="new_str">Hello</string>"#));
    }
    assert!(read(tmp.path(), "values-de-rDE")
        .ends_with("    <string name=\"new_str\">Hello</string>\r\n</resources>\r\n"));

    let again = res
        .add_string("new_str", "Hello", EscapeMode::Default, AddScope::All)
        .unwrap();
    assert_eq!(again.applied(), 0);
    assert_eq!(again.skipped(), 4);
}

#[test]
fn test_add_source_only() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    let report = res
        .add_string("only_en", "English only", EscapeMode::Default, AddScope::SourceOnly)
        .unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert!(read(tmp.path(), "values").contains("only_en"));
    assert!(!read(tmp.path(), "values-fr-rFR").contains("only_en"));
}

#[test]
fn test_add_plural_everywhere() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    let pairs = vec![
        (PluralQuantity::One, "%d window".to_string()),
        (PluralQuantity::Other, "%d windows".to_string()),
    ];
    let report = res
        .add_plural("windows", &pairs, EscapeMode::Default, AddScope::All)
        .unwrap();
    assert_eq!(report.applied(), 4);
    let de = res.load("de-rDE").unwrap();
    assert_eq!(
        de.get_plurals("windows").unwrap().get(PluralQuantity::Other),
        Some("%d windows")
    );
}

#[test]
fn test_remove_from_files_that_have_it() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    let german_before = read(tmp.path(), "values-de-rDE");

    let report = res.remove("obsolete_str").unwrap();
    assert_eq!(report.applied(), 2);
    assert!(matches!(report.status_of("fr-rFR"), Some(OutcomeStatus::Applied)));
    assert!(matches!(report.status_of("de-rDE"), Some(OutcomeStatus::Skipped(_))));

    assert_eq!(
        read(tmp.path(), "values-fr-rFR"),
        FRENCH.replace("    <string name=\"obsolete_str\">Vieux</string>\n", "")
    );
    assert_eq!(read(tmp.path(), "values-de-rDE"), german_before);
}

#[test]
fn test_sort_translations_by_source_order() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    let report = res.sort(Some("de-rDE")).unwrap();
    assert_eq!(report.applied(), 1);

    let de = res.load("de-rDE").unwrap().resource("de-rDE");
    assert_eq!(
        de.order(),
        vec![
            (EntryKind::String, "welcome".to_string()),
            (EntryKind::String, "settings".to_string()),
            (EntryKind::Plurals, "tabs".to_string()),
        ]
    );
    assert!(read(tmp.path(), "values-de-rDE").contains("\r\n"));

    let sorted = read(tmp.path(), "values-de-rDE");
    res.sort(None).unwrap();
    assert_eq!(read(tmp.path(), "values-de-rDE"), sorted);
}

#[test]
fn test_set_batch_continues_past_failures() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    let pairs = vec![
        ("welcome".to_string(), "Bonjour %1$s".to_string()),
        ("not_in_source".to_string(), "x".to_string()),
        ("settings".to_string(), "It&pos;s".to_string()),
    ];
    let report = res
        .set_batch("fr-rFR", &pairs, EscapeMode::Default, false)
        .unwrap();
    assert_eq!((report.applied(), report.failed()), (1, 2));
    assert_eq!(res.get("fr-rFR", "welcome", false).unwrap(), "Bonjour %1$s");
    assert_eq!(res.get("fr-rFR", "settings", false).unwrap(), "Paramètres");
}

#[test]
fn test_set_batch_requires_existing_entry_unless_create() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    fs::write(
        tmp.path().join("values-fr-rFR").join("strings.xml"),
        FRENCH.replace("    <string name=\"welcome\">Bonjour</string>\n", ""),
    )
    .unwrap();
    let pairs = vec![("welcome".to_string(), "Salut %1$s".to_string())];

    let report = res.set_batch("fr-rFR", &pairs, EscapeMode::Default, false).unwrap();
    assert!(matches!(
        report.status_of("welcome"),
        Some(OutcomeStatus::Failed(failure)) if failure.is_not_found()
    ));
    assert!(!read(tmp.path(), "values-fr-rFR").contains("welcome"));

    let report = res.set_batch("fr-rFR", &pairs, EscapeMode::Default, true).unwrap();
    assert_eq!(report.applied(), 1);
    assert_eq!(res.get("fr-rFR", "welcome", false).unwrap(), "Salut %1$s");
}

#[test]
fn test_set_plurals_and_get_plurals() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    res.set_plurals(
        "de-rDE",
        "tabs",
        &[(PluralQuantity::Other, "%d Registerkarten".to_string())],
        EscapeMode::Default,
    )
    .unwrap();
    let plural = res.get_plurals("de-rDE", "tabs").unwrap();
    assert_eq!(plural.get(PluralQuantity::One), Some("%d Tab"));
    assert_eq!(plural.get(PluralQuantity::Other), Some("%d Registerkarten"));
    assert!(matches!(
        res.get_plurals("fr-rFR", "tabs"),
        Err(Error::EntryNotFound { .. })
    ));
}

#[test]
fn test_get_raw_and_not_found_path() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    assert_eq!(res.get("source", "welcome", true).unwrap(), "Hello %1$s");
    match res.get("fr-rFR", "nope", false) {
        Err(Error::EntryNotFound { file, .. }) => assert!(file.contains("values-fr-rFR")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_detect_changes_against_reference_variant() {
    let tmp = res_tree();
    let res = ResDir::new(tmp.path());
    let source = res.load_source().unwrap().resource("source");
    let us = res.load("en-rUS").unwrap().resource("en-rUS");
    let report = detect_changes(&source, &us);
    assert_eq!(report.changed.len(), 1);
    assert_eq!(report.changed[0].id, "settings");
    assert_eq!(report.new_in_source[0].id, "app_name");
    assert_eq!(report.obsolete[0].id, "obsolete_str");
}

#[test]
fn test_bom_is_stripped_on_read() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("strings.xml");
    fs::write(&path, "\u{feff}<resources><string name=\"a\">A</string></resources>").unwrap();
    let doc = Document::read_from(&path).unwrap();
    assert_eq!(doc.get("a").unwrap(), "A");
    doc.write_to(&path).unwrap();
    assert!(!fs::read(&path).unwrap().starts_with(&[0xEF, 0xBB, 0xBF]));
}
