use std::path::Path;

use droidl10n::{PluralQuantity, resdir};

/// Validate that the resource directory exists and holds a source file.
pub fn validate_res_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Resource directory does not exist: {}", path.display()));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", path.display()));
    }
    let source = path.join("values").join("strings.xml");
    if !source.is_file() {
        return Err(format!("Source file not found: {}", source.display()));
    }
    Ok(())
}

/// Validate a language argument: `source`/`values`, or a `values-*` language qualifier.
pub fn validate_language(lang: &str) -> Result<(), String> {
    if lang.is_empty() {
        return Err("Language code cannot be empty".to_string());
    }
    if resdir::is_source(lang) {
        return Ok(());
    }
    if resdir::qualifier_to_langid(lang).is_none() {
        return Err(format!(
            "Invalid language code format: {}. Expected a resource qualifier like fr, pt-rBR or b+sr+Latn",
            lang
        ));
    }
    Ok(())
}

/// Validate a string resource id.
pub fn validate_id(id: &str) -> Result<(), String> {
    let valid = id
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid resource id: '{}'", id))
    }
}

/// Parse `<QTY> <VALUE> [<QTY> <VALUE> ...]`.
pub fn parse_quantity_pairs(args: &[String]) -> Result<Vec<(PluralQuantity, String)>, String> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err("Expected <QUANTITY> <VALUE> pairs".to_string());
    }
    args.chunks(2)
        .map(|pair| {
            let quantity = pair[0].parse::<PluralQuantity>()?;
            Ok((quantity, pair[1].clone()))
        })
        .collect()
}

/// Parse `<ID> <VALUE> [<ID> <VALUE> ...]`.
pub fn parse_id_pairs(args: &[String]) -> Result<Vec<(String, String)>, String> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err("Expected <ID> <VALUE> pairs".to_string());
    }
    args.chunks(2)
        .map(|pair| {
            validate_id(&pair[0])?;
            Ok((pair[0].clone(), pair[1].clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_language() {
        assert!(validate_language("source").is_ok());
        assert!(validate_language("values").is_ok());
        assert!(validate_language("ko-rKR").is_ok());
        assert!(validate_language("b+sr+Latn").is_ok());
        assert!(validate_language("").is_err());
        assert!(validate_language("night").is_err());
        assert!(validate_language("ko-KR").is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("welcome_message").is_ok());
        assert!(validate_id("_private").is_ok());
        assert!(validate_id("1abc").is_err());
        assert!(validate_id("has space").is_err());
        assert!(validate_id("").is_err());
    }

    #[test]
    fn test_parse_quantity_pairs() {
        let pairs = parse_quantity_pairs(&strings(&["one", "%d tab", "other", "%d tabs"])).unwrap();
        assert_eq!(
            pairs,
            vec![
                (PluralQuantity::One, "%d tab".to_string()),
                (PluralQuantity::Other, "%d tabs".to_string())
            ]
        );
        assert!(parse_quantity_pairs(&strings(&["one"])).is_err());
        assert!(parse_quantity_pairs(&strings(&["several", "x"])).is_err());
    }

    #[test]
    fn test_parse_id_pairs() {
        let pairs = parse_id_pairs(&strings(&["enable", "사용", "disable", "사용 안 함"])).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("disable".to_string(), "사용 안 함".to_string()));
        assert!(parse_id_pairs(&strings(&["enable"])).is_err());
    }

    #[test]
    fn test_validate_res_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(validate_res_dir(&tmp.path().join("missing")).is_err());
        assert!(validate_res_dir(tmp.path()).unwrap_err().contains("Source file not found"));
        std::fs::create_dir_all(tmp.path().join("values")).unwrap();
        std::fs::write(tmp.path().join("values/strings.xml"), "<resources/>").unwrap();
        assert!(validate_res_dir(tmp.path()).is_ok());
    }
}
