//! Tag name parsing.
//!
//! New tags are entered as one comma-separated text field. Existing tags are
//! matched by exact name, so names are only trimmed, never case-folded.

use crate::error::CoreError;

/// Maximum length of a tag name, in characters.
pub const MAX_TAG_NAME_LEN: usize = 50;

/// Split a comma-separated tag field into distinct names.
///
/// Entries are trimmed and empty entries dropped. Duplicates are removed
/// keeping the first occurrence, so the result preserves input order.
pub fn parse_tag_names(raw: &str) -> Result<Vec<String>, CoreError> {
    let mut names: Vec<String> = Vec::new();

    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if name.chars().count() > MAX_TAG_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "Tag '{name}' is longer than {MAX_TAG_NAME_LEN} characters"
            )));
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims() {
        assert_eq!(
            parse_tag_names("Tag3, Tag4").unwrap(),
            vec!["Tag3".to_string(), "Tag4".to_string()]
        );
    }

    #[test]
    fn empty_input_yields_no_tags() {
        assert!(parse_tag_names("").unwrap().is_empty());
        assert!(parse_tag_names(" , ,").unwrap().is_empty());
    }

    #[test]
    fn duplicates_are_dropped_in_order() {
        assert_eq!(
            parse_tag_names("belts, trains, belts").unwrap(),
            vec!["belts".to_string(), "trains".to_string()]
        );
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(
            parse_tag_names("Rail,rail").unwrap(),
            vec!["Rail".to_string(), "rail".to_string()]
        );
    }

    #[test]
    fn overlong_name_is_rejected() {
        let long = "x".repeat(MAX_TAG_NAME_LEN + 1);
        assert!(parse_tag_names(&long).is_err());
        assert!(parse_tag_names(&"x".repeat(MAX_TAG_NAME_LEN)).is_ok());
    }
}
