//! Free-text input validation
//!
//! Pure functions, no I/O. Every create/join/add mutation validates its
//! input here first; failures never reach the remote layer.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// List name length bounds
pub const LIST_NAME_MIN: usize = 3;
pub const LIST_NAME_MAX: usize = 50;

/// Item name length bounds
pub const ITEM_NAME_MIN: usize = 2;
pub const ITEM_NAME_MAX: usize = 100;

/// Punctuation allowed in names besides letters, digits and whitespace
const ALLOWED_PUNCTUATION: &str = ".,!?'-";

/// Words rejected anywhere inside a name, case-insensitive
const DISALLOWED_WORDS: &[&str] = &["fuck", "shit", "bitch", "asshole", "cunt"];

static WORD_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn word_patterns() -> &'static [Regex] {
    WORD_PATTERNS.get_or_init(|| {
        DISALLOWED_WORDS
            .iter()
            .map(|w| Regex::new(&format!("(?i){}", regex::escape(w))).unwrap())
            .collect()
    })
}

/// Why a piece of input was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    Empty,
    TooShort { min: usize },
    TooLong { max: usize },
    DisallowedWord,
    InvalidCharacters,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::Empty => write!(f, "Name cannot be empty"),
            ValidationFailure::TooShort { min } => {
                write!(f, "Name must be at least {} characters", min)
            }
            ValidationFailure::TooLong { max } => {
                write!(f, "Name must be at most {} characters", max)
            }
            ValidationFailure::DisallowedWord => write!(f, "Name contains a disallowed word"),
            ValidationFailure::InvalidCharacters => write!(f, "Name contains invalid characters"),
        }
    }
}

impl std::error::Error for ValidationFailure {}

/// Validate and normalize a list name (3-50 characters)
pub fn validate_list_name(raw: &str) -> Result<String, ValidationFailure> {
    validate_name(raw, LIST_NAME_MIN, LIST_NAME_MAX)
}

/// Validate and normalize an item name (2-100 characters)
pub fn validate_item_name(raw: &str) -> Result<String, ValidationFailure> {
    validate_name(raw, ITEM_NAME_MIN, ITEM_NAME_MAX)
}

/// Validate a join code: the target list's id, which must be a UUID
///
/// Returns the canonical (lowercase hyphenated) form.
pub fn validate_join_code(raw: &str) -> Result<String, ValidationFailure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationFailure::Empty);
    }
    match uuid::Uuid::parse_str(trimmed) {
        Ok(id) => Ok(id.to_string()),
        Err(_) => Err(ValidationFailure::InvalidCharacters),
    }
}

fn validate_name(raw: &str, min: usize, max: usize) -> Result<String, ValidationFailure> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ValidationFailure::Empty);
    }
    let len = trimmed.chars().count();
    if len < min {
        return Err(ValidationFailure::TooShort { min });
    }
    if len > max {
        return Err(ValidationFailure::TooLong { max });
    }
    if !trimmed.chars().all(is_allowed_char) {
        return Err(ValidationFailure::InvalidCharacters);
    }
    if word_patterns().iter().any(|p| p.is_match(trimmed)) {
        return Err(ValidationFailure::DisallowedWord);
    }

    Ok(trimmed.to_string())
}

fn is_allowed_char(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_name_too_short() {
        assert_eq!(
            validate_list_name("ab"),
            Err(ValidationFailure::TooShort { min: 3 })
        );
    }

    #[test]
    fn test_list_name_too_long() {
        let long = "a".repeat(51);
        assert_eq!(
            validate_list_name(&long),
            Err(ValidationFailure::TooLong { max: 50 })
        );
    }

    #[test]
    fn test_list_name_ok() {
        assert_eq!(
            validate_list_name("Weekend Trip"),
            Ok("Weekend Trip".to_string())
        );
    }

    #[test]
    fn test_item_name_trims() {
        assert_eq!(validate_item_name("  Milk  "), Ok("Milk".to_string()));
    }

    #[test]
    fn test_empty_after_trim() {
        assert_eq!(validate_item_name("   "), Err(ValidationFailure::Empty));
    }

    #[test]
    fn test_unicode_letters_allowed() {
        assert_eq!(
            validate_list_name("Einkaufsliste für Ümit"),
            Ok("Einkaufsliste für Ümit".to_string())
        );
    }

    #[test]
    fn test_punctuation_policy() {
        assert_eq!(
            validate_item_name("Don't forget the eggs!"),
            Ok("Don't forget the eggs!".to_string())
        );
        assert_eq!(
            validate_item_name("rm -rf / #yolo"),
            Err(ValidationFailure::InvalidCharacters)
        );
    }

    #[test]
    fn test_disallowed_word_case_insensitive() {
        assert_eq!(
            validate_list_name("ShIt to buy"),
            Err(ValidationFailure::DisallowedWord)
        );
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 3 multi-byte chars pass the min-3 bound
        assert_eq!(validate_list_name("äöü"), Ok("äöü".to_string()));
    }

    #[test]
    fn test_join_code_roundtrip() {
        let code = "550E8400-E29B-41D4-A716-446655440000";
        assert_eq!(
            validate_join_code(code),
            Ok("550e8400-e29b-41d4-a716-446655440000".to_string())
        );
    }

    #[test]
    fn test_join_code_not_a_uuid() {
        assert_eq!(
            validate_join_code("not-a-uuid"),
            Err(ValidationFailure::InvalidCharacters)
        );
        assert_eq!(validate_join_code(""), Err(ValidationFailure::Empty));
    }
}
