//! Input validation and sanitization for user questions

use tracing::warn;

use crate::errors::CrediRagError;
use crate::errors::Result;

/// Maximum question length in characters; longer input is truncated, not rejected
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Remove potentially harmful characters from input.
///
/// Strips control characters (newline excluded), HTML-like tags, and any
/// character outside the safe punctuation set.
pub fn sanitize_input(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let without_control: String = text
        .chars()
        .filter(|&c| !c.is_control() || c == '\n')
        .collect();

    let without_tags = strip_tags(&without_control);

    without_tags
        .chars()
        .filter(|&c| is_safe_char(c))
        .collect()
}

/// Validate and sanitize a user question.
///
/// # Errors
/// `CrediRagError::Validation` when the question is empty, or empty after
/// sanitization and whitespace collapsing.
pub fn validate_question(question: &str) -> Result<String> {
    if question.is_empty() {
        return Err(CrediRagError::Validation(
            "Question cannot be empty".to_string(),
        ));
    }

    let sanitized = sanitize_input(question);

    // Collapse internal whitespace runs into single spaces
    let collapsed = sanitized.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        return Err(CrediRagError::Validation(
            "Question contains only whitespace or invalid characters".to_string(),
        ));
    }

    if collapsed.chars().count() > MAX_QUESTION_CHARS {
        warn!(
            "Question too long ({} chars), truncating",
            collapsed.chars().count()
        );
        return Ok(collapsed.chars().take(MAX_QUESTION_CHARS).collect());
    }

    Ok(collapsed)
}

/// Letters, digits, underscore, whitespace, and a small punctuation set
fn is_safe_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '\'' | '"' | '-')
}

/// Remove HTML-like tags: any `<...>` run is dropped entirely. An unmatched
/// `<` falls through to the character filter, which removes it anyway.
fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        result.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                rest = &rest[start + 1..];
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_question_rejected() {
        assert!(validate_question("").is_err());
        assert!(validate_question("   ").is_err());
    }

    #[test]
    fn test_plain_question_passes_through() {
        let q = validate_question("What are the most common credit card complaints?").unwrap();
        assert_eq!(q, "What are the most common credit card complaints?");
    }

    #[test]
    fn test_tags_stripped() {
        let q = validate_question("What about <script>alert(1)</script> fees?").unwrap();
        assert_eq!(q, "What about alert1 fees?");
    }

    #[test]
    fn test_control_characters_removed() {
        let q = validate_question("credit\u{0000}card\u{0007} fraud").unwrap();
        assert_eq!(q, "creditcard fraud");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let q = validate_question("  money   transfer\n\n delays  ").unwrap();
        assert_eq!(q, "money transfer delays");
    }

    #[test]
    fn test_long_question_truncated_not_rejected() {
        let long = "a".repeat(2000);
        let q = validate_question(&long).unwrap();
        assert_eq!(q.chars().count(), MAX_QUESTION_CHARS);
    }

    #[test]
    fn test_only_special_characters_rejected() {
        assert!(validate_question("<<<>>>").is_err());
        assert!(validate_question("@#$%^&*()").is_err());
    }

    #[test]
    fn test_safe_punctuation_preserved() {
        let q = validate_question("Fees, fraud; and \"chargebacks\" - why?").unwrap();
        assert_eq!(q, "Fees, fraud; and \"chargebacks\" - why?");
    }
}
