//! Prompt assembly from retrieved complaints

use std::fmt::Write;

use crate::models::ComplaintRecord;

/// Default excerpt truncation length in characters
pub const DEFAULT_EXCERPT_CHARS: usize = 300;

/// Builds the instruction prompt handed to the answer synthesizer.
///
/// Composition is a pure function of `(question, records)`: no side effects,
/// identical inputs produce identical prompts.
pub struct PromptComposer {
    excerpt_chars: usize,
}

impl PromptComposer {
    /// Create a composer with a custom excerpt length. Excerpts are always
    /// truncated so prompt size stays bounded regardless of complaint size.
    pub const fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    /// Assemble the prompt for a question and its retrieved complaints,
    /// in ranking order
    pub fn compose(&self, question: &str, records: &[ComplaintRecord]) -> String {
        if records.is_empty() {
            return format!("Question: {question}\n\nNo relevant complaints found.");
        }

        let mut context = String::from("RELEVANT CUSTOMER COMPLAINTS:\n");

        for record in records {
            let _ = write!(
                context,
                "\n[Complaint #{} - {} - {}]\n\
                 Similarity: {:.2}\n\
                 Issue: {}\n\
                 Text: {}...\n",
                record.id,
                record.product,
                record.company,
                record.similarity,
                record.issue,
                truncate_chars(&record.text, self.excerpt_chars),
            );
        }

        format!(
            "You are a helpful financial analyst assistant at CrediTrust Financial.\n\
             \n\
             {context}\n\
             USER QUESTION: {question}\n\
             \n\
             INSTRUCTIONS:\n\
             1. Analyze the complaints above\n\
             2. Summarize the main issues mentioned\n\
             3. Group similar complaints together\n\
             4. Mention which financial products and companies are affected\n\
             5. Base your answer ONLY on the provided complaints\n\
             6. Be specific and actionable\n\
             \n\
             ANALYSIS AND ANSWER:\n"
        )
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_EXCERPT_CHARS)
    }
}

/// Truncate to at most `max_chars` characters on a char boundary
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize, product: &str, company: &str, text: &str) -> ComplaintRecord {
        ComplaintRecord {
            id,
            text: text.to_string(),
            product: product.to_string(),
            category: product.to_string(),
            issue: "Billing dispute".to_string(),
            company: company.to_string(),
            similarity: 0.85,
        }
    }

    #[test]
    fn test_empty_records_prompt() {
        let composer = PromptComposer::default();
        let prompt = composer.compose("test question", &[]);
        assert!(prompt.contains("No relevant complaints found"));
        assert!(prompt.contains("test question"));
    }

    #[test]
    fn test_prompt_contains_headers_in_order() {
        let composer = PromptComposer::default();
        let records = vec![
            record(1, "Credit card", "Citibank", "fraud text"),
            record(2, "Checking account", "Bank of America", "fee text"),
        ];
        let prompt = composer.compose("What are credit card issues?", &records);

        assert!(prompt.contains("RELEVANT CUSTOMER COMPLAINTS"));
        assert!(prompt.contains("What are credit card issues?"));

        let first = prompt.find("[Complaint #1 - Credit card - Citibank]").unwrap();
        let second = prompt
            .find("[Complaint #2 - Checking account - Bank of America]")
            .unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_similarity_formatted_to_two_decimals() {
        let composer = PromptComposer::default();
        let prompt = composer.compose("q", &[record(1, "Credit card", "Citibank", "text")]);
        assert!(prompt.contains("Similarity: 0.85"));
        assert!(prompt.contains("Issue: Billing dispute"));
    }

    #[test]
    fn test_excerpt_truncated() {
        let composer = PromptComposer::new(10);
        let long_text = "x".repeat(500);
        let prompt = composer.compose("q", &[record(1, "Card", "Bank", &long_text)]);
        assert!(prompt.contains(&format!("Text: {}...", "x".repeat(10))));
        assert!(!prompt.contains(&"x".repeat(11)));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let composer = PromptComposer::new(2);
        let prompt = composer.compose("q", &[record(1, "Card", "Bank", "日本語テキスト")]);
        assert!(prompt.contains("Text: 日本..."));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let composer = PromptComposer::default();
        let records = vec![record(1, "Credit card", "Citibank", "some text")];
        let a = composer.compose("same question", &records);
        let b = composer.compose("same question", &records);
        assert_eq!(a, b);
    }

    #[test]
    fn test_instruction_block_present() {
        let composer = PromptComposer::default();
        let prompt = composer.compose("q", &[record(1, "Card", "Bank", "text")]);
        assert!(prompt.contains("Summarize the main issues"));
        assert!(prompt.contains("Group similar complaints"));
        assert!(prompt.contains("ONLY on the provided complaints"));
    }
}
