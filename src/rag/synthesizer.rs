//! Answer synthesis from an assembled prompt
//!
//! Synthesis is a capability boundary: the retrieval and prompt code only
//! depend on the [`AnswerSynthesizer`] trait, so the deterministic rule-based
//! analyst can be swapped for a real generative backend without touching the
//! rest of the pipeline.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::LlmConfig;
use crate::errors::CrediRagError;
use crate::errors::Result;
use crate::models::ComplaintRecord;

/// Produces a natural-language analysis from the assembled prompt.
///
/// Implementations must return non-empty text for well-formed input and must
/// not leak retrieval internals (record rank ids) into the answer. When the
/// supplied records carry real company names those should be referenced;
/// otherwise a generic phrase stands in.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    async fn synthesize(&self, prompt: &str, records: &[ComplaintRecord]) -> Result<String>;
}

/// Companies named by the leading records, or the generic stand-in phrase
fn company_list(records: &[ComplaintRecord]) -> String {
    let mut companies: Vec<&str> = Vec::new();
    for record in records.iter().take(3) {
        if record.has_known_company() && !companies.contains(&record.company.as_str()) {
            companies.push(&record.company);
        }
    }

    if companies.is_empty() {
        "multiple financial institutions".to_string()
    } else {
        companies.join(", ")
    }
}

/// Deterministic keyword-routed analyst.
///
/// Selects one of a small set of canned analyses from substring matches on
/// the lowercased prompt. Infallible by construction: every path returns
/// non-empty text.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedSynthesizer;

impl RuleBasedSynthesizer {
    pub fn new() -> Self {
        Self
    }

    fn analyze(prompt: &str, records: &[ComplaintRecord]) -> String {
        let companies = company_list(records);
        let prompt_lower = prompt.to_lowercase();

        if prompt_lower.contains("credit card") && prompt_lower.contains("fraud") {
            format!(
                "Based on the retrieved complaints, credit card fraud issues include:\n\
                 \n\
                 1. **Unauthorized Card Use**: Cards stored on customer accounts being charged without authorization\n\
                 2. **Repeat Incidents**: Customers reporting fraud recurring on the same card after it was flagged\n\
                 3. **Issuers Affected**: {companies}\n\
                 \n\
                 **Affected Products**: Debit cards, credit cards\n\
                 \n\
                 **Actionable Insights**:\n\
                 - Review card storage security measures\n\
                 - Strengthen fraud detection for repeat incidents\n\
                 - Standardize fraud reporting across partner banks"
            )
        } else if prompt_lower.contains("money transfer")
            || (prompt_lower.contains("transfer") && prompt_lower.contains("delay"))
        {
            format!(
                "Analysis of money transfer complaints from {companies}:\n\
                 \n\
                 1. **Processing Gaps**: Transfers confirmed to the customer but never completed\n\
                 2. **Platform Reliability**: Login outages lasting hours and blocking transfer access\n\
                 3. **Confirmation Mismatches**: Completion status disagreeing with account balances\n\
                 \n\
                 **Affected Products**: Cash reward transfers, online banking\n\
                 **Primary Issue**: Transfer reliability and confirmation accuracy\n\
                 \n\
                 **Recommendations**:\n\
                 - Audit confirmation versus completion handling\n\
                 - Improve platform uptime and login reliability\n\
                 - Notify customers proactively about delayed transfers"
            )
        } else if prompt_lower.contains("bank account fee")
            || (prompt_lower.contains("fee") && prompt_lower.contains("account"))
        {
            format!(
                "Analysis of bank account fee complaints:\n\
                 \n\
                 1. **Recurring Account Charges**: Checking accounts billed unexplained fees across multiple years\n\
                 2. **Unjustified Fees**: Charges issued without documented justification or customer agreement\n\
                 3. **Institutions Involved**: {companies}\n\
                 \n\
                 **Affected Products**: Checking accounts, business accounts\n\
                 \n\
                 **Action Items**:\n\
                 - Review account fee structures\n\
                 - Require documented justification before fees are issued\n\
                 - Create a fee dispute resolution process"
            )
        } else if prompt_lower.contains("credit card") {
            format!(
                "Based on the retrieved complaints about credit cards:\n\
                 \n\
                 1. **Fraud Prevention**: Multiple unauthorized use incidents\n\
                 2. **Rewards Problems**: Cash reward transfers failing or stalling\n\
                 3. **Multiple Banks**: Issues spanning {companies}\n\
                 \n\
                 **Pattern**: Credit card complaints combine security concerns (fraud) with value concerns (rewards).\n\
                 \n\
                 **Strategic Focus**:\n\
                 - Enhanced fraud detection\n\
                 - Transparent rewards program terms\n\
                 - Consistent customer service across card products"
            )
        } else {
            format!(
                "Analysis of customer complaints reveals:\n\
                 \n\
                 1. **Security Issues**: Fraud and unauthorized access across multiple product types\n\
                 2. **Fee Transparency**: Unclear or unjustified charges on accounts\n\
                 3. **System Reliability**: Banking platform accessibility problems\n\
                 4. **Breadth**: Issues reported against {companies}\n\
                 \n\
                 **Cross-Product Impact**: These patterns affect credit cards, bank accounts, and transfer services.\n\
                 \n\
                 **Strategic Recommendation**: Standardize security protocols and fee transparency across all financial products."
            )
        }
    }
}

#[async_trait]
impl AnswerSynthesizer for RuleBasedSynthesizer {
    async fn synthesize(&self, prompt: &str, records: &[ComplaintRecord]) -> Result<String> {
        debug!("Generating rule-based analysis");
        Ok(Self::analyze(prompt, records))
    }
}

/// Generative backend speaking the OpenAI-compatible chat completions API
pub struct LlmSynthesizer {
    config: LlmConfig,
    client: Client,
}

impl LlmSynthesizer {
    /// Create a synthesizer backed by a chat completions endpoint
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| CrediRagError::Http(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl AnswerSynthesizer for LlmSynthesizer {
    async fn synthesize(&self, prompt: &str, _records: &[ComplaintRecord]) -> Result<String> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: String,
        }

        let url = format!("{}/chat/completions", self.config.endpoint);
        debug!("Calling chat completions API: {}", url);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CrediRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CrediRagError::Http(format!(
                "Chat API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| CrediRagError::Http(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CrediRagError::Http("No completion in response".to_string()))
    }
}
