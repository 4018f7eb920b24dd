//! Answer generation providers
//!
//! A provider turns (document text, optional question) into an answer string.
//! With no question it produces the plain-language summary shown after upload.
//! Providers are held as an ordered chain; the session controller tries each
//! in turn until one succeeds.

pub mod openai;

pub use openai::OpenAiAnswerer;

use crate::errors::AppError;
use async_trait::async_trait;

/// System prompt shared by all HTTP providers
pub(crate) const SYSTEM_PROMPT: &str = "You are a legal document assistant. Explain legal \
documents in plain, simple language a non-lawyer can understand. Be accurate and concise, \
and remind the user that this is an explanation, not legal advice.";

#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Provider name, used in logs and fallback metrics
    fn name(&self) -> &str;

    /// Generate an answer from the document text. `question` of `None` asks
    /// for the plain-language summary of the whole document.
    async fn generate(&self, document_text: &str, question: Option<&str>)
        -> Result<String, AppError>;
}

/// Build the user-turn prompt pairing the stored document with the request
pub(crate) fn build_prompt(document_text: &str, question: Option<&str>) -> String {
    match question {
        Some(q) => format!(
            "Here is the text of a legal document:\n\n{document_text}\n\n\
             Answer this question about the document in plain language: {q}"
        ),
        None => format!(
            "Here is the text of a legal document:\n\n{document_text}\n\n\
             Summarize this document in plain language, highlighting the key \
             obligations, rights, dates and amounts."
        ),
    }
}

/// Deterministic local provider, selected when the configured API key is
/// `"mock"`. Also serves as the test double.
pub struct StaticAnswerer;

#[async_trait]
impl AnswerProvider for StaticAnswerer {
    fn name(&self) -> &str {
        "static"
    }

    async fn generate(
        &self,
        document_text: &str,
        question: Option<&str>,
    ) -> Result<String, AppError> {
        Ok(match question {
            Some(q) => format!(
                "Based on the uploaded document ({} characters), here is a plain-language \
                 answer to \"{q}\". This is an explanation, not legal advice.",
                document_text.len()
            ),
            None => format!(
                "Plain-language summary of the uploaded document ({} characters). \
                 This is an explanation, not legal advice.",
                document_text.len()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_question() {
        let prompt = build_prompt("doc text", Some("What is the rent?"));
        assert!(prompt.contains("doc text"));
        assert!(prompt.contains("What is the rent?"));
    }

    #[test]
    fn test_prompt_without_question_asks_for_summary() {
        let prompt = build_prompt("doc text", None);
        assert!(prompt.contains("Summarize"));
    }

    #[tokio::test]
    async fn test_static_answerer_is_deterministic() {
        let provider = StaticAnswerer;
        let a = provider.generate("abc", Some("q")).await.unwrap();
        let b = provider.generate("abc", Some("q")).await.unwrap();
        assert_eq!(a, b);
    }
}
