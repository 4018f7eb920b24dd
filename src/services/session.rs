//! Session lifecycle controller
//!
//! Sits between the request boundary and the context store. Owns the TTL
//! policy (fixed at store construction), the answer-provider fallback chain
//! and the translation degradation rule.

use crate::errors::{AppError, Result};
use crate::llm::AnswerProvider;
use crate::store::{ContextStore, DocumentContext};
use crate::translate::Translator;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of a successful upload: the created session plus its summary
#[derive(Debug)]
pub struct UploadOutcome {
    pub context: DocumentContext,
    pub summary: String,
}

pub struct SessionService {
    store: Arc<dyn ContextStore>,
    /// Ordered provider chain; each is tried until one succeeds
    answerers: Vec<Arc<dyn AnswerProvider>>,
    translator: Arc<dyn Translator>,
    /// Language the providers are prompted in
    pivot_lang: String,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn ContextStore>,
        answerers: Vec<Arc<dyn AnswerProvider>>,
        translator: Arc<dyn Translator>,
        pivot_lang: String,
    ) -> Self {
        Self {
            store,
            answerers,
            translator,
            pivot_lang,
        }
    }

    /// Create a session for an extracted document and produce its summary.
    ///
    /// The session is only created once the summary succeeds, so a provider
    /// outage never leaves behind sessions the client was never told about.
    pub async fn handle_upload(
        &self,
        document_text: String,
        language: Option<&str>,
    ) -> Result<UploadOutcome> {
        if document_text.trim().is_empty() {
            return Err(AppError::Validation {
                message: "Document text is empty".to_string(),
                field: Some("file".to_string()),
            });
        }

        let summary = self.generate_answer(&document_text, None).await?;
        let summary = self.translate_out(summary, language).await;

        let context = self.store.create(document_text).await?;
        metrics::counter!("lexplain_uploads_total").increment(1);
        info!(
            session_id = %context.id,
            expires_at = %context.expires_at,
            chars = context.document_text.len(),
            "Document session created"
        );

        Ok(UploadOutcome { context, summary })
    }

    /// Answer a follow-up question against a previously stored document.
    ///
    /// A store miss is surfaced as the typed session-expired outcome so the
    /// boundary can tell the user to re-upload instead of retrying blindly.
    pub async fn handle_follow_up(
        &self,
        session_id: Uuid,
        question: &str,
        language: Option<&str>,
    ) -> Result<String> {
        if question.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "question".to_string(),
            });
        }

        let context = self
            .store
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::SessionExpired {
                id: session_id.to_string(),
            })?;

        metrics::counter!("lexplain_chat_requests_total").increment(1);

        let question = self.translate_in(question, language).await;
        let answer = self
            .generate_answer(&context.document_text, Some(&question))
            .await?;
        Ok(self.translate_out(answer, language).await)
    }

    /// Look up session metadata without touching its TTL
    pub async fn session(&self, session_id: Uuid) -> Result<DocumentContext> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::SessionExpired {
                id: session_id.to_string(),
            })
    }

    /// Explicitly clear a session. Idempotent.
    pub async fn invalidate(&self, session_id: Uuid) -> bool {
        let removed = self.store.expire(session_id).await;
        if removed {
            info!(session_id = %session_id, "Session invalidated");
        }
        removed
    }

    pub async fn active_sessions(&self) -> usize {
        self.store.len().await
    }

    /// Run the provider chain until one answers
    async fn generate_answer(&self, document_text: &str, question: Option<&str>) -> Result<String> {
        for provider in &self.answerers {
            match provider.generate(document_text, question).await {
                Ok(answer) => return Ok(answer),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Answer provider failed, trying next");
                    metrics::counter!("lexplain_provider_fallbacks_total").increment(1);
                }
            }
        }
        Err(AppError::AnswerProvider {
            message: "All answer providers failed".to_string(),
        })
    }

    /// Translate an incoming question into the pivot language, degrading to
    /// the original text on failure
    async fn translate_in(&self, text: &str, language: Option<&str>) -> String {
        let Some(lang) = language.filter(|l| *l != self.pivot_lang) else {
            return text.to_string();
        };
        match self.translator.translate(text, lang, &self.pivot_lang).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, lang, "Translation failed, using original text");
                metrics::counter!("lexplain_translation_degradations_total").increment(1);
                text.to_string()
            }
        }
    }

    /// Translate an outgoing answer into the requested language, degrading to
    /// the untranslated answer on failure
    async fn translate_out(&self, text: String, language: Option<&str>) -> String {
        let Some(lang) = language.filter(|l| *l != self.pivot_lang) else {
            return text;
        };
        match self.translator.translate(&text, &self.pivot_lang, lang).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, lang, "Translation failed, returning untranslated answer");
                metrics::counter!("lexplain_translation_degradations_total").increment(1);
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StaticAnswerer;
    use crate::store::InMemoryStore;
    use crate::translate::NoopTranslator;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(30 * 60);

    struct RecordingProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl AnswerProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(
            &self,
            _document_text: &str,
            question: Option<&str>,
        ) -> std::result::Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::AnswerProvider {
                    message: "upstream 503".to_string(),
                })
            } else {
                Ok(format!("answered: {}", question.unwrap_or("summary")))
            }
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> std::result::Result<String, AppError> {
            Err(AppError::Translation {
                message: "upstream down".to_string(),
            })
        }
    }

    fn service_with(
        answerers: Vec<Arc<dyn AnswerProvider>>,
        translator: Arc<dyn Translator>,
    ) -> SessionService {
        SessionService::new(
            Arc::new(InMemoryStore::new(TTL)),
            answerers,
            translator,
            "en".to_string(),
        )
    }

    fn default_service() -> SessionService {
        service_with(vec![Arc::new(StaticAnswerer)], Arc::new(NoopTranslator))
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_then_follow_up_round_trip() {
        let service = default_service();

        let outcome = service
            .handle_upload("Lease Agreement between A and B...".to_string(), None)
            .await
            .unwrap();
        assert!(!outcome.summary.is_empty());

        let answer = service
            .handle_follow_up(outcome.context.id, "What is the rent?", None)
            .await
            .unwrap();
        assert!(answer.contains("not legal advice"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_up_on_bogus_id_is_session_expired() {
        let service = default_service();

        let err = service
            .handle_follow_up(Uuid::new_v4(), "What is the rent?", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionExpired { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_up_after_ttl_is_session_expired() {
        let service = default_service();
        let outcome = service
            .handle_upload("Lease Agreement between A and B...".to_string(), None)
            .await
            .unwrap();

        assert!(service
            .handle_follow_up(outcome.context.id, "What is the rent?", None)
            .await
            .is_ok());

        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        let err = service
            .handle_follow_up(outcome.context.id, "What is the rent?", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionExpired { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_of_empty_text_creates_no_session() {
        let service = default_service();

        let err = service.handle_upload("   ".to_string(), None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(service.active_sessions().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_failure_falls_back_to_secondary() {
        let primary_calls = Arc::new(AtomicUsize::new(0));
        let secondary_calls = Arc::new(AtomicUsize::new(0));
        let service = service_with(
            vec![
                Arc::new(RecordingProvider {
                    calls: primary_calls.clone(),
                    fail: true,
                }),
                Arc::new(RecordingProvider {
                    calls: secondary_calls.clone(),
                    fail: false,
                }),
            ],
            Arc::new(NoopTranslator),
        );

        let outcome = service.handle_upload("doc".to_string(), None).await.unwrap();
        assert_eq!(outcome.summary, "answered: summary");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_chain_is_provider_failure() {
        let service = service_with(
            vec![
                Arc::new(RecordingProvider {
                    calls: Arc::new(AtomicUsize::new(0)),
                    fail: true,
                }),
                Arc::new(RecordingProvider {
                    calls: Arc::new(AtomicUsize::new(0)),
                    fail: true,
                }),
            ],
            Arc::new(NoopTranslator),
        );

        let err = service.handle_upload("doc".to_string(), None).await.unwrap_err();
        assert!(matches!(err, AppError::AnswerProvider { .. }));
        // nothing stored when the chain never produced a summary
        assert_eq!(service.active_sessions().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_translation_failure_degrades_to_original_text() {
        let service = service_with(vec![Arc::new(StaticAnswerer)], Arc::new(FailingTranslator));

        let outcome = service
            .handle_upload("doc".to_string(), Some("es"))
            .await
            .unwrap();
        // untranslated English summary passes through
        assert!(outcome.summary.contains("not legal advice"));

        let answer = service
            .handle_follow_up(outcome.context.id, "¿Cuál es el alquiler?", Some("es"))
            .await
            .unwrap();
        assert!(answer.contains("not legal advice"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pivot_language_skips_translation() {
        let service = service_with(vec![Arc::new(StaticAnswerer)], Arc::new(FailingTranslator));
        // "en" is the pivot; the failing translator must never be consulted
        let outcome = service
            .handle_upload("doc".to_string(), Some("en"))
            .await
            .unwrap();
        assert!(outcome.summary.contains("not legal advice"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_is_idempotent() {
        let service = default_service();
        let outcome = service.handle_upload("doc".to_string(), None).await.unwrap();

        assert!(service.invalidate(outcome.context.id).await);
        assert!(!service.invalidate(outcome.context.id).await);

        let err = service
            .handle_follow_up(outcome.context.id, "anything", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionExpired { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_question_is_rejected_before_store_lookup() {
        let service = default_service();
        let err = service
            .handle_follow_up(Uuid::new_v4(), "  ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField { .. }));
    }
}
