//! Translation collaborators
//!
//! Optional deployment variant: questions are translated into the pivot
//! language before answering and answers translated back. Translation failure
//! is never a hard error; the caller degrades to the untranslated text.

use crate::errors::AppError;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` (ISO 639-1 codes)
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, AppError>;
}

/// HTTP translator speaking the LibreTranslate JSON format
pub struct HttpTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_url: api_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, AppError> {
        let payload = serde_json::json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
            "api_key": self.api_key,
        });

        let res = self
            .client
            .post(&self.api_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Translation {
                message: format!("Request failed: {}", e),
            })?;

        if !res.status().is_success() {
            return Err(AppError::Translation {
                message: format!("API error: {}", res.status()),
            });
        }

        let body: serde_json::Value = res.json().await.map_err(|e| AppError::Translation {
            message: format!("Parse error: {}", e),
        })?;

        let translated = body["translatedText"]
            .as_str()
            .ok_or_else(|| AppError::Translation {
                message: "Invalid response format".to_string(),
            })?;

        Ok(translated.to_string())
    }
}

/// Identity translator used when translation is disabled
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, AppError> {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_translator_passes_text_through() {
        let translator = NoopTranslator;
        let out = translator.translate("¿Cuál es el alquiler?", "es", "en").await.unwrap();
        assert_eq!(out, "¿Cuál es el alquiler?");
    }
}
