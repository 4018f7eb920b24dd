//! HTTP answer provider speaking the OpenAI chat-completions wire format

use super::{build_prompt, AnswerProvider, SYSTEM_PROMPT};
use crate::errors::AppError;
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAiAnswerer {
    name: String,
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiAnswerer {
    pub fn new(
        name: impl Into<String>,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl AnswerProvider for OpenAiAnswerer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        document_text: &str,
        question: Option<&str>,
    ) -> Result<String, AppError> {
        let payload = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(document_text, question) }
            ]
        });

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::AnswerProvider {
                message: format!("Request failed: {}", e),
            })?;

        if !res.status().is_success() {
            // Provider error bodies stay in the logs, never in client responses
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(provider = %self.name, %status, %body, "Answer provider returned error");
            return Err(AppError::AnswerProvider {
                message: format!("API error: {}", status),
            });
        }

        let body: serde_json::Value = res.json().await.map_err(|e| AppError::AnswerProvider {
            message: format!("Parse error: {}", e),
        })?;

        let answer = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AppError::AnswerProvider {
                message: "Invalid response format".to_string(),
            })?;

        Ok(answer.trim().to_string())
    }
}
