//! Text-rewriting provider client.
//!
//! The rewriting model is treated as an opaque external collaborator: plain
//! content in, optimized content plus SEO suggestions out. Failures surface
//! as `AppError::Upstream` so callers can distinguish them from invalid
//! requests and offer a retry.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::Suggestions;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = r#"You are an expert in web content optimization, focusing on SEO, readability, and engagement while maintaining the original content's voice and tone.

Return a JSON response with the following structure:
{
  "optimizedContent": "improved content here (never include a title)",
  "suggestions": {
    "title": ["title1", "title2", "title3"],
    "metaDescription": "meta description here (max 155 chars)",
    "keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"]
  }
}

Requirements:
- Optimize for both search engines and human readers
- Maintain the original content's tone and voice
- Create three unique, SEO-optimized titles
- Write a compelling meta description (150-160 characters)
- Select five highly relevant keywords"#;

/// Number of words in the trimmed content, whitespace-delimited.
pub fn count_words(content: &str) -> i64 {
    content.trim().split_whitespace().count() as i64
}

/// Result of a rewriting provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    pub optimized_content: String,
    pub suggestions: Suggestions,
    pub word_count: i64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// The model's JSON payload, extracted from the completion text.
#[derive(Debug, Deserialize)]
struct ModelPayload {
    #[serde(rename = "optimizedContent", default)]
    optimized_content: String,
    #[serde(default)]
    suggestions: ModelSuggestions,
}

#[derive(Debug, Default, Deserialize)]
struct ModelSuggestions {
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "metaDescription", default)]
    meta_description: String,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Rewrite content and extract SEO suggestions.
    ///
    /// `content` should already be trimmed; the returned word count is
    /// computed from it, not taken from the caller's declaration.
    pub async fn rewrite(&self, content: &str) -> Result<RewriteResult> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": content },
            ],
            "temperature": 0.7,
            "response_format": { "type": "json_object" },
            "max_tokens": 4000,
        });

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Rewriting provider error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Rewriting provider returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse provider response: {}", e)))?;

        let message = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AppError::Upstream("Provider returned no completion".into()))?;

        let payload: ModelPayload = serde_json::from_str(message)
            .map_err(|e| AppError::Upstream(format!("Provider returned invalid JSON: {}", e)))?;

        if payload.optimized_content.trim().is_empty() {
            return Err(AppError::Upstream("Provider returned empty content".into()));
        }

        Ok(RewriteResult {
            optimized_content: payload.optimized_content,
            suggestions: Suggestions {
                titles: payload.suggestions.title,
                keywords: payload.suggestions.keywords,
                meta_description: payload.suggestions.meta_description,
            },
            word_count: count_words(content),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("  two  words  "), 2);
        assert_eq!(count_words("line\nbreaks\tand tabs"), 4);
    }
}
