//! OpenAI-compatible chat completions client
//!
//! Talks to `{api_base}/chat/completions` directly over reqwest so the HTTP
//! status is visible: a 429 (or a body that says it was rate limited) maps to
//! [`AppError::RateLimited`], everything else to [`AppError::LLM`].

use crate::llm::client::{GenerateOptions, LLMClient};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub struct OpenAIClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        })
    }

    async fn chat(&self, messages: Vec<ChatMessage<'_>>, options: GenerateOptions) -> Result<String> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if options.web_search {
            body["web_search_options"] = json!({});
        }

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("OpenAI request timed out: {}", e))
                } else {
                    AppError::LLM(format!("OpenAI request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Malformed OpenAI response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))
    }
}

fn classify_failure(status: StatusCode, body: &str) -> AppError {
    let lowered = body.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS
        || lowered.contains("rate limit")
        || lowered.contains("rate_limit")
    {
        AppError::RateLimited(format!("OpenAI API returned {}", status))
    } else {
        AppError::LLM(format!("OpenAI API error ({}): {}", status, body))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String> {
        self.chat(
            vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            options,
        )
        .await
    }

    async fn generate_with_system(
        &self,
        system: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String> {
        self.chat(
            vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            options,
        )
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenAIClient {
        OpenAIClient::new(
            "sk-test".to_string(),
            format!("{}/v1", server.uri()),
            "gpt-test".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "[]"}}]
            })))
            .mount(&server)
            .await;

        let text = client(&server)
            .generate("find papers", GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "[]");
    }

    #[tokio::test]
    async fn test_web_search_flag_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"web_search_options": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .generate_with_system("sys", "find papers", GenerateOptions::with_web_search())
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_429_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate("p", GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_server_error_is_not_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate("p", GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LLM(_)));
    }

    #[test]
    fn test_rate_limit_text_in_body() {
        let err = classify_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error": {"message": "Rate limit reached for requests"}}"#,
        );
        assert!(err.is_rate_limited());
    }
}
